//! Duplicate removal across record streams, keyed by entity ID

use rustc_hash::FxHashSet;

use crate::record::EntityRecord;

/// Lazily drop records whose ID was already seen.
///
/// Records without an ID are passed through untouched.
pub struct Dedup<I> {
    inner: I,
    seen: FxHashSet<String>,
}

impl<I> Dedup<I> {
    /// Number of distinct IDs seen so far
    pub fn seen(&self) -> usize {
        self.seen.len()
    }
}

impl<I: Iterator<Item = EntityRecord>> Iterator for Dedup<I> {
    type Item = EntityRecord;

    fn next(&mut self) -> Option<EntityRecord> {
        for record in self.inner.by_ref() {
            match record.id() {
                Some(id) if self.seen.contains(id) => continue,
                Some(id) => {
                    self.seen.insert(id.to_string());
                    return Some(record);
                }
                None => return Some(record),
            }
        }
        None
    }
}

/// Drop repeated IDs from a single stream
pub fn filter_duplicates<I>(records: I) -> Dedup<I::IntoIter>
where
    I: IntoIterator<Item = EntityRecord>,
{
    Dedup {
        inner: records.into_iter(),
        seen: FxHashSet::default(),
    }
}

/// Chain several streams into one, keeping only the first record per ID.
pub fn aggregate_entities<S, I>(streams: S) -> Dedup<std::iter::Flatten<S::IntoIter>>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator<Item = EntityRecord>,
{
    filter_duplicates(streams.into_iter().flatten())
}
