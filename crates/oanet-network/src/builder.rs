//! Edge extraction from work records
//!
//! A record lacking the relation an edge kind needs is a schema gap: it is
//! skipped, logged at debug level, and contributes no edges.

use std::borrow::Borrow;

use oanet_core::EntityRecord;
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::edge::{Edge, EdgeKind};

/// Referenced-work IDs, `None` when the field is missing
pub fn reference_ids(record: &EntityRecord) -> Option<Vec<&str>> {
    record.str_list("referenced_works")
}

/// Author IDs in author order, `None` when no author list is present.
///
/// Reads the OpenAlex `authorships[].author.id` shape, falling back to a
/// flat `authors` list of IDs or of objects with an `id`. Entries without
/// an ID are skipped.
pub fn author_ids(record: &EntityRecord) -> Option<Vec<&str>> {
    if let Some(authorships) = record.get("authorships").and_then(Value::as_array) {
        let ids = authorships
            .iter()
            .filter_map(|a| a.get("author"))
            .filter_map(entry_id)
            .collect();
        return Some(ids);
    }
    let authors = record.get("authors")?.as_array()?;
    Some(authors.iter().filter_map(entry_id).collect())
}

fn entry_id(v: &Value) -> Option<&str> {
    let id = match v {
        Value::String(s) => Some(s.as_str()),
        Value::Object(o) => o.get("id").and_then(Value::as_str),
        _ => None,
    };
    id.filter(|s| !s.is_empty())
}

fn schema_gap(record: &EntityRecord, field: &str) {
    log::debug!(
        "{}: no {field}, skipped",
        record.id().unwrap_or("<record without id>")
    );
}

/// `(W, r)` for every referenced work `r` of work `W`
pub fn citation_edges(record: &EntityRecord) -> Vec<Edge> {
    let Some(source) = record.id() else {
        schema_gap(record, "id");
        return Vec::new();
    };
    let Some(refs) = reference_ids(record) else {
        schema_gap(record, "referenced_works");
        return Vec::new();
    };
    refs.into_iter()
        .map(|target| Edge::citation(source, target))
        .collect()
}

/// `(a_i, a_j)` for every author pair `i < j`, ascending index order
pub fn coauthorship_edges(record: &EntityRecord) -> Vec<Edge> {
    let Some(authors) = author_ids(record) else {
        schema_gap(record, "author list");
        return Vec::new();
    };
    author_pairs(&authors)
        .map(|(a, b)| Edge::coauthorship(a, b))
        .collect()
}

/// Unordered pairs `(xs[i], xs[j])`, `i < j`, in ascending `(i, j)` order
pub(crate) fn author_pairs<'a, 'b>(
    xs: &'b [&'a str],
) -> impl Iterator<Item = (&'a str, &'a str)> + 'b {
    xs.iter()
        .enumerate()
        .flat_map(move |(i, a)| xs[i + 1..].iter().map(move |b| (*a, *b)))
}

/// Edge list of one kind over a record stream, in record order.
///
/// Repeated relations are kept; aggregate downstream for weights.
pub fn build_edges<I>(records: I, kind: EdgeKind) -> Vec<Edge>
where
    I: IntoIterator,
    I::Item: Borrow<EntityRecord>,
{
    let extract = match kind {
        EdgeKind::Citation => citation_edges,
        EdgeKind::Coauthorship => coauthorship_edges,
    };
    records
        .into_iter()
        .flat_map(|r| extract(r.borrow()))
        .collect()
}

/// Which citation targets to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitationScope {
    /// Every referenced work
    #[default]
    All,
    /// Only references to works that are themselves in the input
    WithinSet,
}

/// Options for [`build_networks`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkOptions {
    pub citation: bool,
    pub coauthorship: bool,
    pub citation_scope: CitationScope,
    /// Ignore records whose ID was already seen
    pub skip_duplicate_works: bool,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            citation: true,
            coauthorship: true,
            citation_scope: CitationScope::WithinSet,
            skip_duplicate_works: true,
        }
    }
}

impl NetworkOptions {
    pub fn kinds(kinds: &[EdgeKind]) -> Self {
        Self {
            citation: kinds.contains(&EdgeKind::Citation),
            coauthorship: kinds.contains(&EdgeKind::Coauthorship),
            ..Self::default()
        }
    }
}

/// Networks built in one pass over the records
#[derive(Debug, Default)]
pub struct Networks {
    /// Work IDs in first-seen order
    pub works: Vec<String>,
    pub citation: Option<Vec<Edge>>,
    pub coauthorship: Option<Vec<Edge>>,
    pub duplicates_skipped: usize,
}

/// Build the selected networks from a single pass over `records`.
pub fn build_networks<I>(records: I, options: &NetworkOptions) -> Networks
where
    I: IntoIterator,
    I::Item: Borrow<EntityRecord>,
{
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut works = Vec::new();
    let mut citation = options.citation.then(Vec::new);
    let mut coauthorship = options.coauthorship.then(Vec::new);
    let mut duplicates_skipped = 0;

    for record in records {
        let record = record.borrow();
        if let Some(id) = record.id() {
            if !seen.insert(id.to_string()) {
                if options.skip_duplicate_works {
                    duplicates_skipped += 1;
                    continue;
                }
            } else {
                works.push(id.to_string());
            }
        }
        if let Some(edges) = citation.as_mut() {
            edges.extend(citation_edges(record));
        }
        if let Some(edges) = coauthorship.as_mut() {
            edges.extend(coauthorship_edges(record));
        }
    }

    if options.citation_scope == CitationScope::WithinSet {
        if let Some(edges) = citation.as_mut() {
            edges.retain(|e| seen.contains(&e.target));
        }
    }
    if duplicates_skipped > 0 {
        log::info!("Skipped {duplicates_skipped} duplicate works");
    }

    Networks {
        works,
        citation,
        coauthorship,
        duplicates_skipped,
    }
}
