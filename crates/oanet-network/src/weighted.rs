//! Aggregated (simplified) coauthorship network

use std::borrow::Borrow;

use oanet_core::EntityRecord;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::builder::{author_ids, author_pairs};

/// One coauthor pair with all its shared works folded in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedEdge {
    pub source: String,
    pub target: String,
    /// Number of shared works
    pub count: u32,
    /// Sum over shared works of `1 / n_authors`
    pub weight: f64,
    pub first_year: Option<i64>,
    pub last_year: Option<i64>,
}

impl WeightedEdge {
    fn add_work(&mut self, weight: f64, year: Option<i64>) {
        self.count += 1;
        self.weight += weight;
        if let Some(y) = year {
            self.first_year = Some(self.first_year.map_or(y, |f| f.min(y)));
            self.last_year = Some(self.last_year.map_or(y, |l| l.max(y)));
        }
    }
}

/// Author list with repeats dropped, first occurrence kept
fn distinct_authors(authors: Vec<&str>) -> Vec<&str> {
    let mut seen = FxHashSet::default();
    authors.into_iter().filter(|a| seen.insert(*a)).collect()
}

/// Fold repeated coauthor pairs into weighted edges, in first-seen order.
///
/// Pairs are undirected: `(A1, A2)` and `(A2, A1)` are the same edge, kept
/// in the orientation first encountered. An author listed twice on one
/// work counts once, so no self-loops are produced and `n_authors` is the
/// number of distinct authors.
pub fn simplify_coauthorship<I>(records: I) -> Vec<WeightedEdge>
where
    I: IntoIterator,
    I::Item: Borrow<EntityRecord>,
{
    let mut index: FxHashMap<(String, String), usize> = FxHashMap::default();
    let mut edges: Vec<WeightedEdge> = Vec::new();

    for record in records {
        let record = record.borrow();
        let Some(authors) = author_ids(record) else {
            continue;
        };
        let authors = distinct_authors(authors);
        if authors.len() < 2 {
            continue;
        }
        let weight = 1.0 / authors.len() as f64;
        let year = record.i64_field("publication_year");

        for (a, b) in author_pairs(&authors) {
            let key = if a <= b {
                (a.to_string(), b.to_string())
            } else {
                (b.to_string(), a.to_string())
            };
            let idx = *index.entry(key).or_insert_with(|| {
                edges.push(WeightedEdge {
                    source: a.to_string(),
                    target: b.to_string(),
                    count: 0,
                    weight: 0.0,
                    first_year: None,
                    last_year: None,
                });
                edges.len() - 1
            });
            edges[idx].add_work(weight, year);
        }
    }
    edges
}
