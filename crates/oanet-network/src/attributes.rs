//! Vertex attributes: flattened work fields and aggregated author nodes

use std::borrow::Borrow;

use oanet_core::EntityRecord;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};

/// Work fields carried onto vertices unless configured otherwise
pub const DEFAULT_KEPT_ATTRIBUTES: &[&str] = &[
    "id",
    "doi",
    "title",
    "display_name",
    "publication_year",
    "publication_date",
    "type",
    "authorships",
    "concepts",
    "host_venue",
];

/// Keep-list then ignore-list, applied in that order
#[derive(Debug, Clone)]
pub struct AttributeFilter {
    /// `None` keeps every field
    kept: Option<FxHashSet<String>>,
    ignored: FxHashSet<String>,
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self::keep(DEFAULT_KEPT_ATTRIBUTES.iter().copied())
    }
}

impl AttributeFilter {
    pub fn all() -> Self {
        Self {
            kept: None,
            ignored: FxHashSet::default(),
        }
    }

    pub fn keep<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            kept: Some(fields.into_iter().map(Into::into).collect()),
            ignored: FxHashSet::default(),
        }
    }

    pub fn ignore<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.ignored.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn allows(&self, field: &str) -> bool {
        self.kept.as_ref().map_or(true, |k| k.contains(field)) && !self.ignored.contains(field)
    }
}

/// Project a record onto flat vertex attributes.
///
/// Strings, numbers and booleans pass through; nulls, arrays and objects
/// are replaced by their JSON text.
pub fn vertex_attributes(record: &EntityRecord, filter: &AttributeFilter) -> Map<String, Value> {
    record
        .fields()
        .iter()
        .filter(|(k, _)| filter.allows(k))
        .map(|(k, v)| {
            let flat = match v {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => v.clone(),
                other => Value::String(other.to_string()),
            };
            (k.clone(), flat)
        })
        .collect()
}

/// [`vertex_attributes`] for every record, in record order
pub fn work_vertices<I>(records: I, filter: &AttributeFilter) -> Vec<Map<String, Value>>
where
    I: IntoIterator,
    I::Item: Borrow<EntityRecord>,
{
    records
        .into_iter()
        .map(|r| vertex_attributes(r.borrow(), filter))
        .collect()
}

/// Author node, merged over every work the author appears on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorVertex {
    pub id: String,
    /// Empty when upstream has none
    pub display_name: String,
    pub orcid: String,
    /// Institution names, first-seen order, no repeats
    pub institutions: Vec<String>,
    pub institution_ids: Vec<String>,
}

impl AuthorVertex {
    fn new(id: &str, author: Option<&Map<String, Value>>) -> Self {
        let text = |field: &str| {
            author
                .and_then(|a| a.get(field))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            id: id.to_string(),
            display_name: text("display_name"),
            orcid: text("orcid"),
            ..Self::default()
        }
    }

    fn add_institutions(&mut self, institutions: &[Value]) {
        for inst in institutions {
            if let Some(id) = non_empty_str(inst.get("id")) {
                push_unique(&mut self.institution_ids, id);
            }
            if let Some(name) = non_empty_str(inst.get("display_name")) {
                push_unique(&mut self.institutions, name);
            }
        }
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

const NO_INSTITUTIONS: &[Value] = &[];

/// `(author id, author object, institutions)` per author entry of a work
fn author_entries(record: &EntityRecord) -> Vec<(&str, Option<&Map<String, Value>>, &[Value])> {
    if let Some(authorships) = record.get("authorships").and_then(Value::as_array) {
        return authorships
            .iter()
            .filter_map(|a| {
                let author = a.get("author")?.as_object()?;
                let id = non_empty_str(author.get("id"))?;
                let institutions = a
                    .get("institutions")
                    .and_then(Value::as_array)
                    .map_or(NO_INSTITUTIONS, Vec::as_slice);
                Some((id, Some(author), institutions))
            })
            .collect();
    }
    let Some(authors) = record.get("authors").and_then(Value::as_array) else {
        return Vec::new();
    };
    authors
        .iter()
        .filter_map(|a| match a {
            Value::String(id) if !id.is_empty() => Some((id.as_str(), None, NO_INSTITUTIONS)),
            Value::Object(o) => Some((non_empty_str(o.get("id"))?, Some(o), NO_INSTITUTIONS)),
            _ => None,
        })
        .collect()
}

/// One vertex per distinct author ID, in first-seen order.
///
/// Name and ORCID come from the first work listing the author;
/// institutions accumulate across all of them.
pub fn author_vertices<I>(records: I) -> Vec<AuthorVertex>
where
    I: IntoIterator,
    I::Item: Borrow<EntityRecord>,
{
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut vertices: Vec<AuthorVertex> = Vec::new();

    for record in records {
        for (id, author, institutions) in author_entries(record.borrow()) {
            let idx = *index.entry(id.to_string()).or_insert_with(|| {
                vertices.push(AuthorVertex::new(id, author));
                vertices.len() - 1
            });
            vertices[idx].add_institutions(institutions);
        }
    }
    log::debug!("{} distinct authors", vertices.len());
    vertices
}
