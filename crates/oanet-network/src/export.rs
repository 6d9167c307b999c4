//! Edge list and vertex table CSV export
//!
//! A network saved at `<stem>.csv` gets its vertex table at
//! `<stem>_nodes.csv` beside it.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::attributes::AuthorVertex;
use crate::edge::Edge;
use crate::weighted::WeightedEdge;

/// Write rows with a header line derived from the row type.
fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);
    for row in rows {
        wtr.serialize(row).context("Failed to write CSV record")?;
    }
    wtr.flush().context("Failed to flush CSV")?;
    Ok(())
}

/// `source,target,kind`
pub fn write_edges_csv<W: Write>(writer: W, edges: &[Edge]) -> anyhow::Result<()> {
    write_rows(writer, edges)
}

/// `source,target,count,weight,first_year,last_year`
pub fn write_weighted_csv<W: Write>(writer: W, edges: &[WeightedEdge]) -> anyhow::Result<()> {
    write_rows(writer, edges)
}

pub fn save_edges_csv(path: &Path, edges: &[Edge]) -> anyhow::Result<()> {
    write_edges_csv(create(path)?, edges)?;
    log::info!("Saved {} edges to {}", edges.len(), path.display());
    Ok(())
}

pub fn save_weighted_csv(path: &Path, edges: &[WeightedEdge]) -> anyhow::Result<()> {
    write_weighted_csv(create(path)?, edges)?;
    log::info!("Saved {} weighted edges to {}", edges.len(), path.display());
    Ok(())
}

#[derive(Serialize)]
struct AuthorRow<'a> {
    id: &'a str,
    display_name: &'a str,
    orcid: &'a str,
    institutions: String,
    institution_ids: String,
}

impl<'a> From<&'a AuthorVertex> for AuthorRow<'a> {
    fn from(a: &'a AuthorVertex) -> Self {
        Self {
            id: &a.id,
            display_name: &a.display_name,
            orcid: &a.orcid,
            institutions: a.institutions.join("|"),
            institution_ids: a.institution_ids.join(","),
        }
    }
}

/// `id,display_name,orcid,institutions,institution_ids`; names are
/// `|`-joined, IDs `,`-joined.
pub fn write_authors_csv<W: Write>(writer: W, authors: &[AuthorVertex]) -> anyhow::Result<()> {
    let rows: Vec<AuthorRow<'_>> = authors.iter().map(AuthorRow::from).collect();
    write_rows(writer, &rows)
}

/// Work vertex table. Columns are the union of attribute names in
/// first-seen order; a missing attribute is an empty cell.
pub fn write_vertices_csv<W: Write>(
    writer: W,
    vertices: &[Map<String, Value>],
) -> anyhow::Result<()> {
    let mut seen = FxHashSet::default();
    let mut columns: Vec<&str> = Vec::new();
    for key in vertices.iter().flat_map(|v| v.keys()) {
        if seen.insert(key.as_str()) {
            columns.push(key.as_str());
        }
    }

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    if !columns.is_empty() {
        wtr.write_record(&columns).context("Failed to write CSV header")?;
        for v in vertices {
            let row = columns.iter().map(|c| v.get(*c).map(cell).unwrap_or_default());
            wtr.write_record(row).context("Failed to write CSV record")?;
        }
    }
    wtr.flush().context("Failed to flush CSV")?;
    Ok(())
}

fn cell(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `<dir>/<stem>_nodes.csv` for an edge list at `path`
pub fn nodes_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{stem}_nodes.csv"))
}

fn create(path: &Path) -> anyhow::Result<std::fs::File> {
    std::fs::File::create(path).with_context(|| format!("Cannot create {}", path.display()))
}

/// Citation edge list at `path` plus work vertices at [`nodes_path`].
/// Returns the vertex table path.
pub fn save_citation_network(
    path: &Path,
    edges: &[Edge],
    works: &[Map<String, Value>],
) -> anyhow::Result<PathBuf> {
    save_edges_csv(path, edges)?;
    let nodes = nodes_path(path);
    write_vertices_csv(create(&nodes)?, works)?;
    log::info!("Saved {} work vertices to {}", works.len(), nodes.display());
    Ok(nodes)
}

/// Weighted coauthorship edges at `path` plus author vertices at
/// [`nodes_path`]. Returns the vertex table path.
pub fn save_coauthorship_network(
    path: &Path,
    edges: &[WeightedEdge],
    authors: &[AuthorVertex],
) -> anyhow::Result<PathBuf> {
    save_weighted_csv(path, edges)?;
    let nodes = nodes_path(path);
    write_authors_csv(create(&nodes)?, authors)?;
    log::info!("Saved {} author vertices to {}", authors.len(), nodes.display());
    Ok(nodes)
}
