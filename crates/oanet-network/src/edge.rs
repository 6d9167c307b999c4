//! Edge types for citation and coauthorship networks

use std::fmt;

use serde::Serialize;

/// Relation an edge was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Citing work → cited work (directed)
    Citation,
    /// Two authors of the same work (undirected)
    Coauthorship,
}

impl EdgeKind {
    /// Parse kind from string name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "citation" => Some(Self::Citation),
            "coauthorship" => Some(Self::Coauthorship),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Citation => "citation",
            Self::Coauthorship => "coauthorship",
        }
    }

    pub fn is_directed(&self) -> bool {
        matches!(self, Self::Citation)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(source, target, kind)`. For coauthorship the orientation carries no
/// meaning beyond author order within the work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    pub fn citation(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, EdgeKind::Citation)
    }

    pub fn coauthorship(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(a, b, EdgeKind::Coauthorship)
    }

    /// Endpoints with undirected edges normalized to `(min, max)`
    pub fn key(&self) -> (&str, &str) {
        let (s, t) = (self.source.as_str(), self.target.as_str());
        if self.kind.is_directed() || s <= t {
            (s, t)
        } else {
            (t, s)
        }
    }
}
