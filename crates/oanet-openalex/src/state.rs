//! Session state types for OpenAlex retrieval

use std::fmt;

use serde::Deserialize;

/// OpenAlex entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Academic works (papers, articles, etc.)
    Works,
    /// Researchers and authors
    Authors,
    /// Journals, repositories, conferences
    Sources,
    /// Universities, research organizations
    Institutions,
    /// Academic publishers
    Publishers,
    /// Research topics (hierarchical classification)
    Topics,
    /// Funding organizations
    Funders,
    /// Legacy concept tags
    Concepts,
}

impl Entity {
    /// Parse entity from string name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "works" => Some(Self::Works),
            "authors" => Some(Self::Authors),
            "sources" | "venues" => Some(Self::Sources),
            "institutions" => Some(Self::Institutions),
            "publishers" => Some(Self::Publishers),
            "topics" => Some(Self::Topics),
            "funders" => Some(Self::Funders),
            "concepts" => Some(Self::Concepts),
            _ => None,
        }
    }

    /// Path segment of the listing endpoint
    pub fn api_path(&self) -> &'static str {
        match self {
            Self::Works => "works",
            Self::Authors => "authors",
            Self::Sources => "sources",
            Self::Institutions => "institutions",
            Self::Publishers => "publishers",
            Self::Topics => "topics",
            Self::Funders => "funders",
            Self::Concepts => "concepts",
        }
    }

    /// List all available entities
    pub fn all() -> &'static [Entity] {
        &[
            Self::Works,
            Self::Authors,
            Self::Sources,
            Self::Institutions,
            Self::Publishers,
            Self::Topics,
            Self::Funders,
            Self::Concepts,
        ]
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_path())
    }
}

/// Upstream refuses offset paging past this many results
pub const OFFSET_PAGING_LIMIT: usize = 10_000;

/// Pagination protocol for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// `page=1,2,3...`
    Offset,
    /// `cursor=*`, then `meta.next_cursor`
    Cursor,
    /// Offset when a cap within the offset limit is set, cursor otherwise
    #[default]
    Auto,
}

impl PagingMode {
    /// Resolve `Auto` against the session's entity cap.
    pub fn resolve(self, max_entities: Option<usize>) -> PagingMode {
        match self {
            Self::Auto => match max_entities {
                Some(max) if max <= OFFSET_PAGING_LIMIT => Self::Offset,
                _ => Self::Cursor,
            },
            other => other,
        }
    }
}

/// Position of the next request within a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// 1-based page index
    Page(u32),
    /// Opaque continuation token
    Cursor(String),
}

impl PageCursor {
    /// Starting position for a resolved paging mode
    pub fn start(mode: PagingMode) -> Self {
        match mode {
            PagingMode::Cursor => Self::Cursor("*".to_string()),
            PagingMode::Offset | PagingMode::Auto => Self::Page(1),
        }
    }

    /// Query parameter carrying this position
    pub fn query_param(&self) -> (String, String) {
        match self {
            Self::Page(n) => ("page".to_string(), n.to_string()),
            Self::Cursor(token) => ("cursor".to_string(), token.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_from_name() {
        assert_eq!(Entity::from_name("works"), Some(Entity::Works));
        assert_eq!(Entity::from_name("Works"), Some(Entity::Works));
        assert_eq!(Entity::from_name("AUTHORS"), Some(Entity::Authors));
        assert_eq!(Entity::from_name("venues"), Some(Entity::Sources));
        assert_eq!(Entity::from_name("concepts"), Some(Entity::Concepts));
        assert_eq!(Entity::from_name("unknown"), None);
    }

    #[test]
    fn entity_display() {
        assert_eq!(format!("{}", Entity::Works), "works");
        assert_eq!(format!("{}", Entity::Institutions), "institutions");
    }

    #[test]
    fn entity_all_roundtrips_through_name() {
        let all = Entity::all();
        assert_eq!(all.len(), 8);
        for e in all {
            assert_eq!(Entity::from_name(e.api_path()), Some(*e));
        }
    }

    #[test]
    fn auto_paging_resolution() {
        assert_eq!(PagingMode::Auto.resolve(Some(500)), PagingMode::Offset);
        assert_eq!(
            PagingMode::Auto.resolve(Some(OFFSET_PAGING_LIMIT)),
            PagingMode::Offset
        );
        assert_eq!(PagingMode::Auto.resolve(Some(10_001)), PagingMode::Cursor);
        assert_eq!(PagingMode::Auto.resolve(None), PagingMode::Cursor);
        assert_eq!(PagingMode::Cursor.resolve(Some(5)), PagingMode::Cursor);
        assert_eq!(PagingMode::Offset.resolve(None), PagingMode::Offset);
    }

    #[test]
    fn cursor_start_and_params() {
        assert_eq!(
            PageCursor::start(PagingMode::Cursor).query_param(),
            ("cursor".to_string(), "*".to_string())
        );
        assert_eq!(
            PageCursor::start(PagingMode::Offset).query_param(),
            ("page".to_string(), "1".to_string())
        );
    }
}
