//! OpenAlex ID ↔ integer conversion

/// Base of OpenAlex entity URLs
pub const OPENALEX_ID_PREFIX: &str = "https://openalex.org/";

/// Numeric part of an OpenAlex ID.
///
/// Accepts full URLs ("https://openalex.org/W2741809807") and short IDs
/// ("W2741809807").
pub fn openalex_id_to_int(id: &str) -> Option<u64> {
    let short = id.rsplit('/').next().filter(|s| !s.is_empty())?;
    let mut chars = short.chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    chars.as_str().parse().ok()
}

/// Full OpenAlex ID for a number, lettered by entity type ("works" → W)
pub fn int_to_openalex_id(n: u64, entity: &str) -> Option<String> {
    let letter = entity.chars().next()?.to_ascii_uppercase();
    Some(format!("{OPENALEX_ID_PREFIX}{letter}{n}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_short_ids() {
        assert_eq!(
            openalex_id_to_int("https://openalex.org/W2741809807"),
            Some(2741809807)
        );
        assert_eq!(openalex_id_to_int("A5023888391"), Some(5023888391));
    }

    #[test]
    fn malformed_ids() {
        assert_eq!(openalex_id_to_int(""), None);
        assert_eq!(openalex_id_to_int("https://openalex.org/"), None);
        assert_eq!(openalex_id_to_int("12345"), None);
        assert_eq!(openalex_id_to_int("Wabc"), None);
    }

    #[test]
    fn int_to_id() {
        assert_eq!(
            int_to_openalex_id(123, "works").as_deref(),
            Some("https://openalex.org/W123")
        );
        assert_eq!(
            int_to_openalex_id(7, "institutions").as_deref(),
            Some("https://openalex.org/I7")
        );
        assert_eq!(int_to_openalex_id(1, ""), None);
    }

    #[test]
    fn conversion_is_reversible() {
        let id = int_to_openalex_id(2741809807, "works").unwrap();
        assert_eq!(openalex_id_to_int(&id), Some(2741809807));
    }
}
