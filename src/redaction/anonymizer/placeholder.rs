//! Placeholder tokens

use crate::redaction::models::EntityKind;
use crate::redaction::text::OffsetMap;

/// Replacement for email addresses
pub const EMAIL_PLACEHOLDER: &str = "[REDACTED EMAIL]";

/// Replacement for phone numbers
pub const PHONE_PLACEHOLDER: &str = "[REDACTED PHONE]";

/// Replacement for every recognizer kind
pub const ENTITY_PLACEHOLDER: &str = "[Redacted PII]";

/// Fixed mapping from entity kind to placeholder literal
pub struct Placeholders;

impl Placeholders {
    /// Placeholder for a kind
    pub fn for_kind(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Email => EMAIL_PLACEHOLDER,
            EntityKind::Phone => PHONE_PLACEHOLDER,
            EntityKind::Person | EntityKind::Location | EntityKind::Org | EntityKind::Misc => {
                ENTITY_PLACEHOLDER
            }
        }
    }

    /// Every placeholder literal
    pub fn all() -> [&'static str; 3] {
        [EMAIL_PLACEHOLDER, PHONE_PLACEHOLDER, ENTITY_PLACEHOLDER]
    }

    /// Char ranges of placeholder literals present in `text`, sorted by start
    ///
    /// Stage 2 must not rewrite these regions, otherwise a second pass over
    /// already-redacted text would turn `[REDACTED EMAIL]` into
    /// `[[Redacted PII] EMAIL]`.
    pub fn protected_regions(text: &str) -> Vec<(usize, usize)> {
        let map = OffsetMap::new(text);
        let mut regions: Vec<(usize, usize)> = Self::all()
            .iter()
            .flat_map(|literal| {
                text.match_indices(literal)
                    .map(|(byte, found)| (byte, byte + found.len()))
            })
            .filter_map(|(start, end)| map.char_range(start, end))
            .collect();
        regions.sort_unstable();
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redaction::detector::default_matchers;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Placeholders::for_kind(EntityKind::Email), "[REDACTED EMAIL]");
        assert_eq!(Placeholders::for_kind(EntityKind::Phone), "[REDACTED PHONE]");
        for kind in [
            EntityKind::Person,
            EntityKind::Location,
            EntityKind::Org,
            EntityKind::Misc,
        ] {
            assert_eq!(Placeholders::for_kind(kind), "[Redacted PII]");
        }
    }

    #[test]
    fn test_placeholders_never_match_patterns() {
        let text = Placeholders::all().join(" ");
        for matcher in default_matchers().unwrap() {
            assert!(matcher.detect(&text).unwrap().is_empty(), "{}", matcher.name());
        }
    }

    #[test]
    fn test_protected_regions() {
        let text = "é [REDACTED EMAIL] and [Redacted PII]";
        let regions = Placeholders::protected_regions(text);
        assert_eq!(regions, vec![(2, 18), (23, 37)]);
    }

    #[test]
    fn test_no_protected_regions_in_plain_text() {
        assert!(Placeholders::protected_regions("REDACTED EMAIL without brackets").is_empty());
    }
}
