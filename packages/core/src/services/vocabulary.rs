//! Vocabulary Registration
//!
//! Collects the per-version tag and unit vocabularies while the cache is
//! being built. Tags are trimmed before registration; units are keyed by a
//! whitespace-free normalized form so that ` m/s `, `m/s` and `m / s`
//! collapse into a single vocabulary entry.

use crate::models::{ContentNode, ContentVariant};
use std::collections::{BTreeSet, HashMap};

/// Add a node's tags to the version vocabulary, trimmed of surrounding
/// whitespace. Tags that trim to nothing are dropped.
pub fn register_tags(tags: &BTreeSet<String>, vocabulary: &mut BTreeSet<String>) {
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() {
            vocabulary.insert(trimmed.to_string());
        }
    }
}

/// Add the units of a numeric question's quantity choices to the version
/// vocabulary, keyed by normalized form. A later raw spelling replaces an
/// earlier one under the same key.
pub fn register_units(node: &ContentNode, vocabulary: &mut HashMap<String, String>) {
    if let ContentVariant::NumericQuestion { choices, .. } = &node.variant {
        for choice in choices {
            if let Some(units) = &choice.units {
                if !units.is_empty() {
                    vocabulary.insert(normalize_unit(units), units.clone());
                }
            }
        }
    }
}

/// Strip all whitespace from a unit string to form its vocabulary key.
pub fn normalize_unit(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::ContentParser;

    #[test]
    fn test_register_tags_trims_and_drops_blank() {
        let mut tags = BTreeSet::new();
        tags.insert(" physics ".to_string());
        tags.insert("waves".to_string());
        tags.insert("   ".to_string());

        let mut vocabulary = BTreeSet::new();
        register_tags(&tags, &mut vocabulary);

        assert_eq!(vocabulary.len(), 2);
        assert!(vocabulary.contains("physics"));
        assert!(vocabulary.contains("waves"));
    }

    #[test]
    fn test_normalize_unit_strips_all_whitespace() {
        assert_eq!(normalize_unit(" m/s "), "m/s");
        assert_eq!(normalize_unit("m / s"), "m/s");
        assert_eq!(normalize_unit("k\tg\n"), "kg");
    }

    #[test]
    fn test_equivalent_unit_spellings_collapse() {
        let node = ContentParser::default()
            .parse(
                br#"{
                    "type": "numericQuestion",
                    "id": "q",
                    "choices": [
                        {"value": "1", "correct": true, "units": " m/s "},
                        {"value": "2", "correct": false, "units": "m/s"}
                    ]
                }"#,
            )
            .unwrap();

        let mut vocabulary = HashMap::new();
        register_units(&node, &mut vocabulary);

        assert_eq!(vocabulary.len(), 1);
        assert_eq!(vocabulary.get("m/s"), Some(&"m/s".to_string()));
    }

    #[test]
    fn test_non_numeric_questions_contribute_no_units() {
        let node = ContentParser::default()
            .parse(
                br#"{
                    "type": "choiceQuestion",
                    "id": "q",
                    "choices": [{"value": "a", "correct": true}]
                }"#,
            )
            .unwrap();

        let mut vocabulary = HashMap::new();
        register_units(&node, &mut vocabulary);
        assert!(vocabulary.is_empty());
    }
}
