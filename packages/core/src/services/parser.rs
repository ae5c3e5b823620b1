//! Content Parser
//!
//! Turns raw file bytes into a typed [`ContentNode`] tree. The required
//! `type` field selects the concrete variant through a [`VariantRegistry`];
//! unknown discriminators fall back to the generic variant rather than
//! failing, so new content types degrade gracefully. A missing discriminator
//! or malformed JSON is a hard parse failure for that file - the caller
//! converts it into a content problem with a placeholder node and the rest
//! of the version build continues.

use crate::models::{Choice, ContentNode, ContentVariant, QuestionFields};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Parse failure for one file
#[derive(Error, Debug)]
pub enum ParseError {
    /// The bytes were not valid JSON for a content node
    #[error("invalid content JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node in the tree has no `type` discriminator
    #[error("missing required `type` discriminator")]
    MissingDiscriminator,
}

/// Which variant a discriminator string maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Generic,
    Page,
    Question,
    ChoiceQuestion,
    NumericQuestion,
    FreeTextQuestion,
    SymbolicQuestion,
    Media,
    EmailTemplate,
}

/// Registry mapping discriminator strings to variant constructors.
///
/// `Default` carries the built-in content types; deployments with custom
/// types extend it with [`VariantRegistry::register`].
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    kinds: HashMap<String, VariantKind>,
}

impl Default for VariantRegistry {
    fn default() -> Self {
        let mut registry = Self {
            kinds: HashMap::new(),
        };
        registry.register("content", VariantKind::Generic);
        registry.register("questionPage", VariantKind::Page);
        registry.register("question", VariantKind::Question);
        registry.register("choiceQuestion", VariantKind::ChoiceQuestion);
        registry.register("numericQuestion", VariantKind::NumericQuestion);
        registry.register("freeTextQuestion", VariantKind::FreeTextQuestion);
        registry.register("symbolicQuestion", VariantKind::SymbolicQuestion);
        registry.register("image", VariantKind::Media);
        registry.register("video", VariantKind::Media);
        registry.register("figure", VariantKind::Media);
        registry.register("emailTemplate", VariantKind::EmailTemplate);
        registry
    }
}

impl VariantRegistry {
    /// Register (or override) one discriminator.
    pub fn register(&mut self, discriminator: impl Into<String>, kind: VariantKind) {
        self.kinds.insert(discriminator.into(), kind);
    }

    /// Resolve a discriminator; unrecognized strings map to the generic variant.
    pub fn resolve(&self, discriminator: &str) -> VariantKind {
        self.kinds
            .get(discriminator)
            .copied()
            .unwrap_or(VariantKind::Generic)
    }
}

/// Raw mirror of the on-disk node shape, before variant resolution.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawNode {
    id: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<String>,
    title: Option<String>,
    value: Option<String>,
    children: Vec<RawNode>,
    tags: BTreeSet<String>,
    related_content: Vec<String>,
    published: Option<bool>,
    // variant-specific fields
    level: Option<i64>,
    src: Option<String>,
    alt_text: Option<String>,
    hints: Vec<RawNode>,
    answer: Option<Box<RawNode>>,
    choices: Vec<RawChoice>,
    require_units: Option<bool>,
    plain_text_content: Option<String>,
    reply_to_email_address: Option<String>,
    reply_to_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawChoice {
    value: Option<String>,
    correct: bool,
    units: Option<String>,
    explanation: Option<Box<RawNode>>,
}

/// Discriminator-driven parser for content files.
#[derive(Debug, Clone, Default)]
pub struct ContentParser {
    registry: VariantRegistry,
}

impl ContentParser {
    pub fn new(registry: VariantRegistry) -> Self {
        Self { registry }
    }

    /// Parse one file's bytes into a content tree.
    pub fn parse(&self, bytes: &[u8]) -> Result<ContentNode, ParseError> {
        let raw: RawNode = serde_json::from_slice(bytes)?;
        self.build(raw)
    }

    fn build(&self, raw: RawNode) -> Result<ContentNode, ParseError> {
        let content_type = raw
            .content_type
            .clone()
            .ok_or(ParseError::MissingDiscriminator)?;

        let variant = match self.registry.resolve(&content_type) {
            VariantKind::Generic => ContentVariant::Generic {},
            VariantKind::Page => ContentVariant::Page { level: raw.level },
            VariantKind::Question => ContentVariant::Question {
                question: self.build_question_fields(raw.hints, raw.answer)?,
            },
            VariantKind::ChoiceQuestion => ContentVariant::ChoiceQuestion {
                question: self.build_question_fields(raw.hints, raw.answer)?,
                choices: self.build_choices(raw.choices)?,
            },
            VariantKind::NumericQuestion => ContentVariant::NumericQuestion {
                question: self.build_question_fields(raw.hints, raw.answer)?,
                choices: self.build_choices(raw.choices)?,
                require_units: raw.require_units.unwrap_or(false),
            },
            VariantKind::FreeTextQuestion => ContentVariant::FreeTextQuestion {
                question: self.build_question_fields(raw.hints, raw.answer)?,
                choices: self.build_choices(raw.choices)?,
            },
            VariantKind::SymbolicQuestion => ContentVariant::SymbolicQuestion {
                question: self.build_question_fields(raw.hints, raw.answer)?,
                choices: self.build_choices(raw.choices)?,
            },
            VariantKind::Media => ContentVariant::Media {
                src: raw.src,
                alt_text: raw.alt_text,
            },
            VariantKind::EmailTemplate => ContentVariant::EmailTemplate {
                plain_text_content: raw.plain_text_content,
                reply_to_email_address: raw.reply_to_email_address,
                reply_to_name: raw.reply_to_name,
            },
        };

        let children = raw
            .children
            .into_iter()
            .map(|child| self.build(child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContentNode {
            id: raw.id,
            content_type,
            title: raw.title,
            canonical_source_file: None,
            children,
            value: raw.value,
            tags: raw.tags,
            related_content: raw.related_content,
            published: raw.published.unwrap_or(true),
            variant,
        })
    }

    fn build_question_fields(
        &self,
        hints: Vec<RawNode>,
        answer: Option<Box<RawNode>>,
    ) -> Result<QuestionFields, ParseError> {
        Ok(QuestionFields {
            hints: hints
                .into_iter()
                .map(|hint| self.build(hint))
                .collect::<Result<Vec<_>, _>>()?,
            answer: match answer {
                Some(raw) => Some(Box::new(self.build(*raw)?)),
                None => None,
            },
        })
    }

    fn build_choices(&self, choices: Vec<RawChoice>) -> Result<Vec<Choice>, ParseError> {
        choices
            .into_iter()
            .map(|raw| {
                Ok(Choice {
                    value: raw.value,
                    correct: raw.correct,
                    units: raw.units,
                    explanation: match raw.explanation {
                        Some(explanation) => Some(Box::new(self.build(*explanation)?)),
                        None => None,
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ContentParser {
        ContentParser::default()
    }

    #[test]
    fn test_parse_generic_content() {
        let node = parser()
            .parse(br#"{"type": "content", "id": "intro", "value": "hello"}"#)
            .unwrap();
        assert_eq!(node.id.as_deref(), Some("intro"));
        assert_eq!(node.variant, ContentVariant::Generic {});
        assert!(node.published);
    }

    #[test]
    fn test_parse_missing_discriminator_fails() {
        let result = parser().parse(br#"{"id": "intro"}"#);
        assert!(matches!(result, Err(ParseError::MissingDiscriminator)));
    }

    #[test]
    fn test_parse_missing_discriminator_in_child_fails() {
        let result = parser().parse(
            br#"{"type": "content", "id": "page", "children": [{"id": "broken"}]}"#,
        );
        assert!(matches!(result, Err(ParseError::MissingDiscriminator)));
    }

    #[test]
    fn test_parse_malformed_json_fails() {
        let result = parser().parse(b"{not json");
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[test]
    fn test_unknown_discriminator_falls_back_to_generic() {
        let node = parser()
            .parse(br#"{"type": "somethingNew", "id": "x"}"#)
            .unwrap();
        assert_eq!(node.content_type, "somethingNew");
        assert_eq!(node.variant, ContentVariant::Generic {});
    }

    #[test]
    fn test_parse_numeric_question_with_quantities() {
        let node = parser()
            .parse(
                br#"{
                    "type": "numericQuestion",
                    "id": "q1",
                    "requireUnits": true,
                    "choices": [
                        {"value": "3.0e8", "correct": true, "units": "m/s"},
                        {"value": "42", "correct": false, "units": " m/s "}
                    ],
                    "hints": [{"type": "content", "value": "think about light"}]
                }"#,
            )
            .unwrap();

        match &node.variant {
            ContentVariant::NumericQuestion {
                question,
                choices,
                require_units,
            } => {
                assert!(require_units);
                assert_eq!(choices.len(), 2);
                assert!(choices[0].is_quantity());
                assert_eq!(question.hints.len(), 1);
            }
            other => panic!("expected numeric question, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_media_and_page() {
        let media = parser()
            .parse(br#"{"type": "image", "src": "fig.png", "altText": "a figure"}"#)
            .unwrap();
        assert!(matches!(media.variant, ContentVariant::Media { .. }));

        let page = parser()
            .parse(br#"{"type": "questionPage", "id": "p", "level": 3}"#)
            .unwrap();
        assert_eq!(page.variant, ContentVariant::Page { level: Some(3) });
    }

    #[test]
    fn test_custom_registration_overrides_fallback() {
        let mut registry = VariantRegistry::default();
        registry.register("diagram", VariantKind::Media);
        let parser = ContentParser::new(registry);

        let node = parser
            .parse(br#"{"type": "diagram", "src": "d.svg", "altText": "d"}"#)
            .unwrap();
        assert!(matches!(node.variant, ContentVariant::Media { .. }));
    }

    #[test]
    fn test_published_defaults_true_and_respects_false() {
        let node = parser()
            .parse(br#"{"type": "content", "id": "x", "published": false}"#)
            .unwrap();
        assert!(!node.published);
    }
}
