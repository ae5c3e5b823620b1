//! Content Node Data Structures
//!
//! This module defines the core `ContentNode` struct and its typed variants.
//!
//! # Architecture
//!
//! - **Universal Node**: a single struct represents all content types
//! - **Discriminator Variants**: type-specific fields live in [`ContentVariant`],
//!   selected by the `type` discriminator string at parse time
//! - **Weak References**: `related_content` holds plain id strings that are
//!   resolved lazily against a version's content map, never as owning pointers
//!
//! Nodes are immutable once a version's content map has been published; the
//! only mutation happens during the augmentation pass of a build.

use serde::Serialize;
use std::collections::BTreeSet;

/// Separator used when qualifying a nested node's id with its ancestors' ids.
pub const ID_SEPARATOR: &str = "/";

/// A typed, possibly-recursive unit of content.
///
/// Within one version of the content forest every namespaced id is unique.
/// Before namespacing (see the augmenter) `id` may be absent, and nested ids
/// are only unique within their own file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Unique identifier within a version, once namespaced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Discriminator string selecting the concrete variant
    #[serde(rename = "type")]
    pub content_type: String,

    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Path of the file this node was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_source_file: Option<String>,

    /// Ordered child nodes (owned)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,

    /// Optional scalar value, mutually exclusive with non-empty `children`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Distinct tag strings attached to this node
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    /// Ids of related nodes; weak references that may point across subtrees
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_content: Vec<String>,

    /// Whether this node is published
    pub published: bool,

    /// Variant-specific fields
    #[serde(flatten)]
    pub variant: ContentVariant,
}

/// Equality is deep and recursive but ignores `canonical_source_file`, so
/// that identical content appearing in more than one file compares equal and
/// is deduplicated silently rather than reported as a conflict.
impl PartialEq for ContentNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.content_type == other.content_type
            && self.title == other.title
            && self.children == other.children
            && self.value == other.value
            && self.tags == other.tags
            && self.related_content == other.related_content
            && self.published == other.published
            && self.variant == other.variant
    }
}

impl Default for ContentNode {
    fn default() -> Self {
        Self {
            id: None,
            content_type: "content".to_string(),
            title: None,
            canonical_source_file: None,
            children: Vec::new(),
            value: None,
            tags: BTreeSet::new(),
            related_content: Vec::new(),
            published: true,
            variant: ContentVariant::Generic {},
        }
    }
}

impl ContentNode {
    /// Create a placeholder node carrying only the source path.
    ///
    /// Used when parsing fails before an id is known, so the failure can
    /// still be recorded as a content problem against the offending file.
    pub fn placeholder(canonical_source_file: impl Into<String>) -> Self {
        Self {
            canonical_source_file: Some(canonical_source_file.into()),
            ..Default::default()
        }
    }

    /// Whether this node is question-like (any question variant).
    pub fn is_question(&self) -> bool {
        matches!(
            self.variant,
            ContentVariant::Question { .. }
                | ContentVariant::ChoiceQuestion { .. }
                | ContentVariant::NumericQuestion { .. }
                | ContentVariant::FreeTextQuestion { .. }
                | ContentVariant::SymbolicQuestion { .. }
        )
    }

    /// The question sub-fields (hints, embedded answer), if this node is a question.
    pub fn question_fields(&self) -> Option<&QuestionFields> {
        match &self.variant {
            ContentVariant::Question { question }
            | ContentVariant::ChoiceQuestion { question, .. }
            | ContentVariant::NumericQuestion { question, .. }
            | ContentVariant::FreeTextQuestion { question, .. }
            | ContentVariant::SymbolicQuestion { question, .. } => Some(question),
            _ => None,
        }
    }

    /// Mutable access to the question sub-fields.
    pub fn question_fields_mut(&mut self) -> Option<&mut QuestionFields> {
        match &mut self.variant {
            ContentVariant::Question { question }
            | ContentVariant::ChoiceQuestion { question, .. }
            | ContentVariant::NumericQuestion { question, .. }
            | ContentVariant::FreeTextQuestion { question, .. }
            | ContentVariant::SymbolicQuestion { question, .. } => Some(question),
            _ => None,
        }
    }

    /// The answer choices, if this node is a choice-bearing question.
    pub fn choices(&self) -> Option<&[Choice]> {
        match &self.variant {
            ContentVariant::ChoiceQuestion { choices, .. }
            | ContentVariant::NumericQuestion { choices, .. }
            | ContentVariant::FreeTextQuestion { choices, .. }
            | ContentVariant::SymbolicQuestion { choices, .. } => Some(choices),
            _ => None,
        }
    }

    /// Mutable access to the answer choices.
    pub fn choices_mut(&mut self) -> Option<&mut Vec<Choice>> {
        match &mut self.variant {
            ContentVariant::ChoiceQuestion { choices, .. }
            | ContentVariant::NumericQuestion { choices, .. }
            | ContentVariant::FreeTextQuestion { choices, .. }
            | ContentVariant::SymbolicQuestion { choices, .. } => Some(choices),
            _ => None,
        }
    }
}

/// Variant-specific fields, selected by the `type` discriminator at parse time.
///
/// Unknown discriminators fall back to [`ContentVariant::Generic`] rather than
/// failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ContentVariant {
    /// A page of questions; carries a difficulty level that must be positive
    Page {
        #[serde(skip_serializing_if = "Option::is_none")]
        level: Option<i64>,
    },
    /// Free-form question without answer choices
    Question {
        #[serde(flatten)]
        question: QuestionFields,
    },
    /// Question answered by selecting from a fixed set of choices
    ChoiceQuestion {
        #[serde(flatten)]
        question: QuestionFields,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        choices: Vec<Choice>,
    },
    /// Question answered with a numeric quantity; choices carry unit strings
    NumericQuestion {
        #[serde(flatten)]
        question: QuestionFields,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        choices: Vec<Choice>,
        require_units: bool,
    },
    /// Free-text question; choice metadata is validated elsewhere
    FreeTextQuestion {
        #[serde(flatten)]
        question: QuestionFields,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        choices: Vec<Choice>,
    },
    /// Symbolic question; choice metadata is validated elsewhere
    SymbolicQuestion {
        #[serde(flatten)]
        question: QuestionFields,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        choices: Vec<Choice>,
    },
    /// Embedded media with a source path and alt text
    Media {
        #[serde(skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
    },
    /// Outgoing email template
    EmailTemplate {
        #[serde(skip_serializing_if = "Option::is_none")]
        plain_text_content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_to_email_address: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_to_name: Option<String>,
    },
    /// Plain content; also the fallback for unrecognized discriminators
    Generic {},
}

/// Secondary trees shared by all question variants.
///
/// These are namespaced by the augmenter like regular children, but are not
/// part of the flattened node set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFields {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<ContentNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Box<ContentNode>>,
}

/// One answer choice of a choice-bearing question.
///
/// A choice with `units` present is a quantity; its `value` must parse as a
/// floating-point number to ever be matched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Box<ContentNode>>,
}

impl Choice {
    /// Whether this choice carries a quantity (a unit string is present).
    pub fn is_quantity(&self) -> bool {
        self.units.is_some()
    }
}
