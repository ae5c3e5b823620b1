//! Content Validation
//!
//! Structural checks run per node during a version build, and a whole-version
//! referential integrity pass run once the content map is complete. Neither
//! pass fails a build; every finding becomes a [`ContentProblem`] recorded
//! against the offending node.

use crate::models::{ContentNode, ContentProblem, ContentVariant};
use crate::services::augmenter::{flatten, is_remote};
use crate::store::ObjectStore;
use std::collections::{HashMap, HashSet};
use tracing::{error, warn};

/// Per-node structural validator for one version build.
///
/// Holds the commit so media references can be checked against the object
/// store tree they will be served from.
pub struct StructuralValidator<'a> {
    store: &'a dyn ObjectStore,
    commit: &'a str,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(store: &'a dyn ObjectStore, commit: &'a str) -> Self {
        Self { store, commit }
    }

    /// Run every structural check against one node, appending findings.
    pub async fn validate(&self, node: &ContentNode, problems: &mut Vec<ContentProblem>) {
        if node.value.is_some() && !node.children.is_empty() {
            problems.push(ContentProblem::new(
                node,
                "Both children and a value are set; only one is allowed".to_string(),
            ));
        }

        if node.is_question() && node.id.is_none() {
            problems.push(ContentProblem::new(
                node,
                format!(
                    "Question '{}' has no id; answer attempts against it cannot be recorded",
                    node.title.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        self.check_choices(node, problems);
        self.check_numeric_question(node, problems);
        self.check_media(node, problems).await;
        self.check_page(node, problems);
        self.check_email_template(node, problems);
    }

    /// Choice-bearing question types must carry at least one choice, and at
    /// least one must be marked correct. Free-text and symbolic questions
    /// match answers differently and are exempt.
    fn check_choices(&self, node: &ContentNode, problems: &mut Vec<ContentProblem>) {
        let checked = matches!(
            node.variant,
            ContentVariant::ChoiceQuestion { .. } | ContentVariant::NumericQuestion { .. }
        );
        if !checked {
            return;
        }
        let choices = node.choices().unwrap_or(&[]);
        if choices.is_empty() {
            problems.push(ContentProblem::new(
                node,
                "Question has no choice metadata and will mark every attempt incorrect"
                    .to_string(),
            ));
        } else if !choices.iter().any(|choice| choice.correct) {
            problems.push(ContentProblem::new(
                node,
                "Question has no choice marked correct".to_string(),
            ));
        }
    }

    fn check_numeric_question(&self, node: &ContentNode, problems: &mut Vec<ContentProblem>) {
        if let ContentVariant::NumericQuestion {
            choices,
            require_units,
            ..
        } = &node.variant
        {
            for choice in choices {
                if choice.is_quantity() {
                    let parses = choice
                        .value
                        .as_deref()
                        .map(|value| value.trim().parse::<f64>().is_ok())
                        .unwrap_or(false);
                    if !parses {
                        problems.push(ContentProblem::new(
                            node,
                            format!(
                                "Numeric question has a quantity whose value ({:?}) cannot be interpreted as a number",
                                choice.value
                            ),
                        ));
                    }
                } else if *require_units {
                    problems.push(ContentProblem::new(
                        node,
                        "Numeric question requires units but has a choice without them"
                            .to_string(),
                    ));
                }
            }
        }
    }

    async fn check_media(&self, node: &ContentNode, problems: &mut Vec<ContentProblem>) {
        if let ContentVariant::Media { src, alt_text } = &node.variant {
            if let Some(src) = src {
                if !is_remote(src) {
                    match self.store.verify_object_exists(self.commit, src).await {
                        Ok(true) => {}
                        Ok(false) => problems.push(ContentProblem::new(
                            node,
                            format!(
                                "Unable to find the media file {src} in the object store; is the reference correct?"
                            ),
                        )),
                        Err(e) => {
                            error!(%src, error = %e, "media existence check failed");
                        }
                    }
                }
            }
            if alt_text.as_deref().map(str::trim).unwrap_or("").is_empty() {
                problems.push(ContentProblem::new(
                    node,
                    "Media element has no altText".to_string(),
                ));
            }
        }
    }

    fn check_page(&self, node: &ContentNode, problems: &mut Vec<ContentProblem>) {
        if let ContentVariant::Page { level } = &node.variant {
            match level {
                Some(level) if *level > 0 => {}
                _ => problems.push(ContentProblem::new(
                    node,
                    "Question page has a missing or non-positive level".to_string(),
                )),
            }
        }
    }

    fn check_email_template(&self, node: &ContentNode, problems: &mut Vec<ContentProblem>) {
        if let ContentVariant::EmailTemplate {
            plain_text_content,
            reply_to_email_address,
            reply_to_name,
        } = &node.variant
        {
            if plain_text_content.is_none() {
                problems.push(ContentProblem::new(
                    node,
                    "Email template has no plain text content".to_string(),
                ));
            }
            if reply_to_email_address.is_some() && reply_to_name.is_none() {
                problems.push(ContentProblem::new(
                    node,
                    "Email template sets a reply-to address without a reply-to name".to_string(),
                ));
            }
        }
    }
}

/// Whole-version referential integrity pass.
///
/// Collects every defined id and every id referenced through
/// `relatedContent` across the version, and reports each reference with no
/// matching definition against the first node that referenced it. The
/// missing ids are sorted so repeated runs over the same map report them in
/// a stable order.
pub fn check_referential_integrity(content: &HashMap<String, ContentNode>) -> Vec<ContentProblem> {
    let mut defined: HashSet<&str> = HashSet::new();
    let mut expected: Vec<&str> = Vec::new();
    let mut referrer: HashMap<&str, &ContentNode> = HashMap::new();

    for root in content.values() {
        for node in flatten(root) {
            if let Some(id) = &node.id {
                defined.insert(id);
            }
            for related in &node.related_content {
                if !referrer.contains_key(related.as_str()) {
                    expected.push(related);
                    referrer.insert(related, node);
                }
            }
        }
    }

    let mut missing: Vec<&str> = expected
        .into_iter()
        .filter(|id| !defined.contains(id))
        .collect();
    missing.sort_unstable();
    missing.dedup();

    let problems: Vec<ContentProblem> = missing
        .into_iter()
        .map(|id| {
            let node = referrer[id];
            ContentProblem::new(
                node,
                format!(
                    "Related content '{id}' does not exist in this version (referenced from {})",
                    node.canonical_source_file.as_deref().unwrap_or("unknown")
                ),
            )
        })
        .collect();

    if !problems.is_empty() {
        warn!(
            missing = problems.len(),
            "referential integrity check found dangling related content"
        );
    }
    problems
}
