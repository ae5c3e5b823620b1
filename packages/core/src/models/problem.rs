//! Content Problems
//!
//! Non-fatal, queryable records of structural or referential defects found
//! during a version build or its follow-up validation. Problems never abort
//! a build: a single malformed fragment must not prevent the rest of a
//! version from being served.

use crate::models::ContentNode;
use serde::Serialize;
use std::path::Path;

/// A non-fatal defect recorded against one content node (or a placeholder
/// node when parsing failed before an id was known).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProblem {
    /// The offending node; its title defaults to the source file name
    pub node: ContentNode,
    /// Human-readable description of the defect
    pub message: String,
}

impl ContentProblem {
    /// Record a problem against `node`.
    ///
    /// The node is copied so the problem survives cache eviction; when the
    /// node has no title, the source file name is used so problem listings
    /// stay readable.
    pub fn new(node: &ContentNode, message: impl Into<String>) -> Self {
        let mut node = node.clone();
        if node.title.is_none() {
            node.title = node.canonical_source_file.as_deref().and_then(|f| {
                Path::new(f)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            });
        }

        Self {
            node,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_defaults_to_source_file_name() {
        let node = ContentNode::placeholder("physics/waves/intro.json");
        let problem = ContentProblem::new(&node, "unable to parse");

        assert_eq!(problem.node.title.as_deref(), Some("intro.json"));
        assert_eq!(problem.message, "unable to parse");
    }

    #[test]
    fn test_existing_title_is_kept() {
        let node = ContentNode {
            title: Some("Waves intro".to_string()),
            canonical_source_file: Some("physics/waves/intro.json".to_string()),
            ..Default::default()
        };
        let problem = ContentProblem::new(&node, "bad media");

        assert_eq!(problem.node.title.as_deref(), Some("Waves intro"));
    }
}
