//! Content Augmentation
//!
//! Post-parse pass over a file's content tree: records the canonical source
//! file on every node, namespaces child ids under their parent with
//! [`ID_SEPARATOR`], and rewrites relative media references against the
//! source file's directory. Also flattens a tree into the node list the
//! cache builder indexes.

use crate::models::{ContentNode, ContentVariant, ID_SEPARATOR};
use tracing::warn;

/// Augment a parsed tree in place.
///
/// `parent_id` is the already-namespaced id of the enclosing node, `None`
/// at the file root. Ids become `parent/child` so the same fragment id can
/// recur under different parents without colliding. Hints, answers and
/// choice explanations are namespaced under the question that owns them.
pub fn augment(node: &mut ContentNode, source_file: &str, parent_id: Option<&str>) {
    if node.is_question() && node.id.is_none() {
        warn!(
            source_file,
            title = node.title.as_deref().unwrap_or("unknown"),
            "question found without an id; attempts against it cannot be recorded"
        );
    }

    // id-less nodes stay id-less; the namespace still flows through them so
    // identified descendants end up qualified by every identified ancestor
    let namespaced_id = match (&node.id, parent_id) {
        (Some(id), Some(parent)) => Some(format!("{parent}{ID_SEPARATOR}{id}")),
        (Some(id), None) => Some(id.clone()),
        (None, parent) => parent.map(str::to_string),
    };

    node.canonical_source_file = Some(source_file.to_string());

    for child in &mut node.children {
        augment(child, source_file, namespaced_id.as_deref());
    }

    if let Some(question) = node.question_fields_mut() {
        for hint in &mut question.hints {
            augment(hint, source_file, namespaced_id.as_deref());
        }
        if let Some(answer) = &mut question.answer {
            augment(answer, source_file, namespaced_id.as_deref());
        }
    }

    if let Some(choices) = node.choices_mut() {
        for choice in choices {
            if let Some(explanation) = &mut choice.explanation {
                augment(explanation, source_file, namespaced_id.as_deref());
            }
        }
    }

    if let ContentVariant::Media { src: Some(src), .. } = &mut node.variant {
        if !is_remote(src) {
            *src = resolve_relative_src(source_file, src);
        }
    }

    if node.id.is_some() {
        node.id = namespaced_id;
    }
}

/// Depth-first, parent-first list of a tree's nodes, the tree included.
///
/// Only `children` links are walked. Hints, answers and explanations stay
/// inside their question and are not indexed individually.
pub fn flatten(root: &ContentNode) -> Vec<&ContentNode> {
    let mut nodes = Vec::new();
    collect(root, &mut nodes);
    nodes
}

fn collect<'a>(node: &'a ContentNode, nodes: &mut Vec<&'a ContentNode>) {
    nodes.push(node);
    for child in &node.children {
        collect(child, nodes);
    }
}

pub(crate) fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Resolve a relative media path against the content file's directory,
/// collapsing `.` and `..` components lexically.
fn resolve_relative_src(source_file: &str, src: &str) -> String {
    let directory = match source_file.rfind('/') {
        Some(index) => &source_file[..index],
        None => "",
    };
    let joined = if directory.is_empty() {
        src.to_string()
    } else {
        format!("{directory}/{src}")
    };

    let mut components: Vec<&str> = Vec::new();
    for component in joined.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            other => components.push(other),
        }
    }
    components.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parser::ContentParser;

    fn parse(json: &str) -> ContentNode {
        ContentParser::default().parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_augment_namespaces_child_ids() {
        let mut root = parse(
            r#"{
                "type": "questionPage",
                "id": "page",
                "children": [
                    {"type": "question", "id": "part1", "children": [
                        {"type": "content", "id": "deep"}
                    ]},
                    {"type": "content"}
                ]
            }"#,
        );
        augment(&mut root, "physics/page.json", None);

        assert_eq!(root.id.as_deref(), Some("page"));
        assert_eq!(root.children[0].id.as_deref(), Some("page/part1"));
        assert_eq!(
            root.children[0].children[0].id.as_deref(),
            Some("page/part1/deep")
        );
        // id-less nodes stay id-less even inside a namespace
        assert_eq!(root.children[1].id, None);
    }

    #[test]
    fn test_augment_records_source_file_everywhere() {
        let mut root = parse(
            r#"{"type": "content", "id": "a", "children": [{"type": "content", "id": "b"}]}"#,
        );
        augment(&mut root, "a.json", None);
        for node in flatten(&root) {
            assert_eq!(node.canonical_source_file.as_deref(), Some("a.json"));
        }
    }

    #[test]
    fn test_augment_namespaces_hints_answers_and_explanations() {
        let mut root = parse(
            r#"{
                "type": "choiceQuestion",
                "id": "q",
                "hints": [{"type": "content", "id": "hint1"}],
                "answer": {"type": "content", "id": "ans"},
                "choices": [
                    {"value": "yes", "correct": true,
                     "explanation": {"type": "content", "id": "why"}}
                ]
            }"#,
        );
        augment(&mut root, "q.json", None);

        let question = root.question_fields().unwrap();
        assert_eq!(question.hints[0].id.as_deref(), Some("q/hint1"));
        assert_eq!(
            question.answer.as_ref().unwrap().id.as_deref(),
            Some("q/ans")
        );
        let choices = root.choices().unwrap();
        assert_eq!(
            choices[0].explanation.as_ref().unwrap().id.as_deref(),
            Some("q/why")
        );
    }

    #[test]
    fn test_augment_rewrites_relative_media_src() {
        let mut figure = parse(r#"{"type": "figure", "src": "../figures/fig.png", "altText": "f"}"#);
        augment(&mut figure, "physics/waves/page.json", None);
        match &figure.variant {
            ContentVariant::Media { src, .. } => {
                assert_eq!(src.as_deref(), Some("physics/figures/fig.png"));
            }
            other => panic!("expected media, got {other:?}"),
        }
    }

    #[test]
    fn test_augment_leaves_remote_media_src_alone() {
        let mut figure =
            parse(r#"{"type": "image", "src": "https://cdn.example.com/a.png", "altText": "a"}"#);
        augment(&mut figure, "physics/page.json", None);
        match &figure.variant {
            ContentVariant::Media { src, .. } => {
                assert_eq!(src.as_deref(), Some("https://cdn.example.com/a.png"));
            }
            other => panic!("expected media, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_relative_src_handles_dot_components() {
        assert_eq!(resolve_relative_src("a/b/page.json", "./fig.png"), "a/b/fig.png");
        assert_eq!(resolve_relative_src("a/b/page.json", "../../fig.png"), "fig.png");
        assert_eq!(resolve_relative_src("page.json", "fig.png"), "fig.png");
    }

    #[test]
    fn test_flatten_is_parent_first() {
        let mut root = parse(
            r#"{"type": "content", "id": "a", "children": [
                {"type": "content", "id": "b", "children": [{"type": "content", "id": "c"}]},
                {"type": "content", "id": "d"}
            ]}"#,
        );
        augment(&mut root, "a.json", None);
        let ids: Vec<_> = flatten(&root)
            .into_iter()
            .map(|n| n.id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "a/b", "a/b/c", "a/d"]);
    }
}
