//! In-Memory Search Provider
//!
//! A [`SearchProvider`] that keeps every index in process memory. Documents
//! are stored as parsed JSON in insertion order; matching walks the stored
//! values directly. Good enough for tests and single-process deployments -
//! the matching semantics deliberately mirror what the cache expects from a
//! real term-search backend (exact terms, prefixes, substring fuzzing,
//! boolean field matchers, seeded random ordering).

use crate::models::{BooleanOperator, FieldMatch, ResultsWrapper, SortOrder};
use crate::search::{SearchError, SearchProvider};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Doc {
    id: String,
    source: Value,
}

/// In-memory search indexes keyed by `(version, doc_type)`.
#[derive(Debug, Default)]
pub struct MemorySearchProvider {
    indices: RwLock<HashMap<String, HashMap<String, Vec<Doc>>>>,
}

impl MemorySearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    async fn matching_ids<F>(
        &self,
        version: &str,
        doc_type: &str,
        predicate: F,
    ) -> Vec<(String, Value)>
    where
        F: Fn(&Value) -> bool,
    {
        let indices = self.indices.read().await;
        indices
            .get(version)
            .and_then(|types| types.get(doc_type))
            .map(|docs| {
                docs.iter()
                    .filter(|doc| predicate(&doc.source))
                    .map(|doc| (doc.id.clone(), doc.source.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Extract the comparable string values of one document field.
fn field_values(doc: &Value, field: &str) -> Vec<String> {
    match doc.get(field) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Bool(b)) => vec![b.to_string()],
        Some(Value::Number(n)) => vec![n.to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(other) => vec![other.to_string()],
        None => Vec::new(),
    }
}

fn satisfies(doc: &Value, matcher: &FieldMatch) -> bool {
    let values = field_values(doc, &matcher.field);
    match matcher.operator {
        BooleanOperator::Or => matcher.values.iter().any(|v| values.contains(v)),
        BooleanOperator::And => matcher.values.iter().all(|v| values.contains(v)),
    }
}

fn satisfies_all(doc: &Value, matchers: &[FieldMatch]) -> bool {
    matchers.iter().all(|m| satisfies(doc, m))
}

fn paginate(ids: Vec<String>, start_index: usize, limit: usize) -> ResultsWrapper<String> {
    let total = ids.len() as u64;
    let page = ids.into_iter().skip(start_index).take(limit).collect();
    ResultsWrapper::new(page, total)
}

#[async_trait]
impl SearchProvider for MemorySearchProvider {
    async fn has_index(&self, version: &str) -> bool {
        self.indices.read().await.contains_key(version)
    }

    async fn bulk_index(
        &self,
        version: &str,
        doc_type: &str,
        docs: Vec<(String, String)>,
    ) -> Result<(), SearchError> {
        let mut parsed = Vec::with_capacity(docs.len());
        for (id, serialized) in docs {
            let source: Value = serde_json::from_str(&serialized)
                .map_err(|e| SearchError::InvalidDocument(format!("{id}: {e}")))?;
            parsed.push(Doc { id, source });
        }

        let mut indices = self.indices.write().await;
        indices
            .entry(version.to_string())
            .or_default()
            .entry(doc_type.to_string())
            .or_default()
            .extend(parsed);
        Ok(())
    }

    async fn expunge_index(&self, version: &str) {
        self.indices.write().await.remove(version);
    }

    async fn expunge_all(&self) {
        self.indices.write().await.clear();
    }

    async fn term_search(
        &self,
        version: &str,
        doc_type: &str,
        terms: &[String],
        field: &str,
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError> {
        let matches = self
            .matching_ids(version, doc_type, |doc| {
                let values = field_values(doc, field);
                terms.iter().any(|t| values.contains(t))
            })
            .await;
        Ok(paginate(
            matches.into_iter().map(|(id, _)| id).collect(),
            start_index,
            limit,
        ))
    }

    async fn fuzzy_search(
        &self,
        version: &str,
        doc_type: &str,
        query: &str,
        must_match: &[FieldMatch],
        fields: &[String],
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError> {
        let needle = query.to_lowercase();
        let matches = self
            .matching_ids(version, doc_type, |doc| {
                if !satisfies_all(doc, must_match) {
                    return false;
                }
                fields.iter().any(|field| {
                    let haystack = match doc.get(field) {
                        Some(value) => value.to_string().to_lowercase(),
                        None => return false,
                    };
                    haystack.contains(&needle)
                })
            })
            .await;
        Ok(paginate(
            matches.into_iter().map(|(id, _)| id).collect(),
            start_index,
            limit,
        ))
    }

    async fn prefix_search(
        &self,
        version: &str,
        doc_type: &str,
        field: &str,
        prefix: &str,
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError> {
        let matches = self
            .matching_ids(version, doc_type, |doc| {
                field_values(doc, field)
                    .iter()
                    .any(|v| v.starts_with(prefix))
            })
            .await;
        Ok(paginate(
            matches.into_iter().map(|(id, _)| id).collect(),
            start_index,
            limit,
        ))
    }

    async fn paginated_match(
        &self,
        version: &str,
        doc_type: &str,
        matchers: &[FieldMatch],
        sort: Option<(String, SortOrder)>,
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError> {
        let mut matches = self
            .matching_ids(version, doc_type, |doc| satisfies_all(doc, matchers))
            .await;

        if let Some((field, order)) = sort {
            matches.sort_by(|(_, a), (_, b)| {
                let a = field_values(a, &field).into_iter().next().unwrap_or_default();
                let b = field_values(b, &field).into_iter().next().unwrap_or_default();
                match order {
                    SortOrder::Asc => a.cmp(&b),
                    SortOrder::Desc => b.cmp(&a),
                }
            });
        }

        Ok(paginate(
            matches.into_iter().map(|(id, _)| id).collect(),
            start_index,
            limit,
        ))
    }

    async fn randomised_paginated_match(
        &self,
        version: &str,
        doc_type: &str,
        matchers: &[FieldMatch],
        start_index: usize,
        limit: usize,
        seed: Option<u64>,
    ) -> Result<ResultsWrapper<String>, SearchError> {
        let matches = self
            .matching_ids(version, doc_type, |doc| satisfies_all(doc, matchers))
            .await;
        let mut ids: Vec<String> = matches.into_iter().map(|(id, _)| id).collect();

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ids.shuffle(&mut rng);

        Ok(paginate(ids, start_index, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn sample_provider() -> MemorySearchProvider {
        let provider = MemorySearchProvider::new();
        let docs = vec![
            (
                "alpha".to_string(),
                json!({"id": "alpha", "title": "Wave motion", "tags": ["physics", "waves"], "type": "questionPage", "level": 2}).to_string(),
            ),
            (
                "beta".to_string(),
                json!({"id": "beta", "title": "Circuits", "tags": ["physics", "electricity"], "type": "questionPage", "level": 4}).to_string(),
            ),
            (
                "alpha/q1".to_string(),
                json!({"id": "alpha/q1", "title": "Speed of sound", "tags": ["waves"], "type": "numericQuestion"}).to_string(),
            ),
        ];
        provider.bulk_index("v1", "content", docs).await.unwrap();
        provider
    }

    #[tokio::test]
    async fn test_has_index_and_expunge() {
        let provider = sample_provider().await;
        assert!(provider.has_index("v1").await);
        assert!(!provider.has_index("v2").await);

        provider.expunge_index("v1").await;
        assert!(!provider.has_index("v1").await);
    }

    #[tokio::test]
    async fn test_term_search_matches_array_fields() {
        let provider = sample_provider().await;
        let hits = provider
            .term_search("v1", "content", &["waves".to_string()], "tags", 0, 10)
            .await
            .unwrap();
        assert_eq!(hits.total_results, 2);
        assert!(hits.results.contains(&"alpha".to_string()));
        assert!(hits.results.contains(&"alpha/q1".to_string()));
    }

    #[tokio::test]
    async fn test_prefix_search_on_id() {
        let provider = sample_provider().await;
        let hits = provider
            .prefix_search("v1", "content", "id", "alpha", 0, 10)
            .await
            .unwrap();
        assert_eq!(hits.total_results, 2);
    }

    #[tokio::test]
    async fn test_fuzzy_search_with_must_match() {
        let provider = sample_provider().await;
        let must = vec![FieldMatch::any_of("type", vec!["questionPage".to_string()])];
        let hits = provider
            .fuzzy_search(
                "v1",
                "content",
                "wave",
                &must,
                &["title".to_string(), "tags".to_string()],
                0,
                10,
            )
            .await
            .unwrap();
        assert_eq!(hits.results, vec!["alpha".to_string()]);
    }

    #[tokio::test]
    async fn test_paginated_match_sorted() {
        let provider = sample_provider().await;
        let matchers = vec![FieldMatch::any_of("type", vec!["questionPage".to_string()])];
        let hits = provider
            .paginated_match(
                "v1",
                "content",
                &matchers,
                Some(("title".to_string(), SortOrder::Asc)),
                0,
                10,
            )
            .await
            .unwrap();
        assert_eq!(hits.results, vec!["beta".to_string(), "alpha".to_string()]);
    }

    #[tokio::test]
    async fn test_randomised_match_is_reproducible_with_seed() {
        let provider = sample_provider().await;
        let first = provider
            .randomised_paginated_match("v1", "content", &[], 0, 10, Some(17))
            .await
            .unwrap();
        let second = provider
            .randomised_paginated_match("v1", "content", &[], 0, 10, Some(17))
            .await
            .unwrap();
        assert_eq!(first.results, second.results);
        assert_eq!(first.total_results, 3);
    }

    #[tokio::test]
    async fn test_bulk_index_rejects_malformed_document() {
        let provider = MemorySearchProvider::new();
        let result = provider
            .bulk_index(
                "v1",
                "content",
                vec![("bad".to_string(), "{not json".to_string())],
            )
            .await;
        assert!(matches!(result, Err(SearchError::InvalidDocument(_))));
    }
}
