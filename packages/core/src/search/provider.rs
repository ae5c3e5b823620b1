//! SearchProvider Trait - Full-Text Search Abstraction
//!
//! This trait is the seam to the external term/full-text search backend. The
//! cache pushes a version's serialized content to the provider once per
//! version (idempotently) and delegates all matching queries to it; matched
//! ids are hydrated back into content form from the version's content map.
//!
//! Provider failures during synchronization are deliberately non-fatal: a
//! version stays queryable via direct id lookup even when its index lags.

use crate::models::{FieldMatch, ResultsWrapper, SortOrder};
use async_trait::async_trait;
use thiserror::Error;

/// Search backend operation errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// The backend rejected or failed an indexing call
    #[error("Search indexing failed for version {version}: {message}")]
    IndexingFailed { version: String, message: String },

    /// A query could not be executed
    #[error("Search query failed: {0}")]
    QueryFailed(String),

    /// A document could not be parsed by the backend
    #[error("Search document rejected: {0}")]
    InvalidDocument(String),
}

impl SearchError {
    /// Create an indexing-failed error
    pub fn indexing_failed(version: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IndexingFailed {
            version: version.into(),
            message: message.into(),
        }
    }

    /// Create a query-failed error
    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }
}

/// Abstraction over the full-text search collaborator.
///
/// Queries return matched document ids plus the total match count; the
/// caller hydrates ids against its own content map. All methods take the
/// version (index key) and a document type, mirroring how one backend index
/// holds several document classes.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Whether an index already exists for `version`.
    async fn has_index(&self, version: &str) -> bool;

    /// Submit a version's documents as one bulk indexing call.
    ///
    /// `docs` carries `(id, serialized_doc)` pairs in canonical JSON form.
    async fn bulk_index(
        &self,
        version: &str,
        doc_type: &str,
        docs: Vec<(String, String)>,
    ) -> Result<(), SearchError>;

    /// Drop the index for one version.
    async fn expunge_index(&self, version: &str);

    /// Drop every index.
    async fn expunge_all(&self);

    /// Exact-term search: documents where `field` matches any of `terms`.
    async fn term_search(
        &self,
        version: &str,
        doc_type: &str,
        terms: &[String],
        field: &str,
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError>;

    /// Fuzzy free-text search over `fields`, constrained by `must_match`.
    async fn fuzzy_search(
        &self,
        version: &str,
        doc_type: &str,
        query: &str,
        must_match: &[FieldMatch],
        fields: &[String],
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError>;

    /// Documents whose `field` value starts with `prefix`.
    async fn prefix_search(
        &self,
        version: &str,
        doc_type: &str,
        field: &str,
        prefix: &str,
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError>;

    /// Structured boolean match with optional sort, paginated.
    async fn paginated_match(
        &self,
        version: &str,
        doc_type: &str,
        matchers: &[FieldMatch],
        sort: Option<(String, SortOrder)>,
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<String>, SearchError>;

    /// Structured boolean match in random order.
    ///
    /// Passing the same `seed` yields the same ordering, for reproducible
    /// result pages.
    async fn randomised_paginated_match(
        &self,
        version: &str,
        doc_type: &str,
        matchers: &[FieldMatch],
        start_index: usize,
        limit: usize,
        seed: Option<u64>,
    ) -> Result<ResultsWrapper<String>, SearchError>;
}
