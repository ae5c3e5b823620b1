//! Search Index Synchronization
//!
//! Mirrors a built version's content map into the search provider. Indexing
//! is best effort: a failure is logged and the version stays readable by id,
//! with the index retried on the next cache access.

use crate::models::ContentNode;
use crate::search::SearchProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Document type under which content nodes are indexed.
pub const CONTENT_DOC_TYPE: &str = "content";

/// Pushes content maps into the search provider, once per version.
pub struct SearchSynchronizer {
    search: Arc<dyn SearchProvider>,
}

impl SearchSynchronizer {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self { search }
    }

    /// Index a version's content map unless the provider already has it.
    ///
    /// Returns whether the index exists once this call completes. Nodes that
    /// fail to serialize are skipped individually; a bulk indexing failure
    /// is swallowed after logging.
    pub async fn ensure_indexed(
        &self,
        version: &str,
        content: &HashMap<String, ContentNode>,
    ) -> bool {
        if self.search.has_index(version).await {
            debug!(version, "search index already present");
            return true;
        }

        info!(version, documents = content.len(), "building search index");
        let mut documents = Vec::with_capacity(content.len());
        for (id, node) in content {
            match serde_json::to_string(node) {
                Ok(source) => documents.push((id.clone(), source)),
                Err(e) => error!(%id, error = %e, "skipping unserializable content node"),
            }
        }

        match self
            .search
            .bulk_index(version, CONTENT_DOC_TYPE, documents)
            .await
        {
            Ok(()) => {
                info!(version, "search index built");
                true
            }
            Err(e) => {
                error!(version, error = %e, "search indexing failed; version remains readable by id");
                false
            }
        }
    }
}
