//! Versioned Content Cache
//!
//! Lazily materializes immutable per-version content maps from the object
//! store, validates them without failing the build, maintains the tag and
//! unit vocabularies, and keeps the search provider's index for each version
//! in step. Any operation taking a version transparently triggers a build
//! for versions not yet cached.
//!
//! Builds are serialized behind a single async mutex with a re-check after
//! acquisition, so concurrent readers of an uncached version trigger exactly
//! one walk of the store.

use crate::models::{
    ContentNode, ContentProblem, FieldMatch, ResultsWrapper, SortOrder,
};
use crate::search::SearchProvider;
use crate::services::augmenter::{augment, flatten};
use crate::services::error::ContentCacheError;
use crate::services::parser::{ContentParser, VariantRegistry};
use crate::services::search_sync::{SearchSynchronizer, CONTENT_DOC_TYPE};
use crate::services::validation::{check_referential_integrity, StructuralValidator};
use crate::services::vocabulary::{register_tags, register_units};
use crate::store::ObjectStore;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Fields consulted by free-text search, in priority order.
const FUZZY_SEARCH_FIELDS: &[&str] = &["id", "title", "tags", "value"];

/// Cache behavior switches.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether content trees marked unpublished are cached at all.
    pub include_unpublished: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            include_unpublished: true,
        }
    }
}

type ContentMap = Arc<HashMap<String, ContentNode>>;

/// Versioned content cache over an object store and a search provider.
pub struct ContentCache {
    store: Arc<dyn ObjectStore>,
    search: Arc<dyn SearchProvider>,
    synchronizer: SearchSynchronizer,
    parser: ContentParser,
    config: CacheConfig,
    content: RwLock<HashMap<String, ContentMap>>,
    problems: Arc<RwLock<HashMap<String, Vec<ContentProblem>>>>,
    tags: RwLock<HashMap<String, BTreeSet<String>>>,
    units: RwLock<HashMap<String, HashMap<String, String>>>,
    build_lock: Mutex<()>,
}

impl ContentCache {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        search: Arc<dyn SearchProvider>,
        registry: VariantRegistry,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            synchronizer: SearchSynchronizer::new(Arc::clone(&search)),
            search,
            parser: ContentParser::new(registry),
            config,
            content: RwLock::new(HashMap::new()),
            problems: Arc::new(RwLock::new(HashMap::new())),
            tags: RwLock::new(HashMap::new()),
            units: RwLock::new(HashMap::new()),
            build_lock: Mutex::new(()),
        }
    }

    /// Make sure `version` is cached and indexed, building whatever is
    /// missing. Returns whether both the content map and the search index
    /// exist afterwards. An unresolvable version caches nothing and returns
    /// `false`.
    pub async fn ensure_cache(&self, version: &str) -> Result<bool, ContentCacheError> {
        if version.is_empty() {
            return Ok(false);
        }

        if !self.content.read().await.contains_key(version) {
            let Some(commit) = self.store.resolve(version).await? else {
                warn!(version, "unable to resolve version reference; nothing cached");
                return Ok(false);
            };
            let _guard = self.build_lock.lock().await;
            // another caller may have built it while we waited
            if !self.content.read().await.contains_key(version) {
                info!(version, %commit, "building content cache");
                self.build_version(version, &commit).await?;
            }
        }

        if !self.search.has_index(version).await {
            let _guard = self.build_lock.lock().await;
            if !self.search.has_index(version).await {
                let snapshot = self.content.read().await.get(version).cloned();
                if let Some(snapshot) = snapshot {
                    self.synchronizer.ensure_indexed(version, &snapshot).await;
                }
            }
        }

        Ok(self.content.read().await.contains_key(version)
            && self.search.has_index(version).await)
    }

    /// Walk the commit's `.json` files, parse, augment, dedupe, validate and
    /// publish the version's maps. Referential integrity runs afterwards on
    /// a background task against the published immutable snapshot.
    async fn build_version(&self, version: &str, commit: &str) -> Result<(), ContentCacheError> {
        let files = self.store.tree_walk(commit, ".json").await?;

        let mut content: HashMap<String, ContentNode> = HashMap::new();
        let mut problems: Vec<ContentProblem> = Vec::new();
        let mut tags: BTreeSet<String> = BTreeSet::new();
        let mut units: HashMap<String, String> = HashMap::new();
        let validator = StructuralValidator::new(self.store.as_ref(), commit);

        for (path, bytes) in &files {
            let mut root = match self.parser.parse(bytes) {
                Ok(root) => root,
                Err(e) => {
                    warn!(%path, error = %e, "content file failed to parse");
                    problems.push(ContentProblem::new(
                        &ContentNode::placeholder(path),
                        format!("Unable to parse {path}: {e}"),
                    ));
                    continue;
                }
            };

            if !self.config.include_unpublished && !root.published {
                debug!(%path, "skipping unpublished content");
                continue;
            }

            augment(&mut root, path, None);

            for node in flatten(&root) {
                match &node.id {
                    Some(id) => {
                        if let Some(existing) = content.get(id) {
                            if existing == node {
                                debug!(%id, "identical content reused across files");
                            } else {
                                warn!(%id, %path, "duplicate id with differing content");
                                problems.push(ContentProblem::new(
                                    node,
                                    format!(
                                        "Duplicate id '{id}' in {path}; already defined by {}, which is kept",
                                        existing
                                            .canonical_source_file
                                            .as_deref()
                                            .unwrap_or("unknown")
                                    ),
                                ));
                            }
                        } else {
                            register_tags(&node.tags, &mut tags);
                            register_units(node, &mut units);
                            validator.validate(node, &mut problems).await;
                            content.insert(id.clone(), node.clone());
                        }
                    }
                    // id-less nodes are validated but never indexed
                    None => validator.validate(node, &mut problems).await,
                }
            }
        }

        info!(
            version,
            nodes = content.len(),
            problems = problems.len(),
            "content cache build complete"
        );

        let snapshot: ContentMap = Arc::new(content);
        self.content
            .write()
            .await
            .insert(version.to_string(), Arc::clone(&snapshot));
        self.problems
            .write()
            .await
            .insert(version.to_string(), problems);
        self.tags.write().await.insert(version.to_string(), tags);
        self.units.write().await.insert(version.to_string(), units);

        let problems_map = Arc::clone(&self.problems);
        let background_snapshot = Arc::clone(&snapshot);
        let background_version = version.to_string();
        tokio::spawn(async move {
            let found = check_referential_integrity(&background_snapshot);
            if !found.is_empty() {
                problems_map
                    .write()
                    .await
                    .entry(background_version)
                    .or_default()
                    .extend(found);
            }
        });

        self.synchronizer.ensure_indexed(version, &snapshot).await;
        Ok(())
    }

    /// Look a node up by its fully namespaced id. Reads only need the
    /// content map, even if search indexing failed.
    pub async fn get_by_id(
        &self,
        version: &str,
        id: &str,
    ) -> Result<Option<ContentNode>, ContentCacheError> {
        if id.is_empty() {
            return Ok(None);
        }
        self.ensure_cache(version).await?;

        let content = self.content.read().await;
        let Some(map) = content.get(version) else {
            return Ok(None);
        };
        let node = map.get(id).cloned();
        if node.is_none() {
            debug!(version, id, "content id not found in cache");
        }
        Ok(node)
    }

    /// All nodes whose id starts with `prefix`, e.g. every part of a page.
    pub async fn get_by_id_prefix(
        &self,
        version: &str,
        prefix: &str,
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<ContentNode>, ContentCacheError> {
        if !self.version_readable(version).await? {
            return Ok(ResultsWrapper::empty());
        }
        let hits = self
            .search
            .prefix_search(version, CONTENT_DOC_TYPE, "id", prefix, start_index, limit)
            .await?;
        Ok(self.hydrate(version, hits).await)
    }

    /// Structured field match, sorted by title.
    pub async fn find_by_field_names(
        &self,
        version: &str,
        fields_to_match: &[FieldMatch],
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<ContentNode>, ContentCacheError> {
        if !self.version_readable(version).await? {
            return Ok(ResultsWrapper::empty());
        }
        let hits = self
            .search
            .paginated_match(
                version,
                CONTENT_DOC_TYPE,
                fields_to_match,
                Some(("title".to_string(), SortOrder::Asc)),
                start_index,
                limit,
            )
            .await?;
        Ok(self.hydrate(version, hits).await)
    }

    /// Structured field match in shuffled order. A fixed `seed` gives a
    /// reproducible shuffle.
    pub async fn find_by_field_names_random_order(
        &self,
        version: &str,
        fields_to_match: &[FieldMatch],
        start_index: usize,
        limit: usize,
        seed: Option<u64>,
    ) -> Result<ResultsWrapper<ContentNode>, ContentCacheError> {
        if !self.version_readable(version).await? {
            return Ok(ResultsWrapper::empty());
        }
        let hits = self
            .search
            .randomised_paginated_match(
                version,
                CONTENT_DOC_TYPE,
                fields_to_match,
                start_index,
                limit,
                seed,
            )
            .await?;
        Ok(self.hydrate(version, hits).await)
    }

    /// Free-text search over id, title, tags and value.
    pub async fn search_for_content(
        &self,
        version: &str,
        search_string: &str,
        fields_that_must_match: &[FieldMatch],
        start_index: usize,
        limit: usize,
    ) -> Result<ResultsWrapper<ContentNode>, ContentCacheError> {
        if !self.version_readable(version).await? {
            return Ok(ResultsWrapper::empty());
        }
        let fields: Vec<String> = FUZZY_SEARCH_FIELDS
            .iter()
            .map(|f| f.to_string())
            .collect();
        let hits = self
            .search
            .fuzzy_search(
                version,
                CONTENT_DOC_TYPE,
                search_string,
                fields_that_must_match,
                &fields,
                start_index,
                limit,
            )
            .await?;
        Ok(self.hydrate(version, hits).await)
    }

    /// All content carrying any of the given tags.
    pub async fn get_content_by_tags(
        &self,
        version: &str,
        tags: &[String],
    ) -> Result<ResultsWrapper<ContentNode>, ContentCacheError> {
        if !self.version_readable(version).await? {
            return Ok(ResultsWrapper::empty());
        }
        let hits = self
            .search
            .term_search(version, CONTENT_DOC_TYPE, tags, "tags", 0, usize::MAX)
            .await?;
        Ok(self.hydrate(version, hits).await)
    }

    /// The version's tag vocabulary. A pure read: empty for versions not
    /// currently built.
    pub async fn get_tags_list(&self, version: &str) -> BTreeSet<String> {
        self.tags
            .read()
            .await
            .get(version)
            .cloned()
            .unwrap_or_default()
    }

    /// The version's unit vocabulary, normalized form to preferred raw
    /// form. A pure read like [`ContentCache::get_tags_list`].
    pub async fn get_all_units(&self, version: &str) -> HashMap<String, String> {
        self.units
            .read()
            .await
            .get(version)
            .cloned()
            .unwrap_or_default()
    }

    /// Every problem recorded while building `version`. Empty until the
    /// version is built, and empty again right after eviction.
    pub async fn get_problem_map(&self, version: &str) -> Vec<ContentProblem> {
        self.problems
            .read()
            .await
            .get(version)
            .cloned()
            .unwrap_or_default()
    }

    /// Versions with a content map currently held in memory.
    pub async fn cached_versions(&self) -> Vec<String> {
        self.content.read().await.keys().cloned().collect()
    }

    /// Evict one version's maps, vocabularies, problems and search index.
    pub async fn clear_cache_version(&self, version: &str) {
        let _guard = self.build_lock.lock().await;
        info!(version, "evicting cached version");
        self.content.write().await.remove(version);
        self.problems.write().await.remove(version);
        self.tags.write().await.remove(version);
        self.units.write().await.remove(version);
        self.search.expunge_index(version).await;
    }

    /// Evict everything, search indices included.
    pub async fn clear_cache(&self) {
        let _guard = self.build_lock.lock().await;
        info!("evicting all cached versions");
        self.content.write().await.clear();
        self.problems.write().await.clear();
        self.tags.write().await.clear();
        self.units.write().await.clear();
        self.search.expunge_all().await;
    }

    /// Every version known to the object store, newest first.
    pub async fn list_available_versions(&self) -> Result<Vec<String>, ContentCacheError> {
        Ok(self.store.list_commits().await?)
    }

    /// Fetch the newest upstream version identifier.
    pub async fn get_latest_version_id(&self) -> Result<String, ContentCacheError> {
        Ok(self.store.pull_latest().await?)
    }

    /// Whether `version` resolves to a commit the store knows about.
    pub async fn is_valid_version(&self, version: &str) -> bool {
        if version.is_empty() {
            return false;
        }
        matches!(self.store.resolve(version).await, Ok(Some(_)))
    }

    /// Compare two versions by commit timestamp. Positive means `left` is
    /// newer than `right`.
    pub async fn compare_to(&self, left: &str, right: &str) -> Result<i64, ContentCacheError> {
        if left.trim().is_empty() || right.trim().is_empty() {
            return Err(ContentCacheError::BlankVersion);
        }
        let left_time = self.commit_time(left).await?;
        let right_time = self.commit_time(right).await?;
        Ok(left_time - right_time)
    }

    async fn commit_time(&self, version: &str) -> Result<i64, ContentCacheError> {
        let commit = self
            .store
            .resolve(version)
            .await?
            .ok_or_else(|| crate::store::StoreError::commit_not_found(version))?;
        Ok(self.store.commit_timestamp(&commit).await?)
    }

    /// Search-backed reads need the content map present; indexing failures
    /// surface as empty results rather than errors.
    async fn version_readable(&self, version: &str) -> Result<bool, ContentCacheError> {
        self.ensure_cache(version).await?;
        Ok(self.content.read().await.contains_key(version))
    }

    /// Turn matched ids back into owned nodes from the version's map.
    async fn hydrate(
        &self,
        version: &str,
        hits: ResultsWrapper<String>,
    ) -> ResultsWrapper<ContentNode> {
        let content = self.content.read().await;
        let Some(map) = content.get(version) else {
            return ResultsWrapper::empty();
        };
        let mut results = Vec::with_capacity(hits.results.len());
        for id in &hits.results {
            match map.get(id) {
                Some(node) => results.push(node.clone()),
                None => warn!(version, %id, "search returned an id missing from the cache"),
            }
        }
        ResultsWrapper::new(results, hits.total_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_to_including_unpublished() {
        assert!(CacheConfig::default().include_unpublished);
    }
}
