//! In-Memory Object Store
//!
//! A fully in-memory [`ObjectStore`] built from commit fixtures. Each commit
//! carries an id, a timestamp and a path -> bytes tree. Files are stored in a
//! `BTreeMap`, so `tree_walk` enumeration order is deterministic (sorted by
//! path) - build results for a fixed fixture are reproducible.
//!
//! The store counts `tree_walk` calls, which lets tests verify that a version
//! build runs at most once under concurrent first access.

use crate::store::{ObjectStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct Commit {
    id: String,
    timestamp: DateTime<Utc>,
    files: BTreeMap<String, Vec<u8>>,
}

/// In-memory, commit-addressed object store.
///
/// Built with the fluent fixture API:
///
/// ```rust
/// use corpus_core::store::MemoryObjectStore;
/// use chrono::Utc;
///
/// let store = MemoryObjectStore::new()
///     .with_commit("c1", Utc::now(), vec![("pages/a.json", br#"{"type":"content"}"#.to_vec())])
///     .with_ref("latest", "c1");
/// ```
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    commits: Vec<Commit>,
    refs: HashMap<String, String>,
    tree_walk_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit snapshot. Later commits are considered newer regardless
    /// of timestamp ordering, matching how a linear history is appended.
    pub fn with_commit(
        mut self,
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        files: Vec<(impl Into<String>, Vec<u8>)>,
    ) -> Self {
        self.commits.push(Commit {
            id: id.into(),
            timestamp,
            files: files
                .into_iter()
                .map(|(path, bytes)| (path.into(), bytes))
                .collect(),
        });
        self
    }

    /// Add a symbolic reference (e.g. a branch name) pointing at a commit.
    pub fn with_ref(mut self, name: impl Into<String>, commit: impl Into<String>) -> Self {
        self.refs.insert(name.into(), commit.into());
        self
    }

    /// Number of `tree_walk` calls served so far. Test instrumentation for
    /// the at-most-once build guarantee.
    pub fn tree_walk_count(&self) -> usize {
        self.tree_walk_calls.load(Ordering::SeqCst)
    }

    fn find(&self, commit: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.id == commit)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn resolve(&self, reference: &str) -> Result<Option<String>, StoreError> {
        if let Some(commit) = self.refs.get(reference) {
            return Ok(Some(commit.clone()));
        }
        Ok(self.find(reference).map(|c| c.id.clone()))
    }

    async fn tree_walk(
        &self,
        commit: &str,
        suffix: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        self.tree_walk_calls.fetch_add(1, Ordering::SeqCst);
        let commit = self
            .find(commit)
            .ok_or_else(|| StoreError::commit_not_found(commit))?;

        Ok(commit
            .files
            .iter()
            .filter(|(path, _)| path.ends_with(suffix))
            .map(|(path, bytes)| (path.clone(), bytes.clone()))
            .collect())
    }

    async fn verify_object_exists(&self, commit: &str, path: &str) -> Result<bool, StoreError> {
        let commit = self
            .find(commit)
            .ok_or_else(|| StoreError::commit_not_found(commit))?;
        Ok(commit.files.contains_key(path))
    }

    async fn list_commits(&self) -> Result<Vec<String>, StoreError> {
        // Newest first, like walking a linear history from its tip.
        Ok(self.commits.iter().rev().map(|c| c.id.clone()).collect())
    }

    async fn commit_timestamp(&self, commit: &str) -> Result<i64, StoreError> {
        let commit = self
            .find(commit)
            .ok_or_else(|| StoreError::commit_not_found(commit))?;
        Ok(commit.timestamp.timestamp())
    }

    async fn pull_latest(&self) -> Result<String, StoreError> {
        self.commits
            .last()
            .map(|c| c.id.clone())
            .ok_or_else(|| StoreError::backend("store has no commits"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_store() -> MemoryObjectStore {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        MemoryObjectStore::new()
            .with_commit(
                "c1",
                t1,
                vec![
                    ("pages/a.json", b"{}".to_vec()),
                    ("figures/d.png", b"png".to_vec()),
                ],
            )
            .with_commit("c2", t2, vec![("pages/b.json", b"{}".to_vec())])
            .with_ref("main", "c2")
    }

    #[tokio::test]
    async fn test_resolve_ref_and_commit_id() {
        let store = sample_store();
        assert_eq!(store.resolve("main").await.unwrap().as_deref(), Some("c2"));
        assert_eq!(store.resolve("c1").await.unwrap().as_deref(), Some("c1"));
        assert_eq!(store.resolve("unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tree_walk_filters_by_suffix_and_counts() {
        let store = sample_store();
        let files = store.tree_walk("c1", ".json").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "pages/a.json");
        assert_eq!(store.tree_walk_count(), 1);
    }

    #[tokio::test]
    async fn test_verify_object_exists() {
        let store = sample_store();
        assert!(store.verify_object_exists("c1", "figures/d.png").await.unwrap());
        assert!(!store.verify_object_exists("c1", "figures/missing.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_commits_newest_first_and_pull_latest() {
        let store = sample_store();
        assert_eq!(store.list_commits().await.unwrap(), vec!["c2", "c1"]);
        assert_eq!(store.pull_latest().await.unwrap(), "c2");
    }

    #[tokio::test]
    async fn test_commit_timestamps_are_ordered() {
        let store = sample_store();
        let t1 = store.commit_timestamp("c1").await.unwrap();
        let t2 = store.commit_timestamp("c2").await.unwrap();
        assert!(t2 > t1);
    }
}
