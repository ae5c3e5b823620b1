//! ObjectStore Trait - Commit-Addressed Store Abstraction
//!
//! This trait is the seam to the immutable, commit-addressed object store
//! (a version-control history) the content cache reads from. The store is
//! strictly read-only to the engine: content is ingested from snapshots,
//! never written back.
//!
//! All methods are async to support both in-process and network-backed
//! implementations. Implementations must be `Send + Sync` so they can be
//! shared across concurrent readers behind an `Arc`.

use crate::store::StoreError;
use async_trait::async_trait;

/// Abstraction over the version-control object store.
///
/// A `version` as seen by the content cache is an opaque reference string;
/// `resolve` turns it into a concrete commit id (or `None` when the
/// reference does not exist, which is a miss rather than an error).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Resolve a version reference to a concrete commit id.
    ///
    /// Returns `None` when the reference is unknown; the caller treats that
    /// as an unresolvable version and caches nothing.
    async fn resolve(&self, reference: &str) -> Result<Option<String>, StoreError>;

    /// Enumerate the files of a commit whose paths end with `suffix`,
    /// yielding `(path, bytes)` pairs in a stable order.
    async fn tree_walk(
        &self,
        commit: &str,
        suffix: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Whether `path` exists as an object within `commit`.
    async fn verify_object_exists(&self, commit: &str, path: &str) -> Result<bool, StoreError>;

    /// All known commit ids, newest first.
    async fn list_commits(&self) -> Result<Vec<String>, StoreError>;

    /// Epoch-seconds timestamp of a commit.
    async fn commit_timestamp(&self, commit: &str) -> Result<i64, StoreError>;

    /// Advance to the newest known snapshot and return its commit id.
    async fn pull_latest(&self) -> Result<String, StoreError>;
}
