//! Object Store Error Types
//!
//! Covers the failure modes of the commit-addressed object store collaborator.
//! Version-resolution misses are not errors (`resolve` returns `None`); these
//! variants are for genuinely broken calls.

use thiserror::Error;

/// Object store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// A commit id that should exist could not be read
    #[error("Commit not found in object store: {commit}")]
    CommitNotFound { commit: String },

    /// Underlying storage I/O failed
    #[error("Object store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure
    #[error("Object store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a commit-not-found error
    pub fn commit_not_found(commit: impl Into<String>) -> Self {
        Self::CommitNotFound {
            commit: commit.into(),
        }
    }

    /// Create a backend error with context
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
