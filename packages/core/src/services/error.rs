//! Service Layer Error Types
//!
//! This module defines error types for cache-level operations, chaining the
//! store and search layers' failures with proper context.

use crate::search::SearchError;
use crate::store::StoreError;
use thiserror::Error;

/// Cache operation errors
///
/// Covers everything a caller of the content cache can fail on: the object
/// store, the search provider, and malformed arguments.
#[derive(Error, Debug)]
pub enum ContentCacheError {
    /// Object store operation failed
    #[error("Object store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Search provider operation failed
    #[error("Search operation failed: {0}")]
    Search(#[from] SearchError),

    /// A version argument was blank where one is required
    #[error("Version identifier must not be blank")]
    BlankVersion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_chains_source_message() {
        let error: ContentCacheError = StoreError::commit_not_found("abc123").into();
        let message = error.to_string();
        assert!(message.contains("Object store operation failed"));
        assert!(message.contains("abc123"));
    }
}
