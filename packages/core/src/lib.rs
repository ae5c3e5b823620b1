//! Corpus Core Content Layer
//!
//! This crate provides the versioned content cache, validation pipeline and
//! search synchronization for the Corpus content platform.
//!
//! # Architecture
//!
//! - **Commit-addressed store**: content versions are immutable trees of
//!   JSON files resolved from an [`store::ObjectStore`]
//! - **Lazy per-version caches**: the first read of a version materializes
//!   its full typed content map, then every later read hits memory
//! - **Non-fatal validation**: structural and referential findings become a
//!   per-version problem report instead of failing the build
//! - **Best-effort search**: each built version is mirrored into a
//!   [`search::SearchProvider`]; indexing failures never block id reads
//!
//! # Modules
//!
//! - [`models`] - Data structures (ContentNode, ContentProblem, etc.)
//! - [`store`] - Object store abstraction and in-memory implementation
//! - [`search`] - Search provider abstraction and in-memory implementation
//! - [`services`] - The parse/augment/validate pipeline and the cache itself

pub mod models;
pub mod search;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use models::*;
pub use search::*;
pub use services::*;
pub use store::*;
