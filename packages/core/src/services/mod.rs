//! Content Services
//!
//! This module contains the core content pipeline:
//!
//! - `ContentParser` - Discriminator-driven parsing of raw content files
//! - `augmenter` - Source-file stamping, id namespacing, media path rewriting
//! - `validation` - Structural and referential integrity checks
//! - `vocabulary` - Tag and unit vocabulary registration
//! - `SearchSynchronizer` - Best-effort mirroring into the search provider
//! - `ContentCache` - The versioned cache orchestrating all of the above
//!
//! Services coordinate between the object store and the search provider,
//! implementing the build pipeline and the version-scoped read operations.

pub mod augmenter;
pub mod content_cache;
pub mod error;
pub mod parser;
pub mod search_sync;
pub mod validation;
pub mod vocabulary;

pub use content_cache::{CacheConfig, ContentCache};
pub use error::ContentCacheError;
pub use parser::{ContentParser, ParseError, VariantKind, VariantRegistry};
pub use search_sync::{SearchSynchronizer, CONTENT_DOC_TYPE};
