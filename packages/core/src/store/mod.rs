//! Object Store Layer
//!
//! The content cache reads from an immutable, commit-addressed object store
//! (a version-control history). This module defines that seam:
//!
//! - [`ObjectStore`] - async trait consumed by the cache
//! - [`MemoryObjectStore`] - in-memory implementation built from commit
//!   fixtures, with deterministic enumeration order
//! - [`StoreError`] - failure modes of the seam
//!
//! The store is read-only to the engine; nothing here mutates history.

mod error;
mod memory;
mod object_store;

pub use error::StoreError;
pub use memory::MemoryObjectStore;
pub use object_store::ObjectStore;
