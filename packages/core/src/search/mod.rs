//! Search Layer
//!
//! The full-text/term search backend is an external collaborator; this
//! module defines its seam and an in-memory implementation:
//!
//! - [`SearchProvider`] - async trait the cache synchronizes with and
//!   delegates matching queries to
//! - [`MemorySearchProvider`] - in-process implementation with the same
//!   matching semantics (terms, prefixes, fuzzy, boolean matchers, seeded
//!   random ordering)
//! - [`SearchError`] - failure modes of the seam

mod memory;
mod provider;

pub use memory::MemorySearchProvider;
pub use provider::{SearchError, SearchProvider};
