//! Data Models
//!
//! This module contains the core data structures used throughout Corpus:
//!
//! - `ContentNode` - universal node model for all content types, with typed
//!   variants selected by the `type` discriminator
//! - `ContentProblem` - non-fatal defect records accumulated per version
//! - `ResultsWrapper` and friends - shapes shared with the search provider

mod content;
mod problem;
mod results;

pub use content::{Choice, ContentNode, ContentVariant, QuestionFields, ID_SEPARATOR};
pub use problem::ContentProblem;
pub use results::{BooleanOperator, FieldMatch, ResultsWrapper, SortOrder};
