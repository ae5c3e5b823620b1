//! Query Result and Search Criteria Types
//!
//! Shared shapes for everything that flows across the search-provider seam:
//! paginated result wrappers, boolean field matchers, and sort instructions.

use serde::{Deserialize, Serialize};

/// A page of results together with the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsWrapper<T> {
    pub results: Vec<T>,
    pub total_results: u64,
}

impl<T> ResultsWrapper<T> {
    pub fn new(results: Vec<T>, total_results: u64) -> Self {
        Self {
            results,
            total_results,
        }
    }

    /// An empty result set.
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total_results: 0,
        }
    }
}

impl<T> Default for ResultsWrapper<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Boolean combination rule for the values of one [`FieldMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOperator {
    /// The field must match every value
    And,
    /// The field must match at least one value
    Or,
}

/// One field-level match clause for structured queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch {
    /// Document field to match against (e.g. "tags", "type", "level")
    pub field: String,
    pub operator: BooleanOperator,
    pub values: Vec<String>,
}

impl FieldMatch {
    pub fn any_of(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            operator: BooleanOperator::Or,
            values,
        }
    }

    pub fn all_of(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            operator: BooleanOperator::And,
            values,
        }
    }
}

/// Sort direction for one result ordering instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_match_constructors() {
        let m = FieldMatch::any_of("tags", vec!["physics".to_string()]);
        assert_eq!(m.operator, BooleanOperator::Or);
        assert_eq!(m.field, "tags");

        let m = FieldMatch::all_of("tags", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(m.operator, BooleanOperator::And);
    }

    #[test]
    fn test_empty_results_wrapper() {
        let w: ResultsWrapper<String> = ResultsWrapper::empty();
        assert!(w.results.is_empty());
        assert_eq!(w.total_results, 0);
    }
}
