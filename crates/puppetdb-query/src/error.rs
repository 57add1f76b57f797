//! Error types for building, parsing and serializing PuppetDB queries.

use thiserror::Error;

use crate::ast::Category;

/// Errors that can occur while building or compiling a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Fact and resource conditions were mixed in one query.
    #[error("mixed {current} and {requested} queries are not supported")]
    CategoryConflict {
        /// Category already active on the query.
        current: Category,
        /// Category the caller tried to switch to.
        requested: Category,
    },

    /// Category value outside of the known families.
    #[error("invalid category value '{0}'")]
    InvalidCategoryValue(String),

    /// Malformed resource key.
    #[error("invalid resource key '{key}': {reason}")]
    InvalidKey {
        /// The key as given by the caller.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Unknown comparison operator.
    #[error("invalid comparison operator '{0}'")]
    InvalidOperator(String),

    /// Structurally invalid query (boolean conflicts, unbalanced groups).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Syntax error in a textual query.
    #[error("parse error at position {position}: {message}")]
    ParseError {
        /// Position in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// Empty textual query.
    #[error("empty query expression")]
    EmptyExpression,
}

/// Result type for query operations.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_category_conflict() {
        let err = QueryError::CategoryConflict {
            current: Category::Fact,
            requested: Category::Resource,
        };
        assert_eq!(err.to_string(), "mixed F and R queries are not supported");
    }

    #[test]
    fn test_error_display_invalid_key() {
        let err = QueryError::InvalidKey {
            key: "File@path%mode".to_string(),
            reason: "resource key cannot contain both a field and a parameter selector"
                .to_string(),
        };
        assert!(err.to_string().starts_with("invalid resource key 'File@path%mode'"));
    }

    #[test]
    fn test_error_display_parse_error() {
        let err = QueryError::ParseError {
            position: 4,
            message: "unexpected input".to_string(),
        };
        assert_eq!(err.to_string(), "parse error at position 4: unexpected input");
    }
}
