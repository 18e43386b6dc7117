//! Error types for query translation.

use rql::QueryError;
use thiserror::Error;

/// Errors that can occur while translating a query for a backend.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The query text did not parse.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A translation target was constructed with an invalid identifying argument.
    #[error("{message}")]
    Semantic {
        /// What was wrong.
        message: String,
    },

    /// An operation appeared in a scope where the backend cannot express it, such as a sort
    /// modifier inside a boolean group of a hand-built tree.
    #[error("'{operation}' cannot appear inside a boolean group")]
    Misplaced {
        /// Name of the misplaced operation.
        operation: &'static str,
    },

    /// A `like` value produced a pattern the regex engine rejected.
    #[error("invalid like pattern '{pattern}': {source}")]
    Pattern {
        /// The generated pattern.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },
}

impl TranslateError {
    /// Creates a semantic error.
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_is_transparent() {
        let err: TranslateError = rql::parse("eq(a").unwrap_err().into();
        assert!(err.to_string().starts_with("query syntax error:"));
    }

    #[test]
    fn misplaced_display() {
        let err = TranslateError::Misplaced { operation: "sort" };
        assert_eq!(err.to_string(), "'sort' cannot appear inside a boolean group");
    }
}
