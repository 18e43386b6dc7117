//! Error types for query lexing and parsing.
//!
//! Lexing and parsing both stop at the first problem. Every error carries the byte position
//! of the offending input so callers can point at it.

use thiserror::Error;

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Grammar violation found by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({})", location(.token, .position))]
pub struct SyntaxError {
    /// Error message.
    pub message: String,
    /// Lexeme of the offending token, or `None` at end of input.
    pub token: Option<String>,
    /// Byte position of the offending token.
    pub position: usize,
}

impl SyntaxError {
    /// Creates a new syntax error.
    pub fn new(message: impl Into<String>, token: Option<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            token,
            position,
        }
    }
}

/// Describes where a syntax error occurred.
fn location(token: &Option<String>, position: &usize) -> String {
    match token {
        Some(lexeme) => format!("found '{lexeme}' at byte {position}"),
        None => format!("at end of query, byte {position}"),
    }
}

/// Any failure produced by [`parse`](crate::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Tokenization failed.
    #[error("query syntax error: {0}")]
    Lex(#[from] LexError),
    /// The token stream does not follow the grammar.
    #[error("query syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl QueryError {
    /// Returns the error message without position context.
    pub fn message(&self) -> &str {
        match self {
            Self::Lex(err) => &err.message,
            Self::Syntax(err) => &err.message,
        }
    }

    /// Returns the byte position the error points at.
    pub fn position(&self) -> usize {
        match self {
            Self::Lex(err) => err.position,
            Self::Syntax(err) => err.position,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        let message = self.message();
        if message.contains("unclosed quote") {
            Some("Add a closing quote to complete the value")
        } else if message.contains("')'") {
            Some("Add a closing parenthesis ) to match the opening one")
        } else if message.contains("unknown operator") {
            Some("Valid operators are: eq, ne, lt, gt, lte, gte, like, in, out, and, or, sort, limit")
        } else if message.contains("array") {
            Some("in and out take a field and an array, e.g. in(field,[a,b])")
        } else {
            None
        }
    }

    /// Formats the error together with the query and a caret under the offending position.
    pub fn render(&self, query: &str) -> String {
        let column = query
            .char_indices()
            .take_while(|(idx, _)| *idx < self.position())
            .count();
        let mut result = format!("query syntax error: {}\n", self.message());
        result.push_str(&format!("  {query}\n"));
        result.push_str(&format!("  {}^", " ".repeat(column)));
        if let Some(hint) = self.suggestion() {
            result.push_str(&format!("\nhint: {hint}"));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = QueryError::from(LexError::new("unexpected character '='", 3));
        assert_eq!(
            err.to_string(),
            "query syntax error: unexpected character '=' at byte 3"
        );
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn syntax_error_display_with_token() {
        let err = SyntaxError::new("unknown operator 'foo'", Some("foo".into()), 0);
        assert_eq!(
            err.to_string(),
            "unknown operator 'foo' (found 'foo' at byte 0)"
        );
    }

    #[test]
    fn syntax_error_display_at_end() {
        let err = SyntaxError::new("expected ')' to close 'eq'", None, 7);
        assert!(err.to_string().contains("at end of query"));
    }

    #[test]
    fn render_points_at_position() {
        let err = QueryError::from(SyntaxError::new("expected ')' to close 'eq'", None, 7));
        let rendered = err.render("eq(id,x");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "  eq(id,x");
        assert_eq!(lines[2], format!("  {}^", " ".repeat(7)));
        assert!(rendered.contains("hint: Add a closing parenthesis"));
    }

    #[test]
    fn render_counts_characters_not_bytes() {
        let err = QueryError::from(LexError::new("unexpected character '='", 8));
        let rendered = err.render("eq(näme=1)");
        assert_eq!(rendered.lines().nth(2), Some(format!("  {}^", " ".repeat(7)).as_str()));
    }

    #[test]
    fn unknown_operator_suggestion() {
        let err = QueryError::from(SyntaxError::new(
            "unknown operator 'foo'",
            Some("foo".into()),
            0,
        ));
        assert!(err.suggestion().unwrap().contains("Valid operators"));
    }

    #[test]
    fn no_suggestion_for_other_errors() {
        let err = QueryError::from(SyntaxError::new("integer out of range", None, 0));
        assert!(err.suggestion().is_none());
    }
}
