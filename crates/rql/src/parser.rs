//! Query parser.
//!
//! Parses a token stream into an [`Operation`] using recursive descent. Tokens are pulled from
//! the lexer one at a time, so parsing is a single left-to-right scan.
//!
//! # Grammar
//!
//! ```text
//! query      → ε | operation ("&" operation)*
//! operation  → KEYWORD "(" arglist ")"
//! arglist    → arg ("," arg)*
//! arg        → operation | scalar | array
//! array      → "[" (scalar ("," scalar)*)? "]"
//! scalar     → IDENTIFIER | STRING | INTEGER | FLOAT
//! ```
//!
//! # Operator shapes
//!
//! - `eq ne lt gt lte gte like`: `(field, scalar)`
//! - `in out`: `(field, array)`, array non-empty
//! - `and or`: one or more filter operations
//! - `sort`: one or more fields, `+field` ascending, `-field` descending, bare ascending
//! - `limit`: `(limit)` or `(limit, skip)`
//!
//! Boolean groups nest at most [`MAX_NESTING_DEPTH`] levels deep. Deeper input is a syntax
//! error rather than unbounded recursion.

use std::mem;

use crate::{
    ast::{
        ArrayKind, ArrayOperation, BooleanKind, BooleanOperation, LimitOperation, Operation,
        PropertyKind, PropertyOperation, SortDirection, SortField, SortOperation, Value,
    },
    error::{QueryError, SyntaxError},
    lexer::{Keyword, Lexer, Token, TokenKind},
};

/// Maximum number of nested `and`/`or` groups accepted in one query.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Builds a syntax error pointing at `token`.
fn error_at(message: impl Into<String>, token: &Token) -> QueryError {
    let lexeme = (!token.is_eof()).then(|| token.lexeme.clone());
    SyntaxError::new(message, lexeme, token.position).into()
}

/// Describes a token for error messages.
fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of query".to_string(),
        TokenKind::String => format!("\"{}\"", token.lexeme),
        _ => format!("'{}'", token.lexeme),
    }
}

/// Recursive descent parser for query strings.
struct Parser<'a> {
    /// Token source.
    lexer: Lexer<'a>,
    /// The current, not yet consumed token.
    current: Token,
    /// Number of boolean groups currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned on the first token.
    fn new(input: &'a str) -> Result<Self, QueryError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    /// Parses: query → ε | operation ("&" operation)*
    fn parse(mut self) -> Result<Operation, QueryError> {
        if self.current.is_eof() {
            return Ok(Operation::MatchAll);
        }

        let mut operations = Vec::new();
        let mut seen_sort = false;
        let mut seen_limit = false;

        loop {
            let start = self.current.clone();
            let op = self.parse_operation()?;

            let seen = match op {
                Operation::Sort(_) => Some(mem::replace(&mut seen_sort, true)),
                Operation::Limit(_) => Some(mem::replace(&mut seen_limit, true)),
                _ => None,
            };
            if seen == Some(true) {
                return Err(error_at(
                    format!("duplicate '{}' operation", start.lexeme.to_ascii_lowercase()),
                    &start,
                ));
            }
            operations.push(op);

            if self.current.kind != TokenKind::Ampersand {
                break;
            }
            self.advance()?;
        }

        if !self.current.is_eof() {
            return Err(error_at(
                format!("unexpected {} after query", describe(&self.current)),
                &self.current,
            ));
        }

        if operations.len() == 1 {
            Ok(operations.remove(0))
        } else {
            Ok(Operation::Query(operations))
        }
    }

    /// Parses: operation → KEYWORD "(" arglist ")"
    fn parse_operation(&mut self) -> Result<Operation, QueryError> {
        let token = self.advance()?;
        let keyword = match token.kind {
            TokenKind::Keyword(keyword) => keyword,
            TokenKind::Identifier if self.current.kind == TokenKind::LParen => {
                return Err(error_at(
                    format!("unknown operator '{}'", token.lexeme),
                    &token,
                ));
            }
            _ => {
                return Err(error_at(
                    format!("expected an operator, found {}", describe(&token)),
                    &token,
                ));
            }
        };

        self.expect(TokenKind::LParen, || format!("expected '(' after '{keyword}'"))?;

        let op = match keyword {
            Keyword::Eq => self.parse_property(PropertyKind::Eq)?,
            Keyword::Ne => self.parse_property(PropertyKind::Ne)?,
            Keyword::Lt => self.parse_property(PropertyKind::Lt)?,
            Keyword::Gt => self.parse_property(PropertyKind::Gt)?,
            Keyword::Lte => self.parse_property(PropertyKind::Lte)?,
            Keyword::Gte => self.parse_property(PropertyKind::Gte)?,
            Keyword::Like => self.parse_property(PropertyKind::Like)?,
            Keyword::In => self.parse_array(ArrayKind::In)?,
            Keyword::Out => self.parse_array(ArrayKind::Out)?,
            Keyword::And => self.parse_nested(BooleanKind::And, &token)?,
            Keyword::Or => self.parse_nested(BooleanKind::Or, &token)?,
            Keyword::Sort => self.parse_sort()?,
            Keyword::Limit => self.parse_limit()?,
        };

        self.expect(TokenKind::RParen, || format!("expected ')' to close '{keyword}'"))?;
        Ok(op)
    }

    /// Parses the arguments of a property operation: field "," scalar
    fn parse_property(&mut self, kind: PropertyKind) -> Result<Operation, QueryError> {
        let name = kind.as_str();
        let field = self.parse_field(name)?;
        self.expect(TokenKind::Comma, || {
            format!("'{name}' takes a field and a value")
        })?;
        let value = self.parse_scalar()?;
        self.reject_extra_argument(name, "exactly two arguments")?;

        Ok(Operation::Property(PropertyOperation { kind, field, value }))
    }

    /// Parses the arguments of an array operation: field "," array
    fn parse_array(&mut self, kind: ArrayKind) -> Result<Operation, QueryError> {
        let name = kind.as_str();
        let field = self.parse_field(name)?;
        self.expect(TokenKind::Comma, || {
            format!("'{name}' takes a field and an array")
        })?;
        self.expect(TokenKind::LBracket, || {
            format!("'{name}' expects an array of values")
        })?;

        let mut values = Vec::new();
        if self.current.kind == TokenKind::RBracket {
            return Err(error_at(
                format!("'{name}' requires at least one value in its array"),
                &self.current,
            ));
        }
        loop {
            values.push(self.parse_scalar()?);
            if self.current.kind != TokenKind::Comma {
                break;
            }
            self.advance()?;
        }

        self.expect(TokenKind::RBracket, || "expected ']' to close the array".to_string())?;
        self.reject_extra_argument(name, "exactly two arguments")?;

        Ok(Operation::Array(ArrayOperation {
            kind,
            field,
            values,
        }))
    }

    /// Parses a boolean group one level deeper, failing past the nesting limit.
    fn parse_nested(&mut self, kind: BooleanKind, token: &Token) -> Result<Operation, QueryError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(error_at(
                format!("groups nest deeper than {MAX_NESTING_DEPTH} levels"),
                token,
            ));
        }
        self.depth += 1;
        let op = self.parse_boolean(kind)?;
        self.depth -= 1;
        Ok(op)
    }

    /// Parses the arguments of a boolean operation: operation ("," operation)*
    fn parse_boolean(&mut self, kind: BooleanKind) -> Result<Operation, QueryError> {
        if self.current.kind == TokenKind::RParen {
            return Err(error_at(
                format!("'{}' requires at least one operation", kind.as_str()),
                &self.current,
            ));
        }

        let mut children = Vec::new();
        loop {
            let start = self.current.clone();
            let child = self.parse_operation()?;
            if child.is_modifier() {
                return Err(error_at(
                    format!(
                        "'{}' is only allowed at the top level of a query",
                        start.lexeme.to_ascii_lowercase()
                    ),
                    &start,
                ));
            }
            children.push(child);

            if self.current.kind != TokenKind::Comma {
                break;
            }
            self.advance()?;
        }

        Ok(Operation::Boolean(BooleanOperation { kind, children }))
    }

    /// Parses the arguments of a sort modifier: field ("," field)*
    fn parse_sort(&mut self) -> Result<Operation, QueryError> {
        if self.current.kind == TokenKind::RParen {
            return Err(error_at("'sort' requires at least one field", &self.current));
        }

        let mut fields = Vec::new();
        loop {
            let token = self.advance()?;
            match token.kind {
                TokenKind::Identifier
                | TokenKind::String
                | TokenKind::Keyword(_)
                | TokenKind::Integer
                | TokenKind::Float => {}
                _ => {
                    return Err(error_at(
                        format!("expected a sort field, found {}", describe(&token)),
                        &token,
                    ));
                }
            }

            let (direction, field) = match token.lexeme.strip_prefix('-') {
                Some(rest) => (SortDirection::Desc, rest),
                None => (
                    SortDirection::Asc,
                    token.lexeme.strip_prefix('+').unwrap_or(&token.lexeme),
                ),
            };
            if field.is_empty() {
                return Err(error_at("sort field name is empty", &token));
            }
            fields.push(SortField {
                field: field.to_string(),
                direction,
            });

            if self.current.kind != TokenKind::Comma {
                break;
            }
            self.advance()?;
        }

        Ok(Operation::Sort(SortOperation { fields }))
    }

    /// Parses the arguments of a pagination modifier: limit ("," skip)?
    fn parse_limit(&mut self) -> Result<Operation, QueryError> {
        let limit = self.parse_count("limit")?;
        let skip = if self.current.kind == TokenKind::Comma {
            self.advance()?;
            self.parse_count("skip")?
        } else {
            0
        };
        self.reject_extra_argument("limit", "at most two arguments")?;

        Ok(Operation::Limit(LimitOperation { limit, skip }))
    }

    /// Parses a non-negative integer argument.
    fn parse_count(&mut self, what: &str) -> Result<u64, QueryError> {
        let token = self.advance()?;
        if token.kind != TokenKind::Integer {
            return Err(error_at(
                format!("{what} must be a non-negative integer, found {}", describe(&token)),
                &token,
            ));
        }
        token.lexeme.parse::<u64>().map_err(|_| {
            error_at(
                format!("{what} must be a non-negative integer"),
                &token,
            )
        })
    }

    /// Parses a field name argument.
    fn parse_field(&mut self, operator: &str) -> Result<String, QueryError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Keyword(_) if self.current.kind == TokenKind::LParen => Err(error_at(
                format!("'{operator}' expects a field name, found an operation"),
                &token,
            )),
            TokenKind::Identifier | TokenKind::String | TokenKind::Keyword(_)
                if !token.lexeme.is_empty() =>
            {
                Ok(token.lexeme)
            }
            _ => Err(error_at(
                format!("'{operator}' expects a field name, found {}", describe(&token)),
                &token,
            )),
        }
    }

    /// Parses: scalar → IDENTIFIER | STRING | INTEGER | FLOAT
    ///
    /// A keyword not followed by `(` is read as a plain word.
    fn parse_scalar(&mut self) -> Result<Value, QueryError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Keyword(_) if self.current.kind == TokenKind::LParen => Err(error_at(
                "expected a value, found an operation",
                &token,
            )),
            TokenKind::Identifier | TokenKind::String | TokenKind::Keyword(_) => {
                Ok(Value::String(token.lexeme))
            }
            TokenKind::Integer => token
                .lexeme
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| error_at("integer out of range", &token)),
            TokenKind::Float => match token.lexeme.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Value::Float(n)),
                _ => Err(error_at("float out of range", &token)),
            },
            TokenKind::LBracket => Err(error_at("expected a value, found an array", &token)),
            _ => Err(error_at(
                format!("expected a value, found {}", describe(&token)),
                &token,
            )),
        }
    }

    /// Fails if another argument follows where the operator takes no more.
    fn reject_extra_argument(&self, operator: &str, arity: &str) -> Result<(), QueryError> {
        if self.current.kind == TokenKind::Comma {
            return Err(error_at(
                format!("'{operator}' takes {arity}"),
                &self.current,
            ));
        }
        Ok(())
    }

    /// Consumes the current token if it has the expected kind.
    fn expect(
        &mut self,
        kind: TokenKind,
        message: impl FnOnce() -> String,
    ) -> Result<Token, QueryError> {
        if self.current.kind != kind {
            return Err(error_at(message(), &self.current));
        }
        self.advance()
    }

    /// Consumes the current token and returns it, pulling the next one from the lexer.
    fn advance(&mut self) -> Result<Token, QueryError> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current, next))
    }
}

/// Parses a query string into an AST.
///
/// Returns [`Operation::MatchAll`] for empty queries, the root operation for valid queries, or
/// a [`QueryError`] describing the first problem found.
pub fn parse(input: &str) -> Result<Operation, QueryError> {
    Parser::new(input)?.parse()
}
