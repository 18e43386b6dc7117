//! Lexer, parser and AST for the resource query language (RQL).
//!
//! RQL is a compact, URL-safe, function-call style query language:
//!
//! - **Comparisons**: `eq(id,abc)`, `ne`, `lt`, `gt`, `lte`, `gte`
//! - **Wildcards**: `like(name,Jo*)`
//! - **Sets**: `in(id,[a,b])`, `out(status,[deleted,archived])`
//! - **Grouping**: `or(eq(a,1),and(eq(b,2),eq(c,3)))`
//! - **Sorting**: `sort(+name,-age)`
//! - **Pagination**: `limit(10,20)`
//! - **Top-level conjunction**: `eq(a,1)&sort(-b)&limit(5)`
//!
//! Parsing produces a single [`Operation`]; backend translators walk it.
//!
//! # Example
//!
//! ```
//! use rql::{Operation, parse};
//!
//! let op = parse("or(eq(id,x),like(name,Jo))").unwrap();
//! assert!(op.is_boolean());
//! assert_eq!(parse("").unwrap(), Operation::MatchAll);
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{
    ArrayKind, ArrayOperation, BooleanKind, BooleanOperation, LimitOperation, Operation,
    PropertyKind, PropertyOperation, SortDirection, SortField, SortOperation, Value,
};
pub use error::{LexError, QueryError, SyntaxError};
pub use lexer::{Keyword, Lexer, Token, TokenKind, tokenize};
pub use parser::{MAX_NESTING_DEPTH, parse};
