//! Backend translators for rql queries.
//!
//! Three ways to turn a parsed [`rql::Operation`] into something a datastore understands:
//!
//! - [`document`]: drives a tree-shaped document-store query builder ([`DocumentBuilder`]),
//!   with a MongoDB-style reference builder ([`MongoQuery`]).
//! - [`search`]: renders a Lucene-style query string with limit, offset and sort
//!   ([`SearchQuery`]) for a hosted search service.
//! - [`queriable`]: dispatches each operator onto a per-method builder ([`Queriable`]), with an
//!   Orchestrate reference implementation.
//!
//! All three are [`Visitor`]s: exhaustive matches over the closed operation enum, threading
//! their state by value.
//!
//! # Example
//!
//! ```
//! use rql_backend::to_search_query;
//! use rql_config::SearchSettings;
//!
//! let search = to_search_query("or(eq(id,x),like(name,Jo))", &SearchSettings::default()).unwrap();
//! assert_eq!(search.query, "(key:`x` OR name:Jo*)");
//! assert_eq!(search.limit, 100);
//! ```

#![warn(missing_docs)]

pub mod document;
mod error;
pub mod queriable;
pub mod search;
mod visitor;

pub use document::{
    Comparison, Criteria, DocumentBuilder, DocumentVisitor, FieldHandle, MongoExpr, MongoQuery,
    to_mongo_query,
};
pub use error::TranslateError;
pub use queriable::{OrchestrateQueriable, Queriable, SearchOperation, apply};
pub use search::{SearchDraft, SearchQuery, SearchService, SearchVisitor, to_search_query};
pub use visitor::Visitor;
