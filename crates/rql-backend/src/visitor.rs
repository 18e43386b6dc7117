//! Visitor dispatch core.
//!
//! Every backend translator implements [`Visitor`] for the state it threads through the walk.
//! The state is passed in and handed back by value, so a translation never shares mutable
//! state with anything else. Each node variant has its own required method; a variant that
//! means nothing to a backend still gets an explicit no-op.

use rql::{
    ArrayOperation, BooleanOperation, LimitOperation, Operation, PropertyOperation, SortOperation,
};
use tracing::trace;

use crate::TranslateError;

/// A backend translator walking an operation tree with state `S`.
pub trait Visitor<S> {
    /// Routes `op` to the method for its variant.
    fn visit(&self, op: &Operation, state: S) -> Result<S, TranslateError> {
        trace!(operation = op.name().unwrap_or("query"), "visit");
        match op {
            Operation::MatchAll => self.visit_match_all(state),
            Operation::Property(op) => self.visit_property(op, state),
            Operation::Array(op) => self.visit_array(op, state),
            Operation::Boolean(op) => self.visit_boolean(op, state),
            Operation::Sort(op) => self.visit_sort(op, state),
            Operation::Limit(op) => self.visit_limit(op, state),
            Operation::Query(ops) => self.visit_query(ops, state),
        }
    }

    /// Handles the empty query.
    fn visit_match_all(&self, state: S) -> Result<S, TranslateError>;

    /// Handles `eq`, `ne`, `lt`, `gt`, `lte`, `gte` and `like`.
    fn visit_property(&self, op: &PropertyOperation, state: S) -> Result<S, TranslateError>;

    /// Handles `in` and `out`.
    fn visit_array(&self, op: &ArrayOperation, state: S) -> Result<S, TranslateError>;

    /// Handles `and` and `or`.
    fn visit_boolean(&self, op: &BooleanOperation, state: S) -> Result<S, TranslateError>;

    /// Handles `sort`.
    fn visit_sort(&self, op: &SortOperation, state: S) -> Result<S, TranslateError>;

    /// Handles `limit`.
    fn visit_limit(&self, op: &LimitOperation, state: S) -> Result<S, TranslateError>;

    /// Handles a top-level `&` sequence.
    fn visit_query(&self, ops: &[Operation], state: S) -> Result<S, TranslateError>;
}
