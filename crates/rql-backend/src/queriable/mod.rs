//! Direct dispatch onto a per-operator query builder.
//!
//! Some clients expose one method per comparison and connective (`and_eq`, `or_lt`, ...)
//! instead of a tree-shaped builder. [`apply`] walks a parsed query in document order and
//! calls the matching method on a [`Queriable`]. Such builders have no grouping primitive, so
//! nested groups are flattened: each leaf uses the connective of its nearest enclosing group.

mod orchestrate;

use rql::{
    ArrayKind, ArrayOperation, BooleanKind, BooleanOperation, LimitOperation, Operation,
    PropertyKind, PropertyOperation, SortDirection, SortOperation, Value,
};

pub use self::orchestrate::{OrchestrateQueriable, SearchOperation};
use crate::{TranslateError, Visitor};

/// A query builder with one method per operator and connective.
///
/// Every method consumes the builder and returns it.
pub trait Queriable: Sized {
    /// What [`Queriable::execute`] produces.
    type Output;

    /// AND field equals value.
    fn and_eq(self, field: &str, value: &Value) -> Self;
    /// OR field equals value.
    fn or_eq(self, field: &str, value: &Value) -> Self;
    /// AND field differs from value.
    fn and_ne(self, field: &str, value: &Value) -> Self;
    /// OR field differs from value.
    fn or_ne(self, field: &str, value: &Value) -> Self;
    /// AND field is one of values.
    fn and_in(self, field: &str, values: &[Value]) -> Self;
    /// OR field is one of values.
    fn or_in(self, field: &str, values: &[Value]) -> Self;
    /// AND field is none of values.
    fn and_out(self, field: &str, values: &[Value]) -> Self;
    /// OR field is none of values.
    fn or_out(self, field: &str, values: &[Value]) -> Self;
    /// AND field is above value.
    fn and_gt(self, field: &str, value: &Value) -> Self;
    /// OR field is above value.
    fn or_gt(self, field: &str, value: &Value) -> Self;
    /// AND field is at least value.
    fn and_ge(self, field: &str, value: &Value) -> Self;
    /// OR field is at least value.
    fn or_ge(self, field: &str, value: &Value) -> Self;
    /// AND field is below value.
    fn and_lt(self, field: &str, value: &Value) -> Self;
    /// OR field is below value.
    fn or_lt(self, field: &str, value: &Value) -> Self;
    /// AND field is at most value.
    fn and_le(self, field: &str, value: &Value) -> Self;
    /// OR field is at most value.
    fn or_le(self, field: &str, value: &Value) -> Self;

    /// Sets the result limit.
    fn limit(self, limit: u64) -> Self;
    /// Sets the number of results to skip.
    fn offset(self, offset: u64) -> Self;
    /// Appends a sort key.
    fn sort(self, field: &str, direction: SortDirection) -> Self;

    /// Finalizes the accumulated query and returns it with a reset builder.
    fn execute(self) -> (Self::Output, Self);
}

/// Walks `op` and dispatches every node onto `queriable`.
pub fn apply<Q: Queriable>(op: &Operation, queriable: Q) -> Result<Q, TranslateError> {
    let dispatch = Dispatcher.visit(
        op,
        Dispatch {
            target: queriable,
            group: None,
        },
    )?;
    Ok(dispatch.target)
}

/// Walk state: the builder plus the connective of the nearest enclosing group.
struct Dispatch<Q> {
    /// The builder receiving calls.
    target: Q,
    /// `None` at the top level, where leaves are ANDed.
    group: Option<BooleanKind>,
}

impl<Q> Dispatch<Q> {
    /// Whether leaves at this scope use the OR variants.
    fn is_or(&self) -> bool {
        self.group == Some(BooleanKind::Or)
    }

    /// Fails when a modifier appears inside a boolean group.
    fn require_top_level(&self, operation: &'static str) -> Result<(), TranslateError> {
        match self.group {
            Some(_) => Err(TranslateError::Misplaced { operation }),
            None => Ok(()),
        }
    }
}

/// Visitor behind [`apply`].
struct Dispatcher;

impl<Q: Queriable> Visitor<Dispatch<Q>> for Dispatcher {
    fn visit_match_all(&self, state: Dispatch<Q>) -> Result<Dispatch<Q>, TranslateError> {
        state.require_top_level("match-all")?;
        Ok(state)
    }

    fn visit_property(
        &self,
        op: &PropertyOperation,
        state: Dispatch<Q>,
    ) -> Result<Dispatch<Q>, TranslateError> {
        let or = state.is_or();
        let field = op.field.as_str();
        let value = &op.value;
        let Dispatch { target, group } = state;
        let target = match (op.kind, or) {
            (PropertyKind::Eq, false) => target.and_eq(field, value),
            (PropertyKind::Eq, true) => target.or_eq(field, value),
            (PropertyKind::Ne, false) => target.and_ne(field, value),
            (PropertyKind::Ne, true) => target.or_ne(field, value),
            (PropertyKind::Lt, false) => target.and_lt(field, value),
            (PropertyKind::Lt, true) => target.or_lt(field, value),
            (PropertyKind::Lte, false) => target.and_le(field, value),
            (PropertyKind::Lte, true) => target.or_le(field, value),
            (PropertyKind::Gt, false) => target.and_gt(field, value),
            (PropertyKind::Gt, true) => target.or_gt(field, value),
            (PropertyKind::Gte, false) => target.and_ge(field, value),
            (PropertyKind::Gte, true) => target.or_ge(field, value),
            (PropertyKind::Like, false) => target.and_eq(field, &prefix(value)),
            (PropertyKind::Like, true) => target.or_eq(field, &prefix(value)),
        };
        Ok(Dispatch { target, group })
    }

    fn visit_array(
        &self,
        op: &ArrayOperation,
        state: Dispatch<Q>,
    ) -> Result<Dispatch<Q>, TranslateError> {
        let or = state.is_or();
        let Dispatch { target, group } = state;
        let target = match (op.kind, or) {
            (ArrayKind::In, false) => target.and_in(&op.field, &op.values),
            (ArrayKind::In, true) => target.or_in(&op.field, &op.values),
            (ArrayKind::Out, false) => target.and_out(&op.field, &op.values),
            (ArrayKind::Out, true) => target.or_out(&op.field, &op.values),
        };
        Ok(Dispatch { target, group })
    }

    fn visit_boolean(
        &self,
        op: &BooleanOperation,
        state: Dispatch<Q>,
    ) -> Result<Dispatch<Q>, TranslateError> {
        let outer = state.group;
        let inner = Dispatch {
            target: state.target,
            group: Some(op.kind),
        };
        let inner = op
            .children
            .iter()
            .try_fold(inner, |inner, child| self.visit(child, inner))?;
        Ok(Dispatch {
            target: inner.target,
            group: outer,
        })
    }

    fn visit_sort(
        &self,
        op: &SortOperation,
        state: Dispatch<Q>,
    ) -> Result<Dispatch<Q>, TranslateError> {
        state.require_top_level("sort")?;
        let Dispatch { target, group } = state;
        let target = op.fields.iter().fold(target, |target, sort| {
            target.sort(&sort.field, sort.direction)
        });
        Ok(Dispatch { target, group })
    }

    fn visit_limit(
        &self,
        op: &LimitOperation,
        state: Dispatch<Q>,
    ) -> Result<Dispatch<Q>, TranslateError> {
        state.require_top_level("limit")?;
        let Dispatch { target, group } = state;
        Ok(Dispatch {
            target: target.limit(op.limit).offset(op.skip),
            group,
        })
    }

    fn visit_query(
        &self,
        ops: &[Operation],
        state: Dispatch<Q>,
    ) -> Result<Dispatch<Q>, TranslateError> {
        state.require_top_level("query")?;
        ops.iter().try_fold(state, |state, op| self.visit(op, state))
    }
}

/// A `like` value as the prefix match the per-operator builders understand.
fn prefix(value: &Value) -> Value {
    Value::String(format!("{value}*"))
}

#[cfg(test)]
mod tests {
    use rql::parse;

    use super::*;

    /// Records every call by method name.
    #[derive(Debug, Default)]
    struct Recorder {
        /// Calls in order.
        calls: Vec<String>,
    }

    impl Recorder {
        /// Appends a call with a single value.
        fn one(mut self, method: &str, field: &str, value: &Value) -> Self {
            self.calls.push(format!("{method}({field},{value})"));
            self
        }

        /// Appends a call with a value list.
        fn many(mut self, method: &str, field: &str, values: &[Value]) -> Self {
            let values = values.iter().map(ToString::to_string).collect::<Vec<_>>();
            self.calls
                .push(format!("{method}({field},[{}])", values.join(",")));
            self
        }
    }

    impl Queriable for Recorder {
        type Output = Vec<String>;

        fn and_eq(self, field: &str, value: &Value) -> Self {
            self.one("and_eq", field, value)
        }
        fn or_eq(self, field: &str, value: &Value) -> Self {
            self.one("or_eq", field, value)
        }
        fn and_ne(self, field: &str, value: &Value) -> Self {
            self.one("and_ne", field, value)
        }
        fn or_ne(self, field: &str, value: &Value) -> Self {
            self.one("or_ne", field, value)
        }
        fn and_in(self, field: &str, values: &[Value]) -> Self {
            self.many("and_in", field, values)
        }
        fn or_in(self, field: &str, values: &[Value]) -> Self {
            self.many("or_in", field, values)
        }
        fn and_out(self, field: &str, values: &[Value]) -> Self {
            self.many("and_out", field, values)
        }
        fn or_out(self, field: &str, values: &[Value]) -> Self {
            self.many("or_out", field, values)
        }
        fn and_gt(self, field: &str, value: &Value) -> Self {
            self.one("and_gt", field, value)
        }
        fn or_gt(self, field: &str, value: &Value) -> Self {
            self.one("or_gt", field, value)
        }
        fn and_ge(self, field: &str, value: &Value) -> Self {
            self.one("and_ge", field, value)
        }
        fn or_ge(self, field: &str, value: &Value) -> Self {
            self.one("or_ge", field, value)
        }
        fn and_lt(self, field: &str, value: &Value) -> Self {
            self.one("and_lt", field, value)
        }
        fn or_lt(self, field: &str, value: &Value) -> Self {
            self.one("or_lt", field, value)
        }
        fn and_le(self, field: &str, value: &Value) -> Self {
            self.one("and_le", field, value)
        }
        fn or_le(self, field: &str, value: &Value) -> Self {
            self.one("or_le", field, value)
        }

        fn limit(mut self, limit: u64) -> Self {
            self.calls.push(format!("limit({limit})"));
            self
        }

        fn offset(mut self, offset: u64) -> Self {
            self.calls.push(format!("offset({offset})"));
            self
        }

        fn sort(mut self, field: &str, direction: SortDirection) -> Self {
            self.calls.push(format!("sort({field},{})", direction.as_str()));
            self
        }

        fn execute(self) -> (Vec<String>, Self) {
            (self.calls, Self::default())
        }
    }

    /// Parses `input`, applies it to a fresh recorder and returns the calls.
    fn calls(input: &str) -> Vec<String> {
        let op = parse(input).unwrap();
        apply(&op, Recorder::default()).unwrap().execute().0
    }

    #[test]
    fn top_level_leaves_use_and() {
        assert_eq!(
            calls("eq(a,1)&ne(b,2)&lt(c,3)&lte(d,4)&gt(e,5)&gte(f,6)"),
            [
                "and_eq(a,1)",
                "and_ne(b,2)",
                "and_lt(c,3)",
                "and_le(d,4)",
                "and_gt(e,5)",
                "and_ge(f,6)",
            ]
        );
    }

    #[test]
    fn or_group_uses_or_variants() {
        assert_eq!(
            calls("or(eq(a,1),in(b,[x,y]),out(c,[z]),gte(d,2))"),
            ["or_eq(a,1)", "or_in(b,[x,y])", "or_out(c,[z])", "or_ge(d,2)"]
        );
    }

    #[test]
    fn nested_groups_flatten_to_nearest_connective() {
        assert_eq!(
            calls("or(eq(id,my-resource-id),and(eq(gender,male),like(name,'Resource name')))"),
            [
                "or_eq(id,my-resource-id)",
                "and_eq(gender,male)",
                "and_eq(name,Resource name*)",
            ]
        );
    }

    #[test]
    fn connective_restored_after_group() {
        assert_eq!(
            calls("or(and(eq(a,1),eq(b,2)),eq(c,3))"),
            ["and_eq(a,1)", "and_eq(b,2)", "or_eq(c,3)"]
        );
    }

    #[test]
    fn like_dispatches_as_prefix_eq() {
        assert_eq!(calls("like(name,Jo)"), ["and_eq(name,Jo*)"]);
        assert_eq!(calls("or(like(name,Jo))"), ["or_eq(name,Jo*)"]);
    }

    #[test]
    fn modifiers() {
        assert_eq!(
            calls("eq(a,1)&sort(+a,-b)&limit(10,20)"),
            ["and_eq(a,1)", "sort(a,asc)", "sort(b,desc)", "limit(10)", "offset(20)"]
        );
    }

    #[test]
    fn empty_query_makes_no_calls() {
        assert!(calls("").is_empty());
    }

    #[test]
    fn misplaced_limit_rejected() {
        let op = Operation::or(vec![Operation::limit(1, 0)]);
        assert!(matches!(
            apply(&op, Recorder::default()),
            Err(TranslateError::Misplaced { operation: "limit" })
        ));
    }
}
