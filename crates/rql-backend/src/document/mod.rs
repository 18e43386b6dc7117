//! Document-store translation.
//!
//! The store's query builder is modelled as two capabilities. [`Criteria`] is anything that
//! accepts field conditions and nested AND/OR sub-expressions; [`DocumentBuilder`] is the
//! root criteria, which additionally accepts sort and pagination. [`DocumentVisitor`] drives
//! a builder through a parsed query and hands it back unexecuted.
//!
//! [`MongoQuery`] is a reference builder producing a MongoDB-style JSON filter.

mod mongo;

use regex::Regex;
use rql::{
    ArrayKind, ArrayOperation, BooleanKind, BooleanOperation, LimitOperation, Operation,
    PropertyKind, PropertyOperation, SortDirection, SortOperation, Value,
};
use rql_config::{DocumentSettings, FieldAliases};
use tracing::debug;

pub use self::mongo::{MongoExpr, MongoQuery};
use crate::{TranslateError, Visitor};

/// A condition placed on one field.
#[derive(Debug, Clone)]
pub enum Comparison {
    /// Field equals the value.
    Equals(Value),
    /// Field differs from the value.
    NotEqual(Value),
    /// Field is below the value.
    Lt(Value),
    /// Field is above the value.
    Gt(Value),
    /// Field is at most the value.
    Lte(Value),
    /// Field is at least the value.
    Gte(Value),
    /// Field is one of the values.
    In(Vec<Value>),
    /// Field is none of the values.
    NotIn(Vec<Value>),
    /// Field matches the pattern anywhere.
    Matches(Regex),
}

/// A builder accepting field conditions and nested boolean sub-expressions.
pub trait Criteria: Sized {
    /// The type of a nested sub-expression.
    type Expr: Criteria;

    /// Creates a fresh, empty sub-expression.
    fn expr(&self) -> Self::Expr;

    /// Adds a condition on `field`.
    fn condition(self, field: &str, comparison: Comparison) -> Self;

    /// Adds `expr` as one operand of an AND group.
    fn add_and(self, expr: Self::Expr) -> Self;

    /// Adds `expr` as one operand of an OR group.
    fn add_or(self, expr: Self::Expr) -> Self;

    /// Selects a field to place a condition on.
    fn field(self, name: impl Into<String>) -> FieldHandle<Self> {
        FieldHandle {
            target: self,
            name: name.into(),
        }
    }
}

/// The root builder of a document query.
pub trait DocumentBuilder: Criteria {
    /// Appends a sort key.
    fn sort(self, field: &str, direction: SortDirection) -> Self;

    /// Limits the number of results.
    fn limit(self, limit: u64) -> Self;

    /// Skips leading results.
    fn skip(self, skip: u64) -> Self;
}

/// A field selected on a criteria; each comparison returns the owning criteria.
#[derive(Debug)]
pub struct FieldHandle<C> {
    /// The criteria the condition is added to.
    target: C,
    /// Backend field name.
    name: String,
}

impl<C: Criteria> FieldHandle<C> {
    /// Field equals `value`.
    pub fn equals(self, value: Value) -> C {
        self.apply(Comparison::Equals(value))
    }

    /// Field differs from `value`.
    pub fn not_equal(self, value: Value) -> C {
        self.apply(Comparison::NotEqual(value))
    }

    /// Field is below `value`.
    pub fn lt(self, value: Value) -> C {
        self.apply(Comparison::Lt(value))
    }

    /// Field is above `value`.
    pub fn gt(self, value: Value) -> C {
        self.apply(Comparison::Gt(value))
    }

    /// Field is at most `value`.
    pub fn lte(self, value: Value) -> C {
        self.apply(Comparison::Lte(value))
    }

    /// Field is at least `value`.
    pub fn gte(self, value: Value) -> C {
        self.apply(Comparison::Gte(value))
    }

    /// Field is one of `values`.
    pub fn is_in(self, values: Vec<Value>) -> C {
        self.apply(Comparison::In(values))
    }

    /// Field is none of `values`.
    pub fn not_in(self, values: Vec<Value>) -> C {
        self.apply(Comparison::NotIn(values))
    }

    /// Field matches `pattern`.
    pub fn matches(self, pattern: Regex) -> C {
        self.apply(Comparison::Matches(pattern))
    }

    /// Hands the condition to the owning criteria.
    fn apply(self, comparison: Comparison) -> C {
        self.target.condition(&self.name, comparison)
    }
}

/// Builds the regex source for a `like` value: `*` matches any run of characters and
/// everything else matches literally.
pub fn like_pattern(value: &str) -> String {
    value
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

/// Translates queries into calls on a [`DocumentBuilder`].
#[derive(Debug, Clone, Default)]
pub struct DocumentVisitor {
    /// Field renames applied before calling the builder.
    aliases: FieldAliases,
}

impl DocumentVisitor {
    /// Creates a visitor using the given settings.
    pub fn new(settings: &DocumentSettings) -> Self {
        Self {
            aliases: settings.aliases.clone(),
        }
    }

    /// Applies `op` to `builder` and returns the configured builder.
    pub fn build<B: DocumentBuilder>(&self, op: &Operation, builder: B) -> Result<B, TranslateError> {
        let builder = self.visit(op, builder)?;
        debug!(
            operation = op.name().unwrap_or("query"),
            "applied query to document builder"
        );
        Ok(builder)
    }

    /// Adds a property condition to any criteria.
    fn compare<C: Criteria>(&self, op: &PropertyOperation, target: C) -> Result<C, TranslateError> {
        let field = target.field(self.aliases.resolve(&op.field));
        let value = op.value.clone();
        Ok(match op.kind {
            PropertyKind::Eq => field.equals(value),
            PropertyKind::Ne => field.not_equal(value),
            PropertyKind::Lt => field.lt(value),
            PropertyKind::Gt => field.gt(value),
            PropertyKind::Lte => field.lte(value),
            PropertyKind::Gte => field.gte(value),
            PropertyKind::Like => field.matches(like_regex(&value)?),
        })
    }

    /// Adds a set-membership condition to any criteria.
    fn compare_set<C: Criteria>(&self, op: &ArrayOperation, target: C) -> C {
        let field = target.field(self.aliases.resolve(&op.field));
        let values = op.values.clone();
        match op.kind {
            ArrayKind::In => field.is_in(values),
            ArrayKind::Out => field.not_in(values),
        }
    }

    /// Adds one sub-expression per child, combined by the group's connective.
    fn group<C: Criteria>(&self, op: &BooleanOperation, target: C) -> Result<C, TranslateError> {
        op.children.iter().try_fold(target, |target, child| {
            let expr = Nested(self).visit(child, target.expr())?;
            Ok(match op.kind {
                BooleanKind::And => target.add_and(expr),
                BooleanKind::Or => target.add_or(expr),
            })
        })
    }
}

/// Compiles the regex for a `like` value.
fn like_regex(value: &Value) -> Result<Regex, TranslateError> {
    let pattern = like_pattern(&value.to_string());
    Regex::new(&pattern).map_err(|source| TranslateError::Pattern { pattern, source })
}

impl<B: DocumentBuilder> Visitor<B> for DocumentVisitor {
    fn visit_match_all(&self, builder: B) -> Result<B, TranslateError> {
        Ok(builder)
    }

    fn visit_property(&self, op: &PropertyOperation, builder: B) -> Result<B, TranslateError> {
        self.compare(op, builder)
    }

    fn visit_array(&self, op: &ArrayOperation, builder: B) -> Result<B, TranslateError> {
        Ok(self.compare_set(op, builder))
    }

    fn visit_boolean(&self, op: &BooleanOperation, builder: B) -> Result<B, TranslateError> {
        self.group(op, builder)
    }

    fn visit_sort(&self, op: &SortOperation, builder: B) -> Result<B, TranslateError> {
        Ok(op.fields.iter().fold(builder, |builder, sort| {
            builder.sort(self.aliases.resolve(&sort.field), sort.direction)
        }))
    }

    fn visit_limit(&self, op: &LimitOperation, builder: B) -> Result<B, TranslateError> {
        Ok(builder.limit(op.limit).skip(op.skip))
    }

    fn visit_query(&self, ops: &[Operation], builder: B) -> Result<B, TranslateError> {
        ops.iter().try_fold(builder, |builder, op| self.visit(op, builder))
    }
}

/// The visitor as seen from inside a boolean group, where only filters are allowed.
struct Nested<'a>(&'a DocumentVisitor);

impl<C: Criteria> Visitor<C> for Nested<'_> {
    fn visit_match_all(&self, _target: C) -> Result<C, TranslateError> {
        Err(TranslateError::Misplaced {
            operation: "match-all",
        })
    }

    fn visit_property(&self, op: &PropertyOperation, target: C) -> Result<C, TranslateError> {
        self.0.compare(op, target)
    }

    fn visit_array(&self, op: &ArrayOperation, target: C) -> Result<C, TranslateError> {
        Ok(self.0.compare_set(op, target))
    }

    fn visit_boolean(&self, op: &BooleanOperation, target: C) -> Result<C, TranslateError> {
        self.0.group(op, target)
    }

    fn visit_sort(&self, _op: &SortOperation, _target: C) -> Result<C, TranslateError> {
        Err(TranslateError::Misplaced { operation: "sort" })
    }

    fn visit_limit(&self, _op: &LimitOperation, _target: C) -> Result<C, TranslateError> {
        Err(TranslateError::Misplaced { operation: "limit" })
    }

    fn visit_query(&self, _ops: &[Operation], _target: C) -> Result<C, TranslateError> {
        Err(TranslateError::Misplaced { operation: "query" })
    }
}

/// Parses `input` and builds a [`MongoQuery`] from it.
pub fn to_mongo_query(input: &str, settings: &DocumentSettings) -> Result<MongoQuery, TranslateError> {
    let op = rql::parse(input)?;
    DocumentVisitor::new(settings).build(&op, MongoQuery::new())
}
