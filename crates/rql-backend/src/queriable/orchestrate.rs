//! Queriable for the Orchestrate search service.

use rql::{ArrayKind, PropertyKind, SortDirection, Value};
use rql_config::{FieldAliases, SearchSettings};
use serde::Serialize;
use tracing::debug;

use super::Queriable;
use crate::{SearchQuery, TranslateError, search::lucene};

/// A finalized search against one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOperation {
    /// Collection searched.
    pub collection: String,
    /// Query string, limit, offset and sort.
    #[serde(flatten)]
    pub search: SearchQuery,
}

/// Accumulates Lucene-style pieces for one collection.
#[derive(Debug, Clone)]
pub struct OrchestrateQueriable {
    /// Collection searched.
    collection: String,
    /// Defaults restored on reset, and field aliases.
    settings: SearchSettings,
    /// Pieces joined so far.
    query: String,
    /// Limit override.
    limit: Option<u64>,
    /// Offset override.
    offset: Option<u64>,
    /// Rendered sort keys.
    sort: Vec<String>,
}

impl OrchestrateQueriable {
    /// Creates an empty queriable for `collection`.
    pub fn new(collection: impl Into<String>, settings: &SearchSettings) -> Result<Self, TranslateError> {
        let collection = collection.into();
        if collection.trim().is_empty() {
            return Err(TranslateError::semantic("collection name must not be empty"));
        }
        Ok(Self {
            collection,
            settings: settings.clone(),
            query: String::new(),
            limit: None,
            offset: None,
            sort: Vec::new(),
        })
    }

    /// Returns the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the query accumulated so far.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The alias table in use.
    fn aliases(&self) -> &FieldAliases {
        &self.settings.aliases
    }

    /// Joins `piece` onto the query with `connective`.
    fn add_piece(mut self, piece: &str, connective: &str) -> Self {
        if !self.query.is_empty() {
            self.query.push(' ');
            self.query.push_str(connective);
            self.query.push(' ');
        }
        self.query.push_str(piece);
        self
    }

    /// Adds a single-value clause.
    fn property(self, connective: &str, kind: PropertyKind, field: &str, value: &Value) -> Self {
        let piece = lucene::property_clause(self.aliases().resolve(field), kind, value);
        self.add_piece(&piece, connective)
    }

    /// Adds a set-membership clause.
    fn membership(self, connective: &str, kind: ArrayKind, field: &str, values: &[Value]) -> Self {
        let piece = lucene::membership_clause(self.aliases().resolve(field), kind, values);
        self.add_piece(&piece, connective)
    }
}

/// Connective for `and_*` methods.
const AND: &str = "AND";
/// Connective for `or_*` methods.
const OR: &str = "OR";

impl Queriable for OrchestrateQueriable {
    type Output = SearchOperation;

    fn and_eq(self, field: &str, value: &Value) -> Self {
        self.property(AND, PropertyKind::Eq, field, value)
    }

    fn or_eq(self, field: &str, value: &Value) -> Self {
        self.property(OR, PropertyKind::Eq, field, value)
    }

    fn and_ne(self, field: &str, value: &Value) -> Self {
        self.property(AND, PropertyKind::Ne, field, value)
    }

    fn or_ne(self, field: &str, value: &Value) -> Self {
        self.property(OR, PropertyKind::Ne, field, value)
    }

    fn and_in(self, field: &str, values: &[Value]) -> Self {
        self.membership(AND, ArrayKind::In, field, values)
    }

    fn or_in(self, field: &str, values: &[Value]) -> Self {
        self.membership(OR, ArrayKind::In, field, values)
    }

    fn and_out(self, field: &str, values: &[Value]) -> Self {
        self.membership(AND, ArrayKind::Out, field, values)
    }

    fn or_out(self, field: &str, values: &[Value]) -> Self {
        self.membership(OR, ArrayKind::Out, field, values)
    }

    fn and_gt(self, field: &str, value: &Value) -> Self {
        self.property(AND, PropertyKind::Gt, field, value)
    }

    fn or_gt(self, field: &str, value: &Value) -> Self {
        self.property(OR, PropertyKind::Gt, field, value)
    }

    fn and_ge(self, field: &str, value: &Value) -> Self {
        self.property(AND, PropertyKind::Gte, field, value)
    }

    fn or_ge(self, field: &str, value: &Value) -> Self {
        self.property(OR, PropertyKind::Gte, field, value)
    }

    fn and_lt(self, field: &str, value: &Value) -> Self {
        self.property(AND, PropertyKind::Lt, field, value)
    }

    fn or_lt(self, field: &str, value: &Value) -> Self {
        self.property(OR, PropertyKind::Lt, field, value)
    }

    fn and_le(self, field: &str, value: &Value) -> Self {
        self.property(AND, PropertyKind::Lte, field, value)
    }

    fn or_le(self, field: &str, value: &Value) -> Self {
        self.property(OR, PropertyKind::Lte, field, value)
    }

    fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        let key = format!("{}:{}", self.aliases().resolve(field), direction.as_str());
        self.sort.push(key);
        self
    }

    fn execute(self) -> (SearchOperation, Self) {
        let search = SearchQuery {
            query: if self.query.is_empty() {
                "*".to_string()
            } else {
                self.query
            },
            limit: self.limit.unwrap_or(self.settings.default_limit),
            offset: self.offset.unwrap_or(self.settings.default_offset),
            sort: if self.sort.is_empty() {
                self.settings.default_sort.clone()
            } else {
                self.sort.join(",")
            },
        };
        debug!(
            collection = %self.collection,
            query = %search.query,
            limit = search.limit,
            offset = search.offset,
            "built search operation"
        );
        let operation = SearchOperation {
            collection: self.collection.clone(),
            search,
        };
        let reset = Self {
            collection: self.collection,
            settings: self.settings,
            query: String::new(),
            limit: None,
            offset: None,
            sort: Vec::new(),
        };
        (operation, reset)
    }
}
