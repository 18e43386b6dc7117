//! MongoDB-style filter builder.

use rql::{SortDirection, Value};
use serde_json::{Map, Number, Value as Json, json};

use super::{Comparison, Criteria, DocumentBuilder};

/// A nested MongoDB filter expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MongoExpr {
    /// The filter document.
    filter: Map<String, Json>,
}

impl MongoExpr {
    /// Returns the filter document.
    pub fn filter(&self) -> &Map<String, Json> {
        &self.filter
    }

    /// Returns the filter as a JSON value.
    pub fn to_json(&self) -> Json {
        Json::Object(self.filter.clone())
    }
}

impl Criteria for MongoExpr {
    type Expr = Self;

    fn expr(&self) -> Self {
        Self::default()
    }

    fn condition(mut self, field: &str, comparison: Comparison) -> Self {
        add_condition(&mut self.filter, field, comparison);
        self
    }

    fn add_and(mut self, expr: Self) -> Self {
        push_operand(&mut self.filter, "$and", expr.filter);
        self
    }

    fn add_or(mut self, expr: Self) -> Self {
        push_operand(&mut self.filter, "$or", expr.filter);
        self
    }
}

/// A complete MongoDB find: filter, sort and pagination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MongoQuery {
    /// The root filter.
    root: MongoExpr,
    /// Sort keys in priority order.
    sort: Vec<(String, SortDirection)>,
    /// Result limit, if any.
    limit: Option<u64>,
    /// Number of results to skip, if any.
    skip: Option<u64>,
}

impl MongoQuery {
    /// Creates an empty query matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the filter document.
    pub fn filter(&self) -> &Map<String, Json> {
        self.root.filter()
    }

    /// Returns the sort keys in priority order.
    pub fn sort_keys(&self) -> &[(String, SortDirection)] {
        &self.sort
    }

    /// Returns the result limit.
    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }

    /// Returns the number of skipped results.
    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    /// Renders the whole find as JSON.
    ///
    /// Sort keys are a list of `[field, 1 | -1]` pairs so their priority survives
    /// serialization; `limit` and `skip` appear only when set.
    pub fn to_json(&self) -> Json {
        let mut out = Map::new();
        out.insert("filter".to_string(), self.root.to_json());
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|(field, direction)| {
                    let order = match direction {
                        SortDirection::Asc => 1,
                        SortDirection::Desc => -1,
                    };
                    json!([field, order])
                })
                .collect();
            out.insert("sort".to_string(), Json::Array(sort));
        }
        if let Some(limit) = self.limit {
            out.insert("limit".to_string(), json!(limit));
        }
        if let Some(skip) = self.skip {
            out.insert("skip".to_string(), json!(skip));
        }
        Json::Object(out)
    }
}

impl Criteria for MongoQuery {
    type Expr = MongoExpr;

    fn expr(&self) -> MongoExpr {
        MongoExpr::default()
    }

    fn condition(mut self, field: &str, comparison: Comparison) -> Self {
        self.root = self.root.condition(field, comparison);
        self
    }

    fn add_and(mut self, expr: MongoExpr) -> Self {
        self.root = self.root.add_and(expr);
        self
    }

    fn add_or(mut self, expr: MongoExpr) -> Self {
        self.root = self.root.add_or(expr);
        self
    }
}

impl DocumentBuilder for MongoQuery {
    fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort.push((field.to_string(), direction));
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
}

/// Converts a scalar to JSON. Non-finite floats cannot be represented and become `null`.
fn scalar(value: &Value) -> Json {
    match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Integer(n) => Json::from(*n),
        Value::Float(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
    }
}

/// Converts a value list to a JSON array.
fn scalars(values: &[Value]) -> Json {
    Json::Array(values.iter().map(scalar).collect())
}

/// Adds a condition on `field`.
///
/// A new operator joins the field's operator document when that operator is not set yet.
/// Any other condition on a field that is already constrained goes into `$and`, so earlier
/// conditions are never overwritten.
fn add_condition(filter: &mut Map<String, Json>, field: &str, comparison: Comparison) {
    let condition = match comparison {
        Comparison::Equals(value) => scalar(&value),
        Comparison::NotEqual(value) => operator("$ne", scalar(&value)),
        Comparison::Lt(value) => operator("$lt", scalar(&value)),
        Comparison::Gt(value) => operator("$gt", scalar(&value)),
        Comparison::Lte(value) => operator("$lte", scalar(&value)),
        Comparison::Gte(value) => operator("$gte", scalar(&value)),
        Comparison::In(values) => operator("$in", scalars(&values)),
        Comparison::NotIn(values) => operator("$nin", scalars(&values)),
        Comparison::Matches(pattern) => {
            operator("$regex", Json::String(pattern.as_str().to_string()))
        }
    };

    let Some(existing) = filter.get_mut(field) else {
        filter.insert(field.to_string(), condition);
        return;
    };
    if let (Json::Object(current), Json::Object(added)) = (&mut *existing, &condition) {
        let mergeable = is_operator_document(current)
            && is_operator_document(added)
            && added.keys().all(|key| !current.contains_key(key));
        if mergeable {
            current.extend(added.clone());
            return;
        }
    }

    let mut clause = Map::new();
    clause.insert(field.to_string(), condition);
    push_operand(filter, "$and", clause);
}

/// Builds a single-operator document such as `{"$gt": 5}`.
fn operator(name: &str, operand: Json) -> Json {
    let mut document = Map::new();
    document.insert(name.to_string(), operand);
    Json::Object(document)
}

/// Whether every key of a document is a query operator.
fn is_operator_document(document: &Map<String, Json>) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}

/// Appends a sub-expression to the `$and` or `$or` array of `filter`.
fn push_operand(filter: &mut Map<String, Json>, key: &str, expr: Map<String, Json>) {
    let operands = filter
        .entry(key.to_string())
        .or_insert_with(|| Json::Array(Vec::new()));
    if let Json::Array(items) = operands {
        items.push(Json::Object(expr));
    } else {
        *operands = Json::Array(vec![Json::Object(expr)]);
    }
}

#[cfg(test)]
mod tests {
    use rql::parse;
    use rql_config::DocumentSettings;

    use super::*;
    use crate::document::{DocumentVisitor, to_mongo_query};

    /// Translates `input` with default settings and returns the rendered find.
    fn mongo(input: &str) -> Json {
        to_mongo_query(input, &DocumentSettings::default())
            .unwrap()
            .to_json()
    }

    #[test]
    fn empty_query_is_empty_filter() {
        assert_eq!(mongo(""), json!({"filter": {}}));
    }

    #[test]
    fn equality_is_plain_value() {
        assert_eq!(mongo("eq(name,bob)"), json!({"filter": {"name": "bob"}}));
        assert_eq!(mongo("eq(age,30)"), json!({"filter": {"age": 30}}));
    }

    #[test]
    fn operators_merge_per_field() {
        assert_eq!(
            mongo("gte(age,18)&lt(age,65)&ne(age,30)"),
            json!({"filter": {"age": {"$gte": 18, "$lt": 65, "$ne": 30}}})
        );
    }

    #[test]
    fn set_operators() {
        assert_eq!(
            mongo("in(status,[a,b])&out(kind,[x])"),
            json!({"filter": {"status": {"$in": ["a", "b"]}, "kind": {"$nin": ["x"]}}})
        );
    }

    #[test]
    fn like_is_regex() {
        assert_eq!(
            mongo("like(name,Jo*)"),
            json!({"filter": {"name": {"$regex": "Jo.*"}}})
        );
    }

    #[test]
    fn groups_nest_as_arrays() {
        assert_eq!(
            mongo("or(eq(id,x),and(eq(gender,male),gt(age,20)))"),
            json!({"filter": {"$or": [
                {"id": "x"},
                {"$and": [{"gender": "male"}, {"age": {"$gt": 20}}]}
            ]}})
        );
    }

    #[test]
    fn sort_and_pagination() {
        assert_eq!(
            mongo("sort(+name,-age)&limit(10,5)"),
            json!({"filter": {}, "sort": [["name", 1], ["age", -1]], "limit": 10, "skip": 5})
        );
    }

    #[test]
    fn accessors() {
        let op = parse("eq(id,1)&sort(-id)&limit(3)").unwrap();
        let mut settings = DocumentSettings::default();
        settings.aliases.insert("id", "_id");
        let query = DocumentVisitor::new(&settings)
            .build(&op, MongoQuery::new())
            .unwrap();
        assert_eq!(query.filter().get("_id"), Some(&json!(1)));
        assert_eq!(query.sort_keys(), [("_id".to_string(), SortDirection::Desc)]);
        assert_eq!(query.limit_count(), Some(3));
        assert_eq!(query.skip_count(), Some(0));
    }

    #[test]
    fn repeated_operator_goes_to_and() {
        assert_eq!(
            mongo("ne(status,a)&ne(status,b)"),
            json!({"filter": {"status": {"$ne": "a"}, "$and": [{"status": {"$ne": "b"}}]}})
        );
        assert_eq!(
            mongo("like(n,x)&like(n,y)"),
            json!({"filter": {"n": {"$regex": "x"}, "$and": [{"n": {"$regex": "y"}}]}})
        );
    }

    #[test]
    fn operator_after_equality_keeps_both() {
        assert_eq!(
            mongo("eq(a,1)&gt(a,0)"),
            json!({"filter": {"a": 1, "$and": [{"a": {"$gt": 0}}]}})
        );
    }

    #[test]
    fn equality_after_operator_keeps_both() {
        assert_eq!(
            mongo("in(a,[1,2])&eq(a,3)"),
            json!({"filter": {"a": {"$in": [1, 2]}, "$and": [{"a": 3}]}})
        );
        let query = MongoQuery::new()
            .field("a")
            .gt(Value::from(1))
            .field("a")
            .equals(Value::from(2));
        assert_eq!(query.filter().get("a"), Some(&json!({"$gt": 1})));
        assert_eq!(query.filter().get("$and"), Some(&json!([{"a": 2}])));
    }

    #[test]
    fn conditions_inside_group_are_kept() {
        assert_eq!(
            mongo("or(and(gt(a,1),gt(a,5)))"),
            json!({"filter": {"$or": [
                {"$and": [{"a": {"$gt": 1}}, {"a": {"$gt": 5}}]}
            ]}})
        );
    }

    #[test]
    fn float_values() {
        assert_eq!(mongo("lt(score,0.5)"), json!({"filter": {"score": {"$lt": 0.5}}}));
    }
}
