//! Integration tests for rql-backend.
//!
//! Runs the same queries through every backend with settings loaded from TOML.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use rql::parse;
use rql_backend::{
    DocumentVisitor, MongoQuery, OrchestrateQueriable, Queriable, SearchVisitor, TranslateError,
    apply, to_search_query,
};
use rql_config::{Config, SearchSettings};
use serde_json::json;

/// Settings with a document alias and non-default search paging.
fn config() -> Config {
    Config::from_toml_str(
        r#"
[search]
default_limit = 20
default_sort = "key:desc"

[search.aliases]
id = "key"
created = "value.created"

[document.aliases]
id = "_id"
"#,
    )
    .unwrap()
}

#[test]
fn one_query_three_backends() {
    let config = config();
    let op = parse("or(eq(id,x),and(gte(created,2020),out(tag,[old])))&sort(-created)&limit(5)")
        .unwrap();

    let search = SearchVisitor::new(&config.search).translate(&op).unwrap();
    assert_eq!(
        search.query,
        "(key:`x` OR (value.created:(2020 TO *) AND NOT tag:(`old`)))"
    );
    assert_eq!(search.sort, "value.created:desc");
    assert_eq!(search.limit, 5);
    assert_eq!(search.offset, 0);

    let mongo = DocumentVisitor::new(&config.document)
        .build(&op, MongoQuery::new())
        .unwrap();
    assert_eq!(
        mongo.to_json(),
        json!({
            "filter": {"$or": [
                {"_id": "x"},
                {"$and": [{"created": {"$gte": 2020}}, {"tag": {"$nin": ["old"]}}]}
            ]},
            "sort": [["created", -1]],
            "limit": 5,
            "skip": 0
        })
    );

    let queriable = OrchestrateQueriable::new("events", &config.search).unwrap();
    let (operation, _) = apply(&op, queriable).unwrap().execute();
    assert_eq!(operation.collection, "events");
    assert_eq!(
        operation.search.query,
        "key:`x` AND value.created:(2020 TO *) AND NOT tag:(`old`)"
    );
    assert_eq!(operation.search.sort, "value.created:desc");
    assert_eq!(operation.search.limit, 5);
}

#[test]
fn configured_defaults_apply_to_search() {
    let config = config();
    let search = to_search_query("eq(name,bob)", &config.search).unwrap();
    assert_eq!(search.limit, 20);
    assert_eq!(search.sort, "key:desc");
}

#[test]
fn worked_examples() {
    let settings = SearchSettings::default();
    let cases = [
        ("", "*"),
        ("eq(id,abc)", "key:`abc`"),
        ("in(id,[a,b])", "key:(`a` OR `b`)"),
        ("out(id,[a,b])", "NOT key:(`a` OR `b`)"),
        (
            "or(eq(id,x),and(eq(gender,male),like(name,Jo)))",
            "(key:`x` OR (gender:`male` AND name:Jo*))",
        ),
        ("lt(field,5)", "field:(* TO 4)"),
        ("lte(field,5)", "field:(* TO 5)"),
        ("eq(flag,false)", "flag:false"),
        ("eq(name,Jo*)", "name:Jo*"),
    ];
    for (input, expected) in cases {
        let search = to_search_query(input, &settings).unwrap();
        assert_eq!(search.query, expected, "query {input:?}");
    }
}

#[test]
fn parse_errors_surface_with_position() {
    let err = to_search_query("eq(id,x", &SearchSettings::default()).unwrap_err();
    let TranslateError::Query(query) = err else {
        panic!("expected a query error, got {err:?}");
    };
    assert_eq!(query.position(), 7);
}

#[test]
fn queriable_is_reusable_after_execute() {
    let settings = SearchSettings::default();
    let queriable = OrchestrateQueriable::new("people", &settings).unwrap();

    let first = parse("eq(name,ann)").unwrap();
    let (one, queriable) = apply(&first, queriable).unwrap().execute();
    let second = parse("eq(name,bob)&limit(1)").unwrap();
    let (two, _) = apply(&second, queriable).unwrap().execute();

    assert_eq!(one.search.query, "name:`ann`");
    assert_eq!(two.search.query, "name:`bob`");
    assert_eq!(two.search.limit, 1);
}
