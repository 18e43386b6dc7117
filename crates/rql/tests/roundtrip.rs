//! Integration tests for rql.
//!
//! Checks that canonical rendering and parsing agree across the whole grammar.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use rql::{ArrayKind, Operation, PropertyKind, SortField, parse};

/// Asserts that rendering `op` and parsing it back yields `op` again.
fn assert_round_trip(op: &Operation) {
    let text = op.to_string();
    let reparsed = parse(&text).unwrap_or_else(|err| panic!("{}", err.render(&text)));
    assert_eq!(&reparsed, op, "round trip through {text:?}");
}

#[test]
fn round_trip_every_operator() {
    let ops = [
        Operation::MatchAll,
        Operation::equals("id", "abc"),
        Operation::not_equal("status", "deleted"),
        Operation::property(PropertyKind::Lt, "age", 5),
        Operation::property(PropertyKind::Gt, "age", -5),
        Operation::property(PropertyKind::Lte, "price", 9.99),
        Operation::property(PropertyKind::Gte, "price", 1.0),
        Operation::like("name", "Jo*"),
        Operation::array(ArrayKind::In, "id", vec!["a".into(), "b".into()]),
        Operation::array(ArrayKind::Out, "n", vec![1.into(), 2.5.into()]),
        Operation::sort(vec![SortField::asc("name"), SortField::desc("age")]),
        Operation::limit(10, 0),
        Operation::limit(10, 30),
    ];

    for op in &ops {
        assert_round_trip(op);
    }
}

#[test]
fn round_trip_awkward_words() {
    let ops = [
        Operation::equals("name", "Resource name"),
        Operation::equals("code", "007"),
        Operation::equals("word", "AND"),
        Operation::equals("limit", "sort"),
        Operation::equals("empty", ""),
        Operation::equals("quote", "say \"hi\""),
        Operation::sort(vec![SortField::desc("created at")]),
    ];

    for op in &ops {
        assert_round_trip(op);
    }
}

#[test]
fn round_trip_nested_query() {
    let op = Operation::Query(vec![
        Operation::or(vec![
            Operation::equals("id", "x"),
            Operation::and(vec![
                Operation::equals("gender", "male"),
                Operation::or(vec![
                    Operation::like("name", "Jo"),
                    Operation::array(ArrayKind::In, "tag", vec!["a".into()]),
                ]),
            ]),
        ]),
        Operation::sort(vec![SortField::asc("id")]),
        Operation::limit(5, 5),
    ]);
    assert_round_trip(&op);
}

#[test]
fn parse_then_render_is_canonical() {
    let op = parse("OR( eq(id, x) , AND(eq(a,1), LIKE(b,c)) ) & SORT(name) & LIMIT(7)").unwrap();
    assert_eq!(
        op.to_string(),
        "or(eq(id,x),and(eq(a,1),like(b,c)))&sort(+name)&limit(7,0)"
    );
}

#[test]
fn syntax_error_render_points_at_token() {
    let input = "and(eq(a,b),bogus(c,d))";
    let err = parse(input).unwrap_err();
    let rendered = err.render(input);
    assert!(rendered.contains("unknown operator 'bogus'"));
    assert!(rendered.contains(&format!("  {}^", " ".repeat(12))));
    assert!(rendered.contains("hint: Valid operators"));
}
