//! Lucene-style clause rendering shared by the search visitor and the Orchestrate queriable.

use rql::{ArrayKind, PropertyKind, Value};

/// Renders a value for an equality clause.
///
/// Values are wrapped in backticks so the service matches them literally, with embedded
/// backticks backslash-escaped. The keywords `true`, `false` and `null` and values containing
/// a `*` wildcard are left bare.
fn escape(value: &Value) -> String {
    let text = value.to_string();
    if matches!(text.as_str(), "true" | "false" | "null") || text.contains('*') {
        text
    } else {
        format!("`{}`", text.replace('`', "\\`"))
    }
}

/// Renders the upper bound of a range. Integer bounds move down by one when exclusive.
fn upper_bound(value: &Value, inclusive: bool) -> String {
    match value {
        Value::Integer(n) if !inclusive => n.saturating_sub(1).to_string(),
        other => other.to_string(),
    }
}

/// Renders the lower bound of a range. Integer bounds move up by one when exclusive.
fn lower_bound(value: &Value, inclusive: bool) -> String {
    match value {
        Value::Integer(n) if !inclusive => n.saturating_add(1).to_string(),
        other => other.to_string(),
    }
}

/// Renders a single-value clause on `field`.
pub fn property_clause(field: &str, kind: PropertyKind, value: &Value) -> String {
    match kind {
        PropertyKind::Eq => format!("{field}:{}", escape(value)),
        PropertyKind::Ne => format!("NOT {field}:{}", escape(value)),
        PropertyKind::Lt => format!("{field}:(* TO {})", upper_bound(value, false)),
        PropertyKind::Lte => format!("{field}:(* TO {})", upper_bound(value, true)),
        PropertyKind::Gt => format!("{field}:({} TO *)", lower_bound(value, false)),
        PropertyKind::Gte => format!("{field}:({} TO *)", lower_bound(value, true)),
        PropertyKind::Like => format!("{field}:{value}*"),
    }
}

/// Renders a set-membership clause on `field`.
pub fn membership_clause(field: &str, kind: ArrayKind, values: &[Value]) -> String {
    let alternatives = values.iter().map(escape).collect::<Vec<_>>().join(" OR ");
    match kind {
        ArrayKind::In => format!("{field}:({alternatives})"),
        ArrayKind::Out => format!("NOT {field}:({alternatives})"),
    }
}
