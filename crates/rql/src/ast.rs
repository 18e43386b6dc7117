//! Query abstract syntax tree.
//!
//! A parsed query is a single [`Operation`]. The set of variants is closed: translators match on
//! it exhaustively, so adding an operator makes the compiler point at every translator that
//! still needs a case for it.

use std::fmt;

use crate::lexer::{TokenKind, classify_word, is_word_char};

/// A scalar literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A bare word or quoted literal.
    String(String),
    /// A signed integer.
    Integer(i64),
    /// A finite floating point number.
    Float(f64),
}

impl Value {
    /// Returns the string content for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Integer(_) | Self::Float(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Displays the raw value text, without any quoting.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            // Debug keeps a fraction or exponent, so the text still reads as a float.
            Self::Float(n) => write!(f, "{n:?}"),
        }
    }
}

/// Comparison applied by a property operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
    /// Less than or equal.
    Lte,
    /// Greater than or equal.
    Gte,
    /// Wildcard match, `*` standing for any run of characters.
    Like,
}

impl PropertyKind {
    /// Returns the operator keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Gte => "gte",
            Self::Like => "like",
        }
    }
}

/// Membership test applied by an array operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// The field equals one of the values.
    In,
    /// The field equals none of the values.
    Out,
}

impl ArrayKind {
    /// Returns the operator keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Connective of a boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanKind {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
}

impl BooleanKind {
    /// Returns the operator keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Sort order for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Ascending (`+field` or plain `field`).
    #[default]
    Asc,
    /// Descending (`-field`).
    Desc,
}

impl SortDirection {
    /// Returns `asc` or `desc`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Returns the RQL field marker for this direction.
    fn marker(self) -> char {
        match self {
            Self::Asc => '+',
            Self::Desc => '-',
        }
    }
}

/// A leaf comparing one field with one value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOperation {
    /// The comparison.
    pub kind: PropertyKind,
    /// Field name, never empty.
    pub field: String,
    /// Value to compare with.
    pub value: Value,
}

/// A leaf comparing one field against a set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayOperation {
    /// Inclusion or exclusion.
    pub kind: ArrayKind,
    /// Field name, never empty.
    pub field: String,
    /// Candidate values, never empty.
    pub values: Vec<Value>,
}

/// An AND/OR group.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanOperation {
    /// The connective.
    pub kind: BooleanKind,
    /// Filter operations combined by the connective, never empty.
    pub children: Vec<Operation>,
}

/// One field of a sort modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Field name.
    pub field: String,
    /// Sort order.
    pub direction: SortDirection,
}

impl SortField {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sort modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOperation {
    /// Fields in priority order.
    pub fields: Vec<SortField>,
}

/// Pagination modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOperation {
    /// Maximum number of results.
    pub limit: u64,
    /// Number of results to skip.
    pub skip: u64,
}

/// A parsed query node.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// The empty query: matches everything.
    MatchAll,
    /// `eq`, `ne`, `lt`, `gt`, `lte`, `gte` or `like`.
    Property(PropertyOperation),
    /// `in` or `out`.
    Array(ArrayOperation),
    /// `and` or `or`.
    Boolean(BooleanOperation),
    /// `sort`.
    Sort(SortOperation),
    /// `limit`.
    Limit(LimitOperation),
    /// Top-level operations joined by `&`, implicitly AND-combined.
    Query(Vec<Operation>),
}

impl Operation {
    /// Creates a property operation.
    pub fn property(kind: PropertyKind, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Property(PropertyOperation {
            kind,
            field: field.into(),
            value: value.into(),
        })
    }

    /// Creates an `eq` operation.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::property(PropertyKind::Eq, field, value)
    }

    /// Creates a `ne` operation.
    pub fn not_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::property(PropertyKind::Ne, field, value)
    }

    /// Creates a `like` operation.
    pub fn like(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::property(PropertyKind::Like, field, value)
    }

    /// Creates an array operation.
    pub fn array(kind: ArrayKind, field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::Array(ArrayOperation {
            kind,
            field: field.into(),
            values,
        })
    }

    /// Creates an `and` group.
    pub fn and(children: Vec<Self>) -> Self {
        Self::Boolean(BooleanOperation {
            kind: BooleanKind::And,
            children,
        })
    }

    /// Creates an `or` group.
    pub fn or(children: Vec<Self>) -> Self {
        Self::Boolean(BooleanOperation {
            kind: BooleanKind::Or,
            children,
        })
    }

    /// Creates a sort modifier.
    pub fn sort(fields: Vec<SortField>) -> Self {
        Self::Sort(SortOperation { fields })
    }

    /// Creates a pagination modifier.
    pub fn limit(limit: u64, skip: u64) -> Self {
        Self::Limit(LimitOperation { limit, skip })
    }

    /// Returns true for the empty-query sentinel.
    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::MatchAll)
    }

    /// Returns true for property operations.
    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property(_))
    }

    /// Returns true for array operations.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns true for boolean-combining operations.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    /// Returns true for sort and pagination modifiers.
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Sort(_) | Self::Limit(_))
    }

    /// Returns true for operations that filter documents.
    pub fn is_filter(&self) -> bool {
        self.is_property() || self.is_array() || self.is_boolean()
    }

    /// Returns the property operation, if this is one.
    pub fn as_property(&self) -> Option<&PropertyOperation> {
        match self {
            Self::Property(op) => Some(op),
            _ => None,
        }
    }

    /// Returns the array operation, if this is one.
    pub fn as_array(&self) -> Option<&ArrayOperation> {
        match self {
            Self::Array(op) => Some(op),
            _ => None,
        }
    }

    /// Returns the boolean operation, if this is one.
    pub fn as_boolean(&self) -> Option<&BooleanOperation> {
        match self {
            Self::Boolean(op) => Some(op),
            _ => None,
        }
    }

    /// Returns the sort modifier, if this is one.
    pub fn as_sort(&self) -> Option<&SortOperation> {
        match self {
            Self::Sort(op) => Some(op),
            _ => None,
        }
    }

    /// Returns the pagination modifier, if this is one.
    pub fn as_limit(&self) -> Option<&LimitOperation> {
        match self {
            Self::Limit(op) => Some(op),
            _ => None,
        }
    }

    /// Returns the operator keyword, or `None` for `MatchAll` and `Query`.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Property(op) => Some(op.kind.as_str()),
            Self::Array(op) => Some(op.kind.as_str()),
            Self::Boolean(op) => Some(op.kind.as_str()),
            Self::Sort(_) => Some("sort"),
            Self::Limit(_) => Some("limit"),
            Self::MatchAll | Self::Query(_) => None,
        }
    }
}

/// Writes a word, quoting it when it would not lex back as the same identifier.
fn write_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    let bare = !word.is_empty()
        && word.chars().all(is_word_char)
        && classify_word(word) == TokenKind::Identifier;
    if bare {
        f.write_str(word)
    } else if word.contains('"') {
        write!(f, "'{word}'")
    } else {
        write!(f, "\"{word}\"")
    }
}

/// Writes a scalar as RQL text.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write_word(f, s),
        Value::Integer(_) | Value::Float(_) => write!(f, "{value}"),
    }
}

/// Renders the operation as canonical RQL text that parses back to the same tree.
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchAll => Ok(()),
            Self::Property(op) => {
                write!(f, "{}(", op.kind.as_str())?;
                write_word(f, &op.field)?;
                f.write_str(",")?;
                write_value(f, &op.value)?;
                f.write_str(")")
            }
            Self::Array(op) => {
                write!(f, "{}(", op.kind.as_str())?;
                write_word(f, &op.field)?;
                f.write_str(",[")?;
                for (idx, value) in op.values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write_value(f, value)?;
                }
                f.write_str("])")
            }
            Self::Boolean(op) => {
                write!(f, "{}(", op.kind.as_str())?;
                for (idx, child) in op.children.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            Self::Sort(op) => {
                f.write_str("sort(")?;
                for (idx, field) in op.fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write_word(f, &format!("{}{}", field.direction.marker(), field.field))?;
                }
                f.write_str(")")
            }
            Self::Limit(op) => write!(f, "limit({},{})", op.limit, op.skip),
            Self::Query(ops) => {
                for (idx, op) in ops.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("&")?;
                    }
                    write!(f, "{op}")?;
                }
                Ok(())
            }
        }
    }
}
