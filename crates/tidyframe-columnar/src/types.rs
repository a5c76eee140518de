use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Declared element type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Logical,
    Integer,
    Double,
    Text,
    /// Arbitrary nested values, one per row.
    List,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Logical => "logical",
            ColumnType::Integer => "integer",
            ColumnType::Double => "double",
            ColumnType::Text => "text",
            ColumnType::List => "list",
        }
    }

    /// Whether rows of this type can be compared, sorted and used as grouping keys.
    pub fn is_ordered(self) -> bool {
        !matches!(self, ColumnType::List)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::Logical | ColumnType::Integer | ColumnType::Double
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single element read out of a column.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Logical(bool),
    Integer(i64),
    Double(f64),
    Text(Arc<str>),
    List(Arc<Vec<Value>>),
}

impl Value {
    /// The element type this value belongs to; `None` for [`Value::Null`], which fits any type.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Logical(_) => Some(ColumnType::Logical),
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Double(_) => Some(ColumnType::Double),
            Value::Text(_) => Some(ColumnType::Text),
            Value::List(_) => Some(ColumnType::List),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Logical(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn list(values: Vec<Value>) -> Self {
        Value::List(Arc::new(values))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NA"),
            Value::Logical(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Logical(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Hashable, totally ordered projection of a scalar value, used for grouping.
///
/// Nulls order after every other key, and NaN orders after every other double.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Logical(bool),
    Integer(i64),
    Double(OrderedFloat<f64>),
    Text(Arc<str>),
    Null,
}

impl From<KeyPart> for Value {
    fn from(key: KeyPart) -> Self {
        match key {
            KeyPart::Logical(b) => Value::Logical(b),
            KeyPart::Integer(i) => Value::Integer(i),
            KeyPart::Double(d) => Value::Double(d.into_inner()),
            KeyPart::Text(s) => Value::Text(s),
            KeyPart::Null => Value::Null,
        }
    }
}
