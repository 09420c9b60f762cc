//! Value type for record fields

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Values that can be stored in record fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence marker; loading it into a field skips that field's cast
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value
    Integer(i64),

    /// Decimal value
    Decimal(f64),

    /// String value
    String(String),

    /// Date and time without timezone
    DateTime(NaiveDateTime),

    /// Elapsed time; serialized as whole seconds
    #[serde(serialize_with = "serialize_seconds")]
    Duration(TimeDelta),

    /// Ordered list of values
    List(Vec<Value>),

    /// Nested key/value data
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Text form used for predicate comparison and the `str` cast.
    ///
    /// Whole decimals keep a trailing `.0` (`1.0`, not `1`), so they never
    /// compare equal to the integer text. Durations read like `2:05:00` or
    /// `3 days, 0:00:10`. `Null`, lists and maps have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Decimal(d) if d.is_finite() && d.fract() == 0.0 => Some(format!("{d:.1}")),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::DateTime(dt) => Some(dt.to_string()),
            Value::Duration(delta) => Some(duration_text(*delta)),
            Value::List(_) | Value::Map(_) | Value::Null => None,
        }
    }

    /// Borrow the inner string, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness: null, `false`, zero and empty containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Decimal(d) => *d != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::DateTime(_) => true,
            Value::Duration(delta) => !delta.is_zero(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }

    /// Coerce to an integer.
    ///
    /// # Errors
    ///
    /// Returns a conversion error for text that does not parse, non-finite
    /// decimals and non-scalar values.
    pub fn to_integer(&self) -> crate::Result<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Duration(delta) => Ok(delta.num_seconds()),
            #[allow(clippy::cast_possible_truncation)]
            Value::Decimal(d) if d.is_finite() => Ok(d.trunc() as i64),
            Value::String(s) => s.trim().parse::<i64>().map_err(|error| {
                crate::Error::conversion("integer", format!("cannot parse '{s}': {error}"))
            }),
            other => Err(crate::Error::conversion(
                "integer",
                format!("unsupported value {other}"),
            )),
        }
    }

    /// Coerce to a decimal.
    ///
    /// # Errors
    ///
    /// Returns a conversion error for text that does not parse and non-scalar
    /// values.
    pub fn to_decimal(&self) -> crate::Result<f64> {
        match self {
            Value::Decimal(d) => Ok(*d),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(*i as f64),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().map_err(|error| {
                crate::Error::conversion("decimal", format!("cannot parse '{s}': {error}"))
            }),
            other => Err(crate::Error::conversion(
                "decimal",
                format!("unsupported value {other}"),
            )),
        }
    }
}

fn duration_text(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 | -1 => format!("{days} day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

fn serialize_seconds<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(delta.num_seconds())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (index, (key, item)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {item}")?;
                }
                f.write_str("}")
            }
            scalar => match scalar.as_text() {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<TimeDelta> for Value {
    fn from(value: TimeDelta) -> Self {
        Value::Duration(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Decimal),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, Value::from(item)))
                    .collect(),
            ),
        }
    }
}
