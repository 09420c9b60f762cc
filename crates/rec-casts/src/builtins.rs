//! Built-in casts and filters
//!
//! Casts coerce raw loaded values (usually text coming from command output
//! or config files) into typed values. The combinators build new casts out
//! of existing ones.

use crate::registry::{CastFn, CastRegistry, FilterRegistry};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use rec_value::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::trace;

const ISO_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Register the built-in casts
pub fn register_casts(registry: &mut CastRegistry) {
    registry
        .register("ident", cast_ident)
        .register("int", cast_int)
        .register("float", cast_float)
        .register("str", cast_str)
        .register("intbool", cast_intbool)
        .register("unixtime", cast_unixtime)
        .register("timedelta", cast_timedelta)
        .register("timestamp", cast_timestamp);
}

/// Register the built-in filters
pub fn register_filters(registry: &mut FilterRegistry) {
    registry
        .register("str", filter_str)
        .register("truthy", |value| Ok(Value::Bool(value.is_truthy())))
        .register("falsy", |value| Ok(Value::Bool(!value.is_truthy())));
}

/// Return the value unchanged
///
/// # Errors
///
/// Never fails.
pub fn cast_ident(value: &Value) -> crate::Result<Value> {
    Ok(value.clone())
}

/// Coerce to an integer
///
/// # Errors
///
/// Returns an error if the value has no integer reading.
pub fn cast_int(value: &Value) -> crate::Result<Value> {
    value
        .to_integer()
        .map(Value::Integer)
        .map_err(|error| crate::Error::cast("int", error))
}

/// Coerce to a decimal
///
/// # Errors
///
/// Returns an error if the value has no numeric reading.
pub fn cast_float(value: &Value) -> crate::Result<Value> {
    value
        .to_decimal()
        .map(Value::Decimal)
        .map_err(|error| crate::Error::cast("float", error))
}

/// Coerce to text
///
/// # Errors
///
/// Returns an error for values without a text form (null, lists, maps).
pub fn cast_str(value: &Value) -> crate::Result<Value> {
    value
        .as_text()
        .map(Value::String)
        .ok_or_else(|| crate::Error::cast("str", format!("no text form for {value}")))
}

/// Text form of any value, for display.
///
/// Values without a text form render through `Display` (`null`, `[...]`,
/// `{...}`).
///
/// # Errors
///
/// Never fails.
pub fn filter_str(value: &Value) -> crate::Result<Value> {
    Ok(Value::String(value.as_text().unwrap_or_else(|| value.to_string())))
}

/// Integer-then-boolean: `"0"` is false, any other integer is true
///
/// # Errors
///
/// Returns an error if the value has no integer reading.
pub fn cast_intbool(value: &Value) -> crate::Result<Value> {
    value
        .to_integer()
        .map(|i| Value::Bool(i != 0))
        .map_err(|error| crate::Error::cast("intbool", error))
}

/// Seconds since the Unix epoch to a UTC date and time
///
/// # Errors
///
/// Returns an error if the value is not an integer or is out of range.
pub fn cast_unixtime(value: &Value) -> crate::Result<Value> {
    let seconds = value
        .to_integer()
        .map_err(|error| crate::Error::cast("unixtime", error))?;
    DateTime::from_timestamp(seconds, 0)
        .map(|when| Value::DateTime(when.naive_utc()))
        .ok_or_else(|| crate::Error::cast("unixtime", format!("{seconds} is out of range")))
}

/// Whole seconds to a duration
///
/// # Errors
///
/// Returns an error if the value is not an integer or is out of range.
pub fn cast_timedelta(value: &Value) -> crate::Result<Value> {
    let seconds = value
        .to_integer()
        .map_err(|error| crate::Error::cast("timedelta", error))?;
    TimeDelta::try_seconds(seconds)
        .map(Value::Duration)
        .ok_or_else(|| crate::Error::cast("timedelta", format!("{seconds} is out of range")))
}

/// Parse an ISO-8601 UTC timestamp or a bare year.
///
/// Anything that matches neither pattern is returned unchanged.
///
/// # Errors
///
/// Never fails.
pub fn cast_timestamp(value: &Value) -> crate::Result<Value> {
    let Some(text) = value.as_str() else {
        return Ok(value.clone());
    };

    if let Ok(when) = NaiveDateTime::parse_from_str(text, ISO_TIMESTAMP) {
        return Ok(Value::DateTime(when));
    }

    if let Some(when) = parse_year(text) {
        return Ok(Value::DateTime(when));
    }

    trace!("Timestamp cast left value unchanged: {}", text);
    Ok(value.clone())
}

fn parse_year(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() || text.len() > 4 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = text.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Build a cast that ignores its input and returns `value`
#[must_use]
pub fn constant(value: Value) -> CastFn {
    Arc::new(move |_: &Value| -> crate::Result<Value> { Ok(value.clone()) })
}

/// Build a cast that applies `cast` to every element of a list.
///
/// A non-list input is treated as a one-element list.
#[must_use]
pub fn list_of(cast: CastFn) -> CastFn {
    Arc::new(move |value: &Value| -> crate::Result<Value> {
        let items = match value {
            Value::List(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        items
            .iter()
            .map(|item| cast(item))
            .collect::<crate::Result<Vec<Value>>>()
            .map(Value::List)
    })
}

/// Build a cast that applies `list_cast` and sorts the resulting maps by `field`.
///
/// Elements lacking the field sort first.
#[must_use]
pub fn sorted_by(list_cast: CastFn, field: impl Into<String>) -> CastFn {
    let field = field.into();
    Arc::new(move |value: &Value| -> crate::Result<Value> {
        let Value::List(mut items) = list_cast(value)? else {
            return Err(crate::Error::cast(
                "sorted_by",
                "inner cast did not produce a list",
            ));
        };
        items.sort_by(|a, b| compare_values(sort_key(a, &field), sort_key(b, &field)));
        Ok(Value::List(items))
    })
}

fn sort_key<'a>(item: &'a Value, field: &str) -> Option<&'a Value> {
    match item {
        Value::Map(entries) => entries.get(field),
        _ => None,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
            (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
            (Value::Duration(x), Value::Duration(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => match (a.to_decimal(), b.to_decimal()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.as_text().cmp(&b.as_text()),
            },
        },
    }
}
