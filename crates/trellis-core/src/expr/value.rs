//! Runtime value helpers

use serde_json::{Number, Value};
use std::cmp::Ordering;

use super::error::EvaluationError;

/// Largest magnitude printed as an integer when a float has no fraction
const INTEGRAL_PRINT_LIMIT: f64 = 1e15;

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Text form of a value for interpolation
///
/// `null` is empty text, strings are written raw, compound values as JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < INTEGRAL_PRINT_LIMIT => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

pub(crate) fn as_bool(value: &Value) -> Result<bool, EvaluationError> {
    value.as_bool().ok_or(EvaluationError::TypeMismatch {
        expected: "boolean",
        found: kind_of(value),
    })
}

pub(crate) fn as_number(value: &Value) -> Result<&Number, EvaluationError> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(EvaluationError::TypeMismatch {
            expected: "number",
            found: kind_of(other),
        }),
    }
}

/// Equality with numbers compared by value (`12 == 12.0`)
pub(crate) fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => left == right,
    }
}

/// Ordering for `<`-style comparisons: numbers or strings only
pub(crate) fn compare(left: &Value, right: &Value) -> Result<Ordering, EvaluationError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                return Ok(x.cmp(&y));
            }
            let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).ok_or(EvaluationError::NonFiniteNumber)
        }
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (a, b) => {
            let offending = if matches!(a, Value::Number(_) | Value::String(_)) {
                b
            } else {
                a
            };
            Err(EvaluationError::TypeMismatch {
                expected: "two numbers or two strings",
                found: kind_of(offending),
            })
        }
    }
}

/// Wrap an `f64` result, rejecting NaN and infinities
pub(crate) fn float_value(f: f64) -> Result<Value, EvaluationError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(EvaluationError::NonFiniteNumber)
}
