//! Builtin methods callable on values

use super::error::EvaluationError;
use super::shape::Shape;
use super::value::{kind_of, to_text};
use serde_json::Value;

/// Receiver kinds a method accepts; empty means every kind
struct Signature {
    arity: usize,
    receivers: &'static [&'static str],
    returns: Shape,
}

fn signature(name: &str) -> Option<Signature> {
    let (arity, receivers, returns): (usize, &'static [&'static str], Shape) = match name {
        "length" => (0, &["string", "list"], Shape::Number),
        "size" => (0, &["string", "list", "object"], Shape::Number),
        "isEmpty" => (0, &["string", "list", "object"], Shape::Bool),
        "toUpperCase" | "toLowerCase" | "trim" => (0, &["string"], Shape::String),
        "contains" => (1, &["string", "list"], Shape::Bool),
        "startsWith" | "endsWith" => (1, &["string"], Shape::Bool),
        "toString" => (0, &[], Shape::String),
        _ => return None,
    };
    Some(Signature {
        arity,
        receivers,
        returns,
    })
}

/// Result shape of calling `name` on `receiver`, or why it cannot be called
pub(crate) fn result_shape(name: &str, receiver: &Shape, arg_count: usize) -> Result<Shape, String> {
    let sig = signature(name).ok_or_else(|| format!("unknown method '{}'", name))?;

    if sig.arity != arg_count {
        return Err(format!(
            "method '{}' takes {} argument(s), found {}",
            name, sig.arity, arg_count
        ));
    }

    let receiver_ok = matches!(receiver, Shape::Any)
        || sig.receivers.is_empty()
        || sig.receivers.contains(&receiver.kind_name());
    if !receiver_ok {
        return Err(format!(
            "method '{}' is not available on {}",
            name,
            receiver.kind_name()
        ));
    }

    Ok(sig.returns)
}

pub(crate) fn call(name: &str, receiver: &Value, args: &[Value]) -> Result<Value, EvaluationError> {
    let unsupported = || EvaluationError::UnsupportedMethod {
        method: name.to_string(),
        receiver: kind_of(receiver),
    };

    let result = match (name, receiver, args) {
        ("length", Value::String(s), []) => Value::from(s.chars().count()),
        ("length" | "size", Value::Array(items), []) => Value::from(items.len()),
        ("size", Value::String(s), []) => Value::from(s.chars().count()),
        ("size", Value::Object(map), []) => Value::from(map.len()),
        ("isEmpty", Value::String(s), []) => Value::Bool(s.is_empty()),
        ("isEmpty", Value::Array(items), []) => Value::Bool(items.is_empty()),
        ("isEmpty", Value::Object(map), []) => Value::Bool(map.is_empty()),
        ("toUpperCase", Value::String(s), []) => Value::String(s.to_uppercase()),
        ("toLowerCase", Value::String(s), []) => Value::String(s.to_lowercase()),
        ("trim", Value::String(s), []) => Value::String(s.trim().to_string()),
        ("contains", Value::String(s), [needle]) => Value::Bool(s.contains(&to_text(needle))),
        ("contains", Value::Array(items), [needle]) => {
            Value::Bool(items.iter().any(|item| super::value::loose_eq(item, needle)))
        }
        ("startsWith", Value::String(s), [prefix]) => Value::Bool(s.starts_with(&to_text(prefix))),
        ("endsWith", Value::String(s), [suffix]) => Value::Bool(s.ends_with(&to_text(suffix))),
        ("toString", value, []) => Value::String(to_text(value)),
        _ => return Err(unsupported()),
    };
    Ok(result)
}
