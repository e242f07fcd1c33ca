//! Property lookup on backing objects
//!
//! The evaluator reads data only through [`PropertyResolver`]. Host types can
//! implement it directly, or be turned into a `serde_json::Value` with
//! `serde_json::to_value` and rendered as JSON.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// A property path could not be read from a backing instance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("PROPERTY_NOT_FOUND: '{path}'")]
pub struct PropertyNotFound {
    pub path: String,
}

impl PropertyNotFound {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Read named properties off a backing object
pub trait PropertyResolver {
    /// Look up one top-level property
    fn property(&self, name: &str) -> Option<Value>;

    /// Resolve a dotted path such as `owner.login` or `items.0`
    ///
    /// A `null` leaf resolves to `Value::Null`; a `null` in the middle of
    /// the path is reported as not found.
    fn resolve(&self, path: &str) -> Result<Value, PropertyNotFound> {
        let mut segments = path.split('.');
        let root = segments.next().unwrap_or_default();
        let mut current = self
            .property(root)
            .ok_or_else(|| PropertyNotFound::new(path))?;

        for segment in segments {
            current = child(&current, segment).ok_or_else(|| PropertyNotFound::new(path))?;
        }
        Ok(current)
    }
}

/// Read one segment below an already resolved value
pub(crate) fn child(value: &Value, segment: &str) -> Option<Value> {
    match value {
        Value::Object(map) => map.get(segment).cloned(),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index).cloned()),
        _ => None,
    }
}

impl PropertyResolver for Value {
    fn property(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.get(name).cloned(),
            _ => None,
        }
    }
}

impl PropertyResolver for Map<String, Value> {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl PropertyResolver for BTreeMap<String, Value> {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl PropertyResolver for toml::Value {
    fn property(&self, name: &str) -> Option<Value> {
        match self {
            toml::Value::Table(table) => table.get(name).map(toml_to_json),
            _ => None,
        }
    }
}

impl<T: PropertyResolver + ?Sized> PropertyResolver for &T {
    fn property(&self, name: &str) -> Option<Value> {
        (**self).property(name)
    }
}

/// Convert TOML data into the runtime value model
///
/// Datetimes become their string form.
pub fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}

/// A derived view: named bindings layered over a parent backing object
///
/// Used for embed parameters and repeat variables. Bindings shadow parent
/// properties of the same name; the parent is never mutated.
pub struct Scope<'a> {
    bindings: BTreeMap<String, Value>,
    parent: &'a dyn PropertyResolver,
}

impl<'a> Scope<'a> {
    pub fn new(parent: &'a dyn PropertyResolver) -> Self {
        Self {
            bindings: BTreeMap::new(),
            parent,
        }
    }

    /// Add or replace a binding
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bind(name, value);
        self
    }
}

impl PropertyResolver for Scope<'_> {
    fn property(&self, name: &str) -> Option<Value> {
        self.bindings
            .get(name)
            .cloned()
            .or_else(|| self.parent.property(name))
    }
}
