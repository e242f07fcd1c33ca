//! Backing shapes
//!
//! A [`Shape`] is the statically known property set of a backing object. The
//! expression compiler validates property paths and method calls against it.
//!
//! Shapes can be written as descriptors in TOML or JSON:
//!
//! ```toml
//! [shape]
//! name = "string"
//! id = "number"
//! tags = ["string"]
//! owner = { login = "string", admin = "boolean" }
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Shape {
    /// Anything; no static checks below this point
    #[default]
    Any,
    Null,
    Bool,
    Number,
    String,
    List(Box<Shape>),
    Object(BTreeMap<String, Shape>),
}

impl Shape {
    /// An object shape from `(name, shape)` pairs
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Shape)>,
        K: Into<String>,
    {
        Shape::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A list shape
    pub fn list(element: Shape) -> Self {
        Shape::List(Box::new(element))
    }

    /// Infer a shape from a sample value
    ///
    /// `null` infers as [`Shape::Any`] since a sample null says nothing about
    /// later instances. Lists with mixed element shapes infer `List(Any)`.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Any,
            Value::Bool(_) => Shape::Bool,
            Value::Number(_) => Shape::Number,
            Value::String(_) => Shape::String,
            Value::Array(items) => {
                let mut shapes = items.iter().map(Shape::infer);
                let element = match shapes.next() {
                    Some(first) if shapes.all(|s| s == first) => first,
                    _ => Shape::Any,
                };
                Shape::list(element)
            }
            Value::Object(map) => Shape::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Shape::infer(v)))
                    .collect(),
            ),
        }
    }

    /// Human-readable kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Any => "any",
            Shape::Null => "null",
            Shape::Bool => "boolean",
            Shape::Number => "number",
            Shape::String => "string",
            Shape::List(_) => "list",
            Shape::Object(_) => "object",
        }
    }

    /// Shape of property `name` on this shape
    pub fn property(&self, name: &str) -> Result<Shape, String> {
        match self {
            Shape::Any => Ok(Shape::Any),
            Shape::Object(fields) => fields
                .get(name)
                .cloned()
                .ok_or_else(|| format!("unknown property '{}'", name)),
            Shape::List(element) if name.parse::<usize>().is_ok() => Ok((**element).clone()),
            other => Err(format!(
                "cannot read property '{}' of {}",
                name,
                other.kind_name()
            )),
        }
    }

    /// Build a shape from a descriptor value
    pub fn from_descriptor(descriptor: &Value) -> Result<Self, String> {
        match descriptor {
            Value::String(kind) => match kind.to_ascii_lowercase().as_str() {
                "any" => Ok(Shape::Any),
                "null" => Ok(Shape::Null),
                "bool" | "boolean" => Ok(Shape::Bool),
                "number" | "integer" | "float" => Ok(Shape::Number),
                "string" => Ok(Shape::String),
                "list" => Ok(Shape::list(Shape::Any)),
                "object" => Ok(Shape::Object(BTreeMap::new())),
                other => Err(format!("unknown shape kind '{}'", other)),
            },
            Value::Array(items) => match items.as_slice() {
                [] => Ok(Shape::list(Shape::Any)),
                [element] => Ok(Shape::list(Shape::from_descriptor(element)?)),
                _ => Err("list shape descriptor takes exactly one element shape".to_string()),
            },
            Value::Object(fields) => fields
                .iter()
                .map(|(k, v)| Ok((k.clone(), Shape::from_descriptor(v)?)))
                .collect::<Result<BTreeMap<_, _>, String>>()
                .map(Shape::Object),
            other => Err(format!("invalid shape descriptor: {}", other)),
        }
    }

    /// Inverse of [`Shape::from_descriptor`]
    pub fn to_descriptor(&self) -> Value {
        match self {
            Shape::List(element) => Value::Array(vec![element.to_descriptor()]),
            Shape::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_descriptor()))
                    .collect(),
            ),
            scalar => Value::String(scalar.kind_name().to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let descriptor = Value::deserialize(deserializer)?;
        Shape::from_descriptor(&descriptor).map_err(de::Error::custom)
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_descriptor().serialize(serializer)
    }
}
