//! Expression compiler and evaluator
//!
//! Expressions are compiled once against a known backing [`Shape`] and then
//! evaluated cheaply on every render. A [`CompiledExpression`] is a pure
//! function of the instance it is given.
//!
//! ## Syntax
//!
//! - Literals: `true`, `false`, `null`, `12`, `9.5`, `'text'`, `"text"`
//! - Paths: `name`, `owner.login`, `items.0`
//! - Methods: `name.toUpperCase()`, `tags.contains('rust')`
//! - Operators: `! - * / % + < <= > >= == != && || ?:`, `instanceof`
//! - Statements: `a; return b` yields `b`

mod ast;
mod check;
pub mod error;
mod eval;
mod lexer;
mod methods;
mod parser;
pub mod resolver;
pub mod shape;
pub mod value;

pub use error::{EvaluationError, ExpressionCompileError};
pub use resolver::{toml_to_json, PropertyNotFound, PropertyResolver, Scope};
pub use shape::Shape;
pub use value::to_text;

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use ast::Expr;
use check::ShapeEnv;

/// A validated, reusable expression bound to a backing shape
pub struct CompiledExpression {
    source: String,
    expr: Expr,
    result_shape: Shape,
}

impl CompiledExpression {
    /// The expression text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Statically inferred shape of the result
    pub fn result_shape(&self) -> &Shape {
        &self.result_shape
    }

    pub fn evaluate(&self, data: &dyn PropertyResolver) -> Result<Value, EvaluationError> {
        eval::evaluate(&self.expr, data)
    }

    /// Evaluate and require a boolean result
    pub fn evaluate_bool(&self, data: &dyn PropertyResolver) -> Result<bool, EvaluationError> {
        value::as_bool(&self.evaluate(data)?)
    }

    /// Evaluate and format the result as text (`null` is empty)
    pub fn evaluate_text(&self, data: &dyn PropertyResolver) -> Result<String, EvaluationError> {
        self.evaluate(data).map(|v| to_text(&v))
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("source", &self.source)
            .field("result_shape", &self.result_shape)
            .finish()
    }
}

/// Compiles expression text against a backing shape
///
/// Compiled expressions are cached by source text. The cache tolerates
/// concurrent readers; inserts are serialised.
pub struct ExpressionCompiler {
    shape: Shape,
    bindings: BTreeMap<String, Shape>,
    cache: RwLock<HashMap<String, Arc<CompiledExpression>>>,
}

impl ExpressionCompiler {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            bindings: BTreeMap::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The backing shape expressions are checked against
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// A compiler that additionally sees `name` with the given shape
    ///
    /// The derived compiler starts with an empty cache, since the same text
    /// can mean something different once `name` is bound.
    pub fn with_binding(&self, name: impl Into<String>, shape: Shape) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.insert(name.into(), shape);
        Self {
            shape: self.shape.clone(),
            bindings,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn compile(&self, source: &str) -> Result<Arc<CompiledExpression>, ExpressionCompileError> {
        let key = source.trim();

        let cached = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned();
        if let Some(compiled) = cached {
            return Ok(compiled);
        }

        let expr = parser::parse(key)?;
        let env = ShapeEnv {
            root: &self.shape,
            bindings: &self.bindings,
            source: key,
        };
        let result_shape = env.check(&expr)?;

        let compiled = Arc::new(CompiledExpression {
            source: key.to_string(),
            expr,
            result_shape,
        });
        tracing::debug!(expression = key, "compiled expression");

        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(cache.entry(key.to_string()).or_insert(compiled)))
    }

    /// Number of distinct expressions compiled so far
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl fmt::Debug for ExpressionCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionCompiler")
            .field("shape", &self.shape)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
