//! Shared test helpers for expression tests

use super::*;
use serde_json::json;

/// Backing instance used across expression tests
pub(super) fn person() -> Value {
    json!({
        "name": "Dhanji",
        "clazz": "content",
        "id": 12,
        "score": 9.5,
        "admin": false,
        "nickname": null,
        "tags": ["rust", "web"],
        "owner": { "login": "dhanji", "repos": 3 }
    })
}

/// Compile against the inferred shape of [`person`] and evaluate
pub(super) fn eval(source: &str) -> Result<Value, EvaluationError> {
    let compiler = ExpressionCompiler::new(Shape::infer(&person()));
    compiler
        .compile(source)
        .unwrap_or_else(|e| panic!("'{}' should compile: {}", source, e))
        .evaluate(&person())
}

/// Compile against the inferred shape of [`person`]
pub(super) fn compile(source: &str) -> Result<Arc<CompiledExpression>, ExpressionCompileError> {
    ExpressionCompiler::new(Shape::infer(&person())).compile(source)
}
