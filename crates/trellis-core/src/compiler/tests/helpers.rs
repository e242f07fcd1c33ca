//! Shared test helpers for compiler tests

use super::*;
use serde_json::{json, Value};

/// Backing values used by the markup scenarios
pub(super) fn person() -> Value {
    json!({ "name": "Dhanji", "clazz": "content", "id": 12 })
}

/// Compile against the inferred shape of `data` and render it
pub(super) fn render(template: &str, data: &Value) -> String {
    render_with(&WidgetRegistry::new(), RenderConfig::default(), template, data)
}

pub(super) fn render_with(
    registry: &WidgetRegistry,
    config: RenderConfig,
    template: &str,
    data: &Value,
) -> String {
    TemplateCompiler::new(registry)
        .with_config(config)
        .compile(template, &Shape::infer(data))
        .unwrap_or_else(|e| panic!("template should compile: {}", e))
        .render_to_string(data)
        .unwrap_or_else(|e| panic!("template should render: {}", e))
}

/// Compile against an unchecked shape
pub(super) fn compile(template: &str) -> Result<Chain, TemplateCompileError> {
    TemplateCompiler::new(&WidgetRegistry::new()).compile(template, &Shape::Any)
}

pub(super) fn marker_config() -> RenderConfig {
    RenderConfig {
        on_evaluation_error: EvaluationPolicy::Marker,
    }
}
