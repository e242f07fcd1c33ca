//! Directives command - list registered directive keys

use crate::context::Context;
use crate::output;
use anyhow::Result;
use colored::Colorize;
use serde_json::{Map, Value, json};
use std::path::Path;
use trellis_core::WidgetKind;

pub fn run(json: bool, config: Option<&Path>) -> Result<()> {
    let ctx = Context::new(config)?;
    let entries = ctx.registry.entries();

    if json {
        let map: Map<String, Value> = entries
            .iter()
            .map(|(key, kind)| (key.clone(), json!(kind.to_string())))
            .collect();
        return output::print_json(&Value::Object(map));
    }

    for (key, kind) in &entries {
        let label = match kind {
            WidgetKind::Embed { .. } => kind.to_string().cyan(),
            _ => kind.to_string().normal(),
        };
        println!("  @{:<16} {} {}", key, "→".dimmed(), label);
    }
    Ok(())
}
