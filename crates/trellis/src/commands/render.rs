//! Render command - compile a template and render it against data

use crate::context::{Context, read_template, read_value};
use crate::output;
use anyhow::{Result, anyhow};
use serde_json::json;
use std::path::Path;
use trellis_core::{Shape, StringRespond};

/// Render `template` against `data`
///
/// The backing shape is inferred from the data, so a template referring to a
/// property the data lacks fails to compile rather than rendering blank.
pub fn run(
    template: &Path,
    data: Option<&Path>,
    output_path: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let ctx = Context::new(config)?;

    let data = match data {
        Some(path) => read_value(path)?,
        None => json!({}),
    };

    let markup = read_template(template)?;
    let chain = ctx
        .compiler()
        .compile(&markup, &Shape::infer(&data))
        .map_err(|e| anyhow!("{}: {}", template.display(), e))?;

    // Partial output is still written before the error is reported
    let mut respond = StringRespond::new();
    let rendered = chain.render(&data, &mut respond);
    output::emit(respond.as_str(), output_path)?;
    rendered.map_err(|e| anyhow!("{}: {}", template.display(), e))
}
