//! Check command - compile a template and report the first error

use crate::context::{Context, read_template, read_value};
use anyhow::{Result, anyhow};
use colored::Colorize;
use std::path::Path;
use trellis_core::Shape;

pub fn run(template: &Path, shape: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let ctx = Context::new(config)?;

    let shape = match shape {
        Some(path) => {
            let descriptor = read_value(path)?;
            Shape::from_descriptor(&descriptor)
                .map_err(|e| anyhow!("{}: invalid shape: {}", path.display(), e))?
        }
        None => Shape::Any,
    };

    let markup = read_template(template)?;
    let chain = ctx
        .compiler()
        .compile(&markup, &shape)
        .map_err(|e| anyhow!("{}: {}", template.display(), e))?;

    println!(
        "{} {} ({} widgets)",
        "✓".green(),
        template.display(),
        chain.widgets().len()
    );
    Ok(())
}
