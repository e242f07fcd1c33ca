//! Global context for CLI commands

use anyhow::{Context as _, Result, anyhow};
use std::path::{Path, PathBuf};
use trellis_core::expr::toml_to_json;
use trellis_core::{CONFIG_FILE_NAME, Config, Shape, TemplateCompiler, WidgetRegistry};

/// Loaded configuration and a registry with every configured embed bound
pub struct Context {
    pub config: Config,
    pub registry: WidgetRegistry,
    /// Directory embed paths are resolved against
    pub root: PathBuf,
}

impl Context {
    /// Load the config and compile its embeds
    ///
    /// Without an explicit path, `./trellis.toml` is used when it exists and
    /// the defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - A directive alias names an unknown target
    /// - An embed template cannot be read or compiled
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config, root) = match config_path {
            Some(path) => (Config::from_file(path)?, parent_dir(path)),
            None => {
                let default = PathBuf::from(CONFIG_FILE_NAME);
                if default.is_file() {
                    (Config::from_file(&default)?, PathBuf::from("."))
                } else {
                    (Config::default(), PathBuf::from("."))
                }
            }
        };

        let registry = WidgetRegistry::new();
        config.configure(&registry)?;

        let ctx = Self {
            config,
            registry,
            root,
        };
        ctx.bind_embeds()?;
        Ok(ctx)
    }

    pub fn compiler(&self) -> TemplateCompiler<'_> {
        TemplateCompiler::new(&self.registry).with_config(self.config.render)
    }

    // All embeds are declared before any is compiled, so embeds may use each other.
    fn bind_embeds(&self) -> Result<()> {
        let compiler = self.compiler();
        for (name, relative) in &self.config.embeds {
            let path = self.root.join(relative);
            let markup = read_template(&path)?;
            let chain = compiler
                .compile(&markup, &Shape::Any)
                .map_err(|e| anyhow!("{}: {}", path.display(), e))?;
            self.registry.bind_embed(name, chain)?;
            tracing::debug!(embed = %name, path = %path.display(), "bound embed");
        }
        Ok(())
    }
}

pub fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read a `.json` or `.toml` file into a JSON value
pub fn read_value(path: &Path) -> Result<serde_json::Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            let value: toml::Value = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(toml_to_json(&value))
        }
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display())),
        _ => Err(anyhow!(
            "Unsupported data file '{}': expected .json or .toml",
            path.display()
        )),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
