use crate::error::{Result, TrellisError};
use crate::registry::WidgetRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Conventional name of the configuration file
pub const CONFIG_FILE_NAME: &str = "trellis.toml";

/// trellis.toml schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    /// Directive aliases: alias key -> builtin key or embed name
    #[serde(default)]
    pub directives: BTreeMap<String, String>,
    /// Embed name -> template path, relative to the config file
    #[serde(default)]
    pub embeds: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub on_evaluation_error: EvaluationPolicy,
}

/// What a widget does when its expression fails at render time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationPolicy {
    /// Render nothing (conditions count as false) and log a warning
    #[default]
    Suppress,
    /// Emit an inline `<!--eval-error: ...-->` comment
    Marker,
}

impl Config {
    /// Read trellis.toml
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TrellisError::ConfigParseError(e.to_string()))
    }

    /// Declare the configured embeds and aliases on `registry`
    ///
    /// Embeds are declared first so aliases may point at them.
    pub fn configure(&self, registry: &WidgetRegistry) -> Result<()> {
        for name in self.embeds.keys() {
            registry.add_embed(name)?;
        }
        for (alias, target) in &self.directives {
            registry
                .alias(alias, target)
                .map_err(|e| TrellisError::ConfigInvalidValue {
                    field: format!("directives.{}", alias),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WidgetKind;

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.render.on_evaluation_error,
            EvaluationPolicy::Suppress
        );
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[render]
on_evaluation_error = "marker"

[directives]
when = "showif"
fave = "myfave"

[embeds]
myfave = "embeds/fave.html"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.render.on_evaluation_error, EvaluationPolicy::Marker);
        assert_eq!(config.directives["when"], "showif");
        assert_eq!(
            config.embeds["myfave"],
            PathBuf::from("embeds/fave.html")
        );
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let err = Config::parse("[render]\non_evaluation_error = \"loud\"").unwrap_err();
        assert!(err.to_string().starts_with("CONFIG_PARSE_ERROR:"), "{}", err);
    }

    #[test]
    fn test_configure_registers_embeds_then_aliases() {
        let config = Config::parse(
            r#"
[directives]
when = "ShowIf"
fave = "myfave"

[embeds]
myfave = "fave.html"
"#,
        )
        .unwrap();
        let registry = WidgetRegistry::new();
        config.configure(&registry).unwrap();

        assert_eq!(registry.resolve("when"), Ok(WidgetKind::Conditional));
        assert_eq!(
            registry.resolve("fave"),
            Ok(WidgetKind::Embed {
                name: "myfave".to_string()
            })
        );
        assert_eq!(registry.pending_embeds(), vec!["myfave".to_string()]);
    }

    #[test]
    fn test_configure_rejects_alias_to_unknown_key() {
        let config = Config::parse("[directives]\nwhen = \"sometimes\"").unwrap();
        let err = config.configure(&WidgetRegistry::new()).unwrap_err();
        assert!(
            err.to_string().starts_with("CONFIG_INVALID_VALUE: directives.when"),
            "{}",
            err
        );
    }
}
