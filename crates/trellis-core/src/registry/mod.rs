//! Widget registry
//!
//! Maps directive keys to the kind of widget they build. The builtin keys
//! are always present; embeds are declared by name during setup and bound to
//! their compiled chain later, at most once.
//!
//! The registry is meant to be populated during setup and then shared by
//! reference. Its maps sit behind `RwLock`s so concurrent compiles only take
//! read locks.

use crate::widget::Chain;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use thiserror::Error;

/// The closed set of widget strategies a directive key can name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// `@ShowIf(expr)`: render the next element only when `expr` is true
    Conditional,
    /// `@Require`: emit the next element at most once per render
    Require,
    /// `@Repeat(items=.., var=.., sep=..)`: render the next element per item
    Repeat,
    /// `@Body`: inside an embed, render the caller's body
    Body,
    /// A declared embed
    Embed { name: String },
}

impl WidgetKind {
    /// Builtin kind for a builtin directive key
    pub fn builtin(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "showif" => Some(WidgetKind::Conditional),
            "require" => Some(WidgetKind::Require),
            "repeat" => Some(WidgetKind::Repeat),
            "body" => Some(WidgetKind::Body),
            _ => None,
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::Conditional => f.write_str("conditional"),
            WidgetKind::Require => f.write_str("require"),
            WidgetKind::Repeat => f.write_str("repeat"),
            WidgetKind::Body => f.write_str("body"),
            WidgetKind::Embed { name } => write!(f, "embed '{}'", name),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("UNKNOWN_DIRECTIVE: no widget is registered for '@{key}'")]
    UnknownDirective { key: String },

    #[error("UNKNOWN_EMBED: embed '{name}' was never declared")]
    UnknownEmbed { name: String },

    #[error("EMBED_ALREADY_BOUND: embed '{name}' already has a chain")]
    AlreadyBound { name: String },

    #[error("INVALID_DIRECTIVE_KEY: '{key}' must be ASCII letters and digits")]
    InvalidKey { key: String },
}

/// Where an embed is in its two-phase lifecycle
#[derive(Debug, Clone, Copy)]
pub enum EmbedState<'a> {
    /// Declared, chain not bound yet
    Pending(&'a str),
    Resolved(&'a Chain),
}

/// A declared embed and, once bound, its compiled chain
///
/// Compiled templates hold an `Arc` to the slot, so binding the chain after
/// a template was compiled is still seen by that template's next render.
pub struct EmbedSlot {
    name: String,
    chain: OnceLock<Chain>,
}

impl EmbedSlot {
    fn new(name: String) -> Self {
        Self {
            name,
            chain: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> EmbedState<'_> {
        match self.chain.get() {
            Some(chain) => EmbedState::Resolved(chain),
            None => EmbedState::Pending(&self.name),
        }
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.chain.get()
    }

    fn bind(&self, chain: Chain) -> Result<(), RegistryError> {
        self.chain.set(chain).map_err(|_| RegistryError::AlreadyBound {
            name: self.name.clone(),
        })
    }
}

// Embeds may refer to themselves, so never print the chain.
impl fmt::Debug for EmbedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedSlot")
            .field("name", &self.name)
            .field("bound", &self.chain.get().is_some())
            .finish()
    }
}

pub struct WidgetRegistry {
    kinds: RwLock<HashMap<String, WidgetKind>>,
    embeds: RwLock<HashMap<String, Arc<EmbedSlot>>>,
}

impl WidgetRegistry {
    /// A registry with the builtin directives `showif`, `require`, `repeat`
    /// and `body`
    pub fn new() -> Self {
        let kinds = ["showif", "require", "repeat", "body"]
            .into_iter()
            .filter_map(|key| WidgetKind::builtin(key).map(|kind| (key.to_string(), kind)))
            .collect();
        Self {
            kinds: RwLock::new(kinds),
            embeds: RwLock::new(HashMap::new()),
        }
    }

    /// Register `key` (case-insensitive) for a widget kind
    ///
    /// Re-registering a key replaces its kind. Embed kinds must name a
    /// declared embed.
    pub fn register(&self, key: &str, kind: WidgetKind) -> Result<(), RegistryError> {
        let key = normalize_key(key)?;
        if let WidgetKind::Embed { name } = &kind {
            if self.embed_slot(name).is_none() {
                return Err(RegistryError::UnknownEmbed { name: name.clone() });
            }
        }

        tracing::debug!(key = %key, kind = %kind, "registered directive");
        self.kinds
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, kind);
        Ok(())
    }

    /// Make `alias` resolve to whatever `target` resolves to
    pub fn alias(&self, alias: &str, target: &str) -> Result<(), RegistryError> {
        let kind = self.resolve(target)?;
        self.register(alias, kind)
    }

    /// Declare an embed named `name`, usable as `@Name` in templates
    ///
    /// Declaring an already declared embed keeps the existing slot.
    pub fn add_embed(&self, name: &str) -> Result<Arc<EmbedSlot>, RegistryError> {
        let name = normalize_key(name)?;
        let slot = {
            let mut embeds = self
                .embeds
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(
                embeds
                    .entry(name.clone())
                    .or_insert_with(|| Arc::new(EmbedSlot::new(name.clone()))),
            )
        };
        self.register(&name, WidgetKind::Embed { name: name.clone() })?;
        Ok(slot)
    }

    /// Bind the compiled chain of a declared embed
    pub fn bind_embed(&self, name: &str, chain: Chain) -> Result<(), RegistryError> {
        let slot = self
            .embed_slot(name)
            .ok_or_else(|| RegistryError::UnknownEmbed {
                name: name.to_string(),
            })?;
        slot.bind(chain)?;
        tracing::debug!(embed = slot.name(), "bound embed chain");
        Ok(())
    }

    /// Look up the slot of a declared embed
    pub fn embed_slot(&self, name: &str) -> Option<Arc<EmbedSlot>> {
        self.embeds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    /// Widget kind for a directive key, matched case-insensitively
    pub fn resolve(&self, key: &str) -> Result<WidgetKind, RegistryError> {
        let key = key.to_ascii_lowercase();
        self.kinds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
            .ok_or(RegistryError::UnknownDirective { key })
    }

    /// All registered keys with their kinds, sorted by key
    pub fn entries(&self) -> BTreeMap<String, WidgetKind> {
        self.kinds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(key, kind)| (key.clone(), kind.clone()))
            .collect()
    }

    /// Names of declared embeds that have no chain yet
    pub fn pending_embeds(&self) -> Vec<String> {
        let mut pending: Vec<String> = self
            .embeds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|slot| slot.chain().is_none())
            .map(|slot| slot.name().to_string())
            .collect();
        pending.sort();
        pending
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("kinds", &self.entries())
            .field("pending_embeds", &self.pending_embeds())
            .finish()
    }
}

fn normalize_key(key: &str) -> Result<String, RegistryError> {
    let valid = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && key.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(key.to_ascii_lowercase())
    } else {
        Err(RegistryError::InvalidKey {
            key: key.to_string(),
        })
    }
}
