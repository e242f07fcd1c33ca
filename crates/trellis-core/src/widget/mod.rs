//! Compiled widgets and the render runtime
//!
//! A [`Chain`] is immutable once compiled and can be rendered concurrently
//! from many threads. Everything mutable during a render (the set of emitted
//! `@Require` resources, embed depth) lives in a per-call [`RenderPass`].
//!
//! Evaluation failures are handled at the widget that hit them, according to
//! the chain's [`EvaluationPolicy`], and never abort sibling widgets. Only an
//! unresolved embed or a sink defect ends a render early; output written up
//! to that point stays in the sink.

use crate::compiler::REPEAT_INDEX_VAR;
use crate::config::EvaluationPolicy;
use crate::expr::{value::kind_of, CompiledExpression, EvaluationError, PropertyResolver, Scope};
use crate::registry::EmbedSlot;
use crate::respond::{Respond, RetractError, StringRespond};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Deepest allowed nesting of embeds within one render
pub const MAX_EMBED_DEPTH: usize = 64;

/// Failures that end a render call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("UNRESOLVED_EMBED: embed '{name}' has no chain bound")]
    UnresolvedEmbed { name: String },

    #[error("EMBED_DEPTH_EXCEEDED: embed '{name}' nested deeper than {limit} levels")]
    EmbedDepthExceeded { name: String, limit: usize },

    #[error(transparent)]
    Retract(#[from] RetractError),
}

/// A renderable node
#[derive(Debug)]
pub enum Widget {
    /// Fixed markup
    Text(String),
    /// `${expr}`
    Interpolation(Arc<CompiledExpression>),
    Conditional {
        condition: Arc<CompiledExpression>,
        body: Chain,
    },
    /// Emitted once per render, keyed by its rendered text
    Require { resource: Chain },
    Repeat(Repeat),
    Embed(Embed),
    /// The caller's embed body, or `fallback` when there is none
    Body { fallback: Chain },
}

#[derive(Debug)]
pub struct Repeat {
    pub items: Arc<CompiledExpression>,
    /// Name the current item is bound to
    pub var: String,
    /// Written after every item; the last one is retracted
    pub separator: Option<char>,
    pub body: Chain,
}

#[derive(Debug)]
pub struct Embed {
    pub slot: Arc<EmbedSlot>,
    /// Parameters evaluated against the caller's data
    pub bindings: Vec<(String, Arc<CompiledExpression>)>,
    /// The element the directive was attached to
    pub body: Chain,
}

/// A compiled sequence of widgets
///
/// An empty document compiles to [`Chain::Terminal`], which renders nothing.
#[derive(Debug, Default)]
pub enum Chain {
    #[default]
    Terminal,
    Proceeding {
        widgets: Vec<Widget>,
        policy: EvaluationPolicy,
    },
}

/// State scoped to a single top-level render call
#[derive(Debug, Default)]
pub(crate) struct RenderPass {
    required: HashSet<String>,
    embed_depth: usize,
}

/// What widgets see while rendering: the data and the caller's embed body
#[derive(Clone, Copy)]
pub(crate) struct Frame<'a> {
    data: &'a dyn PropertyResolver,
    body: Option<(&'a Chain, &'a Frame<'a>)>,
}

impl Chain {
    /// Build a chain, merging adjacent text widgets
    pub fn new(widgets: Vec<Widget>, policy: EvaluationPolicy) -> Self {
        let mut merged: Vec<Widget> = Vec::with_capacity(widgets.len());
        for widget in widgets {
            if let Widget::Text(text) = &widget {
                if text.is_empty() {
                    continue;
                }
                if let Some(Widget::Text(previous)) = merged.last_mut() {
                    previous.push_str(text);
                    continue;
                }
            }
            merged.push(widget);
        }

        if merged.is_empty() {
            Chain::Terminal
        } else {
            Chain::Proceeding {
                widgets: merged,
                policy,
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Chain::Terminal)
    }

    pub fn widgets(&self) -> &[Widget] {
        match self {
            Chain::Terminal => &[],
            Chain::Proceeding { widgets, .. } => widgets,
        }
    }

    /// Render against `data` into `respond`
    pub fn render(
        &self,
        data: &dyn PropertyResolver,
        respond: &mut dyn Respond,
    ) -> Result<(), RenderError> {
        let mut pass = RenderPass::default();
        let frame = Frame { data, body: None };
        self.render_in(&frame, &mut pass, respond)?;
        tracing::debug!(
            widgets = self.widgets().len(),
            required = pass.required.len(),
            "rendered chain"
        );
        Ok(())
    }

    /// Render into a fresh string
    pub fn render_to_string(&self, data: &dyn PropertyResolver) -> Result<String, RenderError> {
        let mut respond = StringRespond::new();
        self.render(data, &mut respond)?;
        Ok(respond.into_string())
    }

    fn render_in(
        &self,
        frame: &Frame<'_>,
        pass: &mut RenderPass,
        respond: &mut dyn Respond,
    ) -> Result<(), RenderError> {
        if let Chain::Proceeding { widgets, policy } = self {
            for widget in widgets {
                widget.render(frame, *policy, pass, respond)?;
            }
        }
        Ok(())
    }
}

impl Widget {
    fn render(
        &self,
        frame: &Frame<'_>,
        policy: EvaluationPolicy,
        pass: &mut RenderPass,
        respond: &mut dyn Respond,
    ) -> Result<(), RenderError> {
        match self {
            Widget::Text(text) => respond.write_str(text),
            Widget::Interpolation(expression) => match expression.evaluate_text(frame.data) {
                Ok(text) => respond.write_str(&text),
                Err(err) => evaluation_failed(policy, expression, &err, respond),
            },
            Widget::Conditional { condition, body } => {
                match condition.evaluate_bool(frame.data) {
                    Ok(true) => body.render_in(frame, pass, respond)?,
                    Ok(false) => {}
                    Err(err) => evaluation_failed(policy, condition, &err, respond),
                }
            }
            Widget::Require { resource } => {
                // The key is the resource rendered on its own, so requires
                // nested inside it cannot change its identity.
                let mut isolated = RenderPass {
                    required: HashSet::new(),
                    embed_depth: pass.embed_depth,
                };
                let mut rendered = StringRespond::new();
                resource.render_in(frame, &mut isolated, &mut rendered)?;
                let key = rendered.into_string();
                if pass.required.contains(&key) {
                    return Ok(());
                }

                if isolated.required.is_empty() {
                    respond.write_str(&key);
                    pass.required.insert(key);
                } else {
                    pass.required.insert(key);
                    resource.render_in(frame, pass, respond)?;
                }
            }
            Widget::Repeat(repeat) => repeat.render(frame, policy, pass, respond)?,
            Widget::Embed(embed) => embed.render(frame, policy, pass, respond)?,
            Widget::Body { fallback } => match frame.body {
                Some((body, caller)) => body.render_in(caller, pass, respond)?,
                None => fallback.render_in(frame, pass, respond)?,
            },
        }
        Ok(())
    }
}

impl Repeat {
    fn render(
        &self,
        frame: &Frame<'_>,
        policy: EvaluationPolicy,
        pass: &mut RenderPass,
        respond: &mut dyn Respond,
    ) -> Result<(), RenderError> {
        let items = match self.items.evaluate(frame.data) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                let err = EvaluationError::TypeMismatch {
                    expected: "list",
                    found: kind_of(&other),
                };
                evaluation_failed(policy, &self.items, &err, respond);
                return Ok(());
            }
            Err(err) => {
                evaluation_failed(policy, &self.items, &err, respond);
                return Ok(());
            }
        };

        for (index, item) in items.iter().enumerate() {
            let scope = Scope::new(frame.data)
                .with(REPEAT_INDEX_VAR, Value::from(index))
                .with(self.var.as_str(), item.clone());
            let item_frame = Frame {
                data: &scope,
                body: frame.body,
            };
            self.body.render_in(&item_frame, pass, respond)?;
            if let Some(separator) = self.separator {
                respond.write_char(separator);
            }
        }

        if self.separator.is_some() && !items.is_empty() {
            respond.retract()?;
        }
        Ok(())
    }
}

impl Embed {
    fn render(
        &self,
        frame: &Frame<'_>,
        policy: EvaluationPolicy,
        pass: &mut RenderPass,
        respond: &mut dyn Respond,
    ) -> Result<(), RenderError> {
        let chain = self
            .slot
            .chain()
            .ok_or_else(|| RenderError::UnresolvedEmbed {
                name: self.slot.name().to_string(),
            })?;
        if pass.embed_depth >= MAX_EMBED_DEPTH {
            return Err(RenderError::EmbedDepthExceeded {
                name: self.slot.name().to_string(),
                limit: MAX_EMBED_DEPTH,
            });
        }

        let mut scope = Scope::new(frame.data);
        for (name, expression) in &self.bindings {
            let value = expression.evaluate(frame.data).unwrap_or_else(|err| {
                evaluation_failed(policy, expression, &err, respond);
                Value::Null
            });
            scope.bind(name.as_str(), value);
        }

        let embedded = Frame {
            data: &scope,
            body: Some((&self.body, frame)),
        };
        pass.embed_depth += 1;
        let result = chain.render_in(&embedded, pass, respond);
        pass.embed_depth -= 1;
        result
    }
}

/// Apply the evaluation-failure policy for one widget
fn evaluation_failed(
    policy: EvaluationPolicy,
    expression: &CompiledExpression,
    err: &EvaluationError,
    respond: &mut dyn Respond,
) {
    match policy {
        EvaluationPolicy::Suppress => {
            tracing::warn!(expression = expression.source(), error = %err, "suppressed evaluation failure");
        }
        EvaluationPolicy::Marker => {
            tracing::debug!(expression = expression.source(), error = %err, "evaluation failure marker");
            let marker = format!("eval-error: {}: {}", expression.source(), err);
            respond.write_str("<!--");
            respond.write_str(&marker.replace("--", "- -"));
            respond.write_str("-->");
        }
    }
}

#[cfg(test)]
mod tests;
