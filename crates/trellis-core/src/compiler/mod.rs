//! Template compiler
//!
//! Turns markup into a [`Chain`]. A directive is the trailing token of a
//! text run and applies to the element right after it:
//!
//! ```text
//! <ul>hello @ShowIf(admin)<li>secret</li></ul>
//!      ^^^^^ kept      ^^^^^^^^^^^^^^^^^^ compiled as the conditional's body
//! ```
//!
//! Compilation is all-or-nothing: the first error aborts and no chain is
//! returned.

mod arguments;
mod error;

pub use error::TemplateCompileError;

use crate::config::{EvaluationPolicy, RenderConfig};
use crate::directive::{self, DirectiveToken, Segment};
use crate::expr::{CompiledExpression, ExpressionCompiler, Shape};
use crate::markup::{self, fragment_of, Element, Node, TagPiece};
use crate::registry::{WidgetKind, WidgetRegistry};
use crate::widget::{Chain, Embed, Repeat, Widget};
use arguments::{is_identifier, parse_bindings, unquote};
use std::sync::Arc;

/// Variable a repeated item is bound to when `var=` is not given
pub const DEFAULT_REPEAT_VAR: &str = "item";

/// Name the 0-based repeat position is bound to
pub const REPEAT_INDEX_VAR: &str = "index";

/// A directive found in text and resolved against the registry
struct Found<'t> {
    prefix: &'t str,
    token: DirectiveToken,
    kind: WidgetKind,
    fragment: String,
    line: usize,
}

impl Found<'_> {
    fn invalid(&self, message: impl Into<String>) -> TemplateCompileError {
        TemplateCompileError::InvalidArgument {
            key: self.token.key.clone(),
            message: message.into(),
            fragment: self.fragment.clone(),
            line: self.line,
        }
    }
}

/// Compiles templates against a registry
///
/// The registry is only read while compiling, so one registry can serve
/// many concurrent compiles.
pub struct TemplateCompiler<'r> {
    registry: &'r WidgetRegistry,
    config: RenderConfig,
}

impl<'r> TemplateCompiler<'r> {
    pub fn new(registry: &'r WidgetRegistry) -> Self {
        Self {
            registry,
            config: RenderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    fn policy(&self) -> EvaluationPolicy {
        self.config.on_evaluation_error
    }

    /// Compile `markup`, checking every expression against `shape`
    pub fn compile(&self, markup: &str, shape: &Shape) -> Result<Chain, TemplateCompileError> {
        let nodes = markup::parse(markup)?;
        let expressions = ExpressionCompiler::new(shape.clone());

        let mut widgets = Vec::new();
        self.nodes(&nodes, &expressions, &mut widgets)?;
        let chain = Chain::new(widgets, self.policy());

        tracing::debug!(
            widgets = chain.widgets().len(),
            expressions = expressions.cached_len(),
            "compiled template"
        );
        Ok(chain)
    }

    fn nodes(
        &self,
        nodes: &[Node],
        expressions: &ExpressionCompiler,
        widgets: &mut Vec<Widget>,
    ) -> Result<(), TemplateCompileError> {
        let mut index = 0;
        while index < nodes.len() {
            let node = &nodes[index];
            index += 1;

            match node {
                Node::Text { text, line } => {
                    let next = match nodes.get(index) {
                        Some(Node::Element(element)) => Some(element),
                        _ => None,
                    };
                    match self.directive(text, *line, next.is_some())? {
                        Some(found) => {
                            if let Some(element) = next {
                                self.text(found.prefix, *line, expressions, widgets)?;
                                widgets.push(self.directive_widget(&found, element, expressions)?);
                                index += 1;
                            }
                        }
                        None => self.text(text, *line, expressions, widgets)?,
                    }
                }
                Node::Verbatim { text, .. } => widgets.push(Widget::Text(text.clone())),
                Node::Element(element) => self.element(element, expressions, widgets)?,
            }
        }
        Ok(())
    }

    /// Find and resolve a directive ending `text`
    ///
    /// Returns `None` when the text is plain: no trailing directive, or an
    /// unknown `@word` that is not attached to an element.
    fn directive<'t>(
        &self,
        text: &'t str,
        line: usize,
        followed_by_element: bool,
    ) -> Result<Option<Found<'t>>, TemplateCompileError> {
        let trailing = match directive::split_trailing(text) {
            None => return Ok(None),
            Some(Ok(trailing)) => trailing,
            Some(Err(_)) if !followed_by_element => return Ok(None),
            Some(Err(source)) => {
                let fragment = text.trim();
                return Err(TemplateCompileError::Directive {
                    source,
                    fragment: fragment_of(fragment),
                    line: line + newlines(text.trim_end()),
                });
            }
        };

        let line = line + newlines(trailing.prefix);
        let fragment = fragment_of(text[trailing.offset..].trim_end());
        let key = trailing.token.key.clone();

        match (self.registry.resolve(&key), followed_by_element) {
            (Ok(kind), true) => Ok(Some(Found {
                prefix: trailing.prefix,
                token: trailing.token,
                kind,
                fragment,
                line,
            })),
            (Ok(_), false) => Err(TemplateCompileError::DanglingDirective {
                key,
                fragment,
                line,
            }),
            (Err(_), true) => Err(TemplateCompileError::UnknownDirective {
                key,
                fragment,
                line,
            }),
            (Err(_), false) => Ok(None),
        }
    }

    /// Literal text and `${}` interpolations
    fn text(
        &self,
        text: &str,
        line: usize,
        expressions: &ExpressionCompiler,
        widgets: &mut Vec<Widget>,
    ) -> Result<(), TemplateCompileError> {
        self.segments(text, line, expressions, widgets, |literal| literal.to_string())
    }

    fn segments(
        &self,
        text: &str,
        line: usize,
        expressions: &ExpressionCompiler,
        widgets: &mut Vec<Widget>,
        literal: impl Fn(&str) -> String,
    ) -> Result<(), TemplateCompileError> {
        let segments =
            directive::split_interpolations(text).map_err(|source| TemplateCompileError::Directive {
                source,
                fragment: fragment_of(text.trim()),
                line,
            })?;

        for segment in segments {
            match segment {
                Segment::Literal(text) => widgets.push(Widget::Text(literal(&text))),
                Segment::Expression { source, offset } => {
                    let compiled = expressions.compile(&source).map_err(|err| {
                        TemplateCompileError::Expression {
                            source: err,
                            fragment: format!("${{{}}}", source),
                            line: line + newlines(&text[..offset]),
                        }
                    })?;
                    widgets.push(Widget::Interpolation(compiled));
                }
            }
        }
        Ok(())
    }

    /// An element as written, with quoted attribute values normalised to `"`
    fn element(
        &self,
        element: &Element,
        expressions: &ExpressionCompiler,
        widgets: &mut Vec<Widget>,
    ) -> Result<(), TemplateCompileError> {
        for piece in &element.start {
            match piece {
                TagPiece::Raw(raw) => widgets.push(Widget::Text(raw.clone())),
                TagPiece::Value(value) => {
                    widgets.push(Widget::Text("\"".to_string()));
                    self.segments(value, element.line, expressions, widgets, |literal| {
                        literal.replace('"', "&quot;")
                    })?;
                    widgets.push(Widget::Text("\"".to_string()));
                }
            }
        }

        self.nodes(&element.children, expressions, widgets)?;

        if let Some(end) = &element.end {
            widgets.push(Widget::Text(end.clone()));
        }
        Ok(())
    }

    fn element_chain(
        &self,
        element: &Element,
        expressions: &ExpressionCompiler,
    ) -> Result<Chain, TemplateCompileError> {
        let mut widgets = Vec::new();
        self.element(element, expressions, &mut widgets)?;
        Ok(Chain::new(widgets, self.policy()))
    }

    fn expression(
        &self,
        source: &str,
        expressions: &ExpressionCompiler,
        found: &Found<'_>,
    ) -> Result<Arc<CompiledExpression>, TemplateCompileError> {
        expressions
            .compile(source)
            .map_err(|err| TemplateCompileError::Expression {
                source: err,
                fragment: found.fragment.clone(),
                line: found.line,
            })
    }

    fn directive_widget(
        &self,
        found: &Found<'_>,
        element: &Element,
        expressions: &ExpressionCompiler,
    ) -> Result<Widget, TemplateCompileError> {
        let widget = match &found.kind {
            WidgetKind::Conditional => {
                let source = match found.token.argument.as_deref() {
                    Some(source) if !source.is_empty() => source,
                    _ => return Err(found.invalid("a condition is required")),
                };
                let condition = self.expression(source, expressions, found)?;
                if !matches!(condition.result_shape(), Shape::Bool | Shape::Any) {
                    return Err(found.invalid(format!(
                        "condition must be boolean, found {}",
                        condition.result_shape().kind_name()
                    )));
                }
                Widget::Conditional {
                    condition,
                    body: self.element_chain(element, expressions)?,
                }
            }
            WidgetKind::Require => Widget::Require {
                resource: self.element_chain(element, expressions)?,
            },
            WidgetKind::Body => Widget::Body {
                fallback: self.element_chain(element, expressions)?,
            },
            WidgetKind::Repeat => Widget::Repeat(self.repeat(found, element, expressions)?),
            WidgetKind::Embed { name } => Widget::Embed(self.embed(name, found, element, expressions)?),
        };
        Ok(widget)
    }

    fn repeat(
        &self,
        found: &Found<'_>,
        element: &Element,
        expressions: &ExpressionCompiler,
    ) -> Result<Repeat, TemplateCompileError> {
        let argument = found.token.argument.as_deref().unwrap_or_default();
        let mut items = None;
        let mut var = DEFAULT_REPEAT_VAR.to_string();
        let mut separator = None;

        for (key, value) in parse_bindings(argument).map_err(|message| found.invalid(message))? {
            match key.as_str() {
                "items" => items = Some(value),
                "var" => {
                    let name = unquote(&value);
                    if !is_identifier(name) {
                        return Err(found.invalid(format!("'{}' is not a valid variable name", name)));
                    }
                    var = name.to_string();
                }
                "sep" => {
                    let mut chars = unquote(&value).chars();
                    separator = match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(c),
                        _ => return Err(found.invalid("sep must be exactly one character")),
                    };
                }
                other => return Err(found.invalid(format!("unknown argument '{}'", other))),
            }
        }

        let source = items.ok_or_else(|| found.invalid("items= is required"))?;
        let items = self.expression(&source, expressions, found)?;
        let item_shape = match items.result_shape() {
            Shape::List(element) => (**element).clone(),
            Shape::Any => Shape::Any,
            other => {
                return Err(found.invalid(format!(
                    "items must be a list, found {}",
                    other.kind_name()
                )))
            }
        };

        let scoped = expressions
            .with_binding(REPEAT_INDEX_VAR, Shape::Number)
            .with_binding(var.as_str(), item_shape);
        Ok(Repeat {
            items,
            var,
            separator,
            body: self.element_chain(element, &scoped)?,
        })
    }

    fn embed(
        &self,
        name: &str,
        found: &Found<'_>,
        element: &Element,
        expressions: &ExpressionCompiler,
    ) -> Result<Embed, TemplateCompileError> {
        let slot = self
            .registry
            .embed_slot(name)
            .ok_or_else(|| TemplateCompileError::UnknownEmbed {
                name: name.to_string(),
                fragment: found.fragment.clone(),
                line: found.line,
            })?;

        let argument = found.token.argument.as_deref().unwrap_or_default();
        let bindings = parse_bindings(argument)
            .map_err(|message| found.invalid(message))?
            .into_iter()
            .map(|(key, value)| Ok((key, self.expression(&value, expressions, found)?)))
            .collect::<Result<Vec<_>, TemplateCompileError>>()?;

        Ok(Embed {
            slot,
            bindings,
            body: self.element_chain(element, expressions)?,
        })
    }
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests;
