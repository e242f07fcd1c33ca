//! Template compile errors

use crate::directive::DirectiveError;
use crate::expr::ExpressionCompileError;
use crate::markup::MarkupError;
use thiserror::Error;

/// Compilation failed; no chain is produced
///
/// Every variant carries the offending source fragment and its 1-based line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateCompileError {
    #[error("line {line}: {source} near '{fragment}'")]
    Markup {
        source: MarkupError,
        fragment: String,
        line: usize,
    },

    #[error("line {line}: {source} in '{fragment}'")]
    Directive {
        source: DirectiveError,
        fragment: String,
        line: usize,
    },

    #[error("line {line}: unknown directive '@{key}' in '{fragment}'")]
    UnknownDirective {
        key: String,
        fragment: String,
        line: usize,
    },

    #[error("line {line}: directive '{fragment}' is not followed by an element")]
    DanglingDirective {
        key: String,
        fragment: String,
        line: usize,
    },

    #[error("line {line}: invalid arguments for '@{key}': {message} in '{fragment}'")]
    InvalidArgument {
        key: String,
        message: String,
        fragment: String,
        line: usize,
    },

    #[error("line {line}: embed '{name}' is not declared in '{fragment}'")]
    UnknownEmbed {
        name: String,
        fragment: String,
        line: usize,
    },

    #[error("line {line}: {source}")]
    Expression {
        source: ExpressionCompileError,
        fragment: String,
        line: usize,
    },
}

impl TemplateCompileError {
    /// The offending source text
    pub fn fragment(&self) -> &str {
        match self {
            TemplateCompileError::Markup { fragment, .. }
            | TemplateCompileError::Directive { fragment, .. }
            | TemplateCompileError::UnknownDirective { fragment, .. }
            | TemplateCompileError::DanglingDirective { fragment, .. }
            | TemplateCompileError::InvalidArgument { fragment, .. }
            | TemplateCompileError::UnknownEmbed { fragment, .. }
            | TemplateCompileError::Expression { fragment, .. } => fragment,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            TemplateCompileError::Markup { line, .. }
            | TemplateCompileError::Directive { line, .. }
            | TemplateCompileError::UnknownDirective { line, .. }
            | TemplateCompileError::DanglingDirective { line, .. }
            | TemplateCompileError::InvalidArgument { line, .. }
            | TemplateCompileError::UnknownEmbed { line, .. }
            | TemplateCompileError::Expression { line, .. } => *line,
        }
    }
}

impl From<MarkupError> for TemplateCompileError {
    fn from(source: MarkupError) -> Self {
        TemplateCompileError::Markup {
            fragment: source.fragment().to_string(),
            line: source.line(),
            source,
        }
    }
}
