use crate::compiler::TemplateCompileError;
use crate::expr::ExpressionCompileError;
use crate::registry::RegistryError;
use crate::respond::RetractError;
use crate::widget::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrellisError {
    // Compile errors
    #[error("TEMPLATE_COMPILE: {0}")]
    TemplateCompile(#[from] TemplateCompileError),

    #[error("EXPRESSION_COMPILE: {0}")]
    ExpressionCompile(#[from] ExpressionCompileError),

    // Registry errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    // Render errors (UNRESOLVED_EMBED, EMBED_DEPTH_EXCEEDED, RETRACT_EMPTY)
    #[error(transparent)]
    Render(#[from] RenderError),

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParseError(String),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<RetractError> for TrellisError {
    fn from(err: RetractError) -> Self {
        TrellisError::Render(RenderError::Retract(err))
    }
}

pub type Result<T> = std::result::Result<T, TrellisError>;
