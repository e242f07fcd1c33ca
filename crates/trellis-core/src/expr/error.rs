//! Expression error types

use thiserror::Error;

/// Invalid or unbound expression text, found while compiling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at column {column} in '{source_text}'")]
pub struct ExpressionCompileError {
    /// The full expression text
    pub source_text: String,
    /// Byte offset of the offending token within the expression
    pub position: usize,
    /// 1-based column of the offending token
    pub column: usize,
    /// What went wrong
    pub message: String,
}

impl ExpressionCompileError {
    pub(crate) fn new(source_text: &str, position: usize, message: impl Into<String>) -> Self {
        let position = position.min(source_text.len());
        Self {
            source_text: source_text.to_string(),
            position,
            column: source_text[..position].chars().count() + 1,
            message: message.into(),
        }
    }
}

/// A compiled expression failed against a concrete instance
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("property '{path}' not found")]
    PropertyNotFound { path: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("method '{method}' is not supported on {receiver}")]
    UnsupportedMethod {
        method: String,
        receiver: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic produced a non-finite number")]
    NonFiniteNumber,
}
