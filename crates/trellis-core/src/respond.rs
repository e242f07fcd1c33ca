//! Output sink for rendering
//!
//! A [`Respond`] receives everything a widget chain emits during one render
//! call. Sinks are single-writer and scoped to a single render invocation.

use std::fmt;
use thiserror::Error;

/// Raised when [`Respond::retract`] is called on an empty sink
///
/// This is a programmer error in a widget, never a user-facing failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("RETRACT_EMPTY: cannot retract from an empty response")]
pub struct RetractError;

/// Destination for rendered output
pub trait Respond {
    /// Append text
    fn write_str(&mut self, text: &str);

    /// Append a single character
    fn write_char(&mut self, c: char);

    /// Remove exactly the most recently written character
    fn retract(&mut self) -> Result<char, RetractError>;
}

/// In-memory sink backed by a `String`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRespond {
    buffer: String,
}

impl StringRespond {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated output so far
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Finish and take the accumulated output
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Number of bytes written
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Respond for StringRespond {
    fn write_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn write_char(&mut self, c: char) {
        self.buffer.push(c);
    }

    fn retract(&mut self) -> Result<char, RetractError> {
        self.buffer.pop().ok_or(RetractError)
    }
}

impl fmt::Display for StringRespond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}
