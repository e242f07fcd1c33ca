//! CLI command implementations

pub mod check;
pub mod directives;
pub mod render;
