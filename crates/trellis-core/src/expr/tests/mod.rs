//! Tests for the expression compiler
//!
//! Organized by phase: compile-time checks, evaluation, and property lookup.

use super::*;

mod helpers;

mod evaluate;
