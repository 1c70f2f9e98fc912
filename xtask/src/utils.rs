//! Utility functions and helpers for build automation
//!
//! - [`cargo`] - Cargo command execution helpers and wrappers
//! - [`crates`] - Workspace crates and demo applications discovery
//! - [`output`] - Formatted output and user-friendly display functions

/// Cargo command execution utilities
pub mod cargo;
/// Workspace crates and demos discovery
pub mod crates;
/// Output formatting and display utilities
pub mod output;

pub use cargo::*;
pub use crates::*;
pub use output::*;
