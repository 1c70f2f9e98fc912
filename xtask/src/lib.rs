//! # xtask - Build Automation for NTPC
//!
//! A build automation library for the `ntpc` NTP client crates and their demos,
//! following the [xtask pattern](https://github.com/matklad/cargo-xtask).
//!
//! ## Usage
//!
//! ```text
//! cargo run -p xtask -- test
//! cargo run -p xtask -- test --network
//! cargo run -p xtask -- clippy
//! cargo run -p xtask -- format --fix
//! ```
//!
//! ## Module Structure
//!
//! - [`commands`] - All build automation commands (build, test, check, etc.)
//! - [`utils`] - Common utilities for cargo operations, crate discovery, and output formatting

/// Build automation commands for the NTPC workspace
pub mod commands;

/// Utility functions and helpers
///
/// This module provides common utilities used across different commands,
/// including cargo command execution, crate and demo discovery, and
/// formatted output helpers.
pub mod utils;

pub use anyhow::{Context, Result};
pub use colored::Colorize;
