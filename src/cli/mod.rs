// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for replaying recorded sessions.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! terminal output and the `predict` command implementation.

// Modules
/// CLI arguments.
pub mod args;

/// Terminal output macros and verbosity.
pub mod logging;

/// Replay logic.
pub mod predict;
