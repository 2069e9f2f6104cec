//! Command-line interface for DevLog.
//!
//! Each command receives the [`Settings`](crate::config::Settings)
//! resolved once in `main` and opens its own database connection for
//! the duration of the command.

/// Individual CLI command implementations.
pub mod commands;

/// Output format and shared renderers.
pub mod format;

pub use format::OutputFormat;
