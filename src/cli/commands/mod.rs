//! CLI commands for DevLog.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Shell completion script generation.
pub mod completions;

/// Configuration viewing and management.
pub mod config;

/// Browse learnings by calendar day.
pub mod history;

/// Record a new learning.
pub mod learn;

/// Run the daily sync pipeline.
pub mod push;

/// Flashcard review.
pub mod quiz;

/// Substring search across learnings.
pub mod search;

/// Data directory, database and integration overview.
pub mod status;

/// Learnings recorded in the last day.
pub mod today;
