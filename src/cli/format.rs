//! Output formatting utilities for CLI commands.
//!
//! Provides a unified `OutputFormat` enum and the shared renderers for
//! listing learnings.

use clap::ValueEnum;
use colored::Colorize;

use crate::storage::Learning;

/// Output format options for CLI commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default).
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Prints a bold section title followed by a rule.
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count().max(24)).dimmed());
    println!();
}

/// Prints one numbered learning with its tags, and its date when
/// `with_date` is set.
pub fn print_learning(index: usize, learning: &Learning, with_date: bool) {
    println!("  {} {}", format!("{index}.").green(), learning.content);

    let mut meta = Vec::new();
    if with_date {
        meta.push(learning.created_at.format("%Y-%m-%d").to_string());
    }
    if let Some(tags) = learning.tags_display() {
        meta.push(format!("tags: {tags}"));
    }
    if !meta.is_empty() {
        println!("     {}", meta.join(" · ").yellow());
    }
    println!();
}

/// "1 learning" / "3 learnings"
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
