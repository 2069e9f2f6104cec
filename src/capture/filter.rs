//! Validity filter applied to everything the collector stores.
//!
//! This is deliberately broader than the summarizer's noise filter: it
//! only drops empty strings, bare no-op commands, and anything that looks
//! like it carries a secret.

use regex::Regex;
use std::sync::LazyLock;

/// Commands that mean nothing on their own. With arguments they are kept.
const NOISE_COMMANDS: &[&str] = &[
    "ls", "ll", "la", "cd", "clear", "pwd", "exit", "history", "grep", "cat", "echo", "top",
    "htop",
];

/// Minimum length, in characters, of a command worth storing.
const MIN_COMMAND_CHARS: usize = 3;

static SENSITIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(password|secret|key|token|auth|bearer|credentials|\baws_access_key_id\b|\baws_secret_access_key\b)",
    )
    .expect("sensitive pattern is a valid regex")
});

/// Returns `true` when `cmd` is worth storing.
///
/// Rejects strings shorter than three characters, a bare noise command
/// with no arguments, and anything matching the sensitive-keyword
/// pattern (case-insensitive).
pub fn is_valid_command(cmd: &str) -> bool {
    let cmd = cmd.trim();

    if cmd.chars().count() < MIN_COMMAND_CHARS {
        return false;
    }

    let mut tokens = cmd.split_whitespace();
    let base = tokens.next().unwrap_or_default().to_lowercase();
    if tokens.next().is_none() && NOISE_COMMANDS.contains(&base.as_str()) {
        return false;
    }

    !contains_sensitive(cmd)
}

/// Returns `true` when `text` mentions a credential-like keyword.
pub fn contains_sensitive(text: &str) -> bool {
    SENSITIVE_PATTERN.is_match(text)
}
