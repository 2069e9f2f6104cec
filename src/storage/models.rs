//! Core data models for DevLog
//!
//! These are the typed records returned by the storage layer. Both
//! entities are independent; nothing links a learning to a command.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Format used for every timestamp column.
///
/// Matches SQLite's `CURRENT_TIMESTAMP` so `date()` and `julianday()`
/// work directly on the stored text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A manually recorded fact the user wants to retain and review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Learning {
    /// Identifier assigned by the store
    pub id: i64,

    /// Free text of the learning (never empty)
    pub content: String,

    /// Ordered tag list, possibly empty
    pub tags: Vec<String>,

    /// When the learning was recorded
    pub created_at: DateTime<Utc>,

    /// When the learning was last surfaced as a flashcard
    pub last_reviewed: DateTime<Utc>,

    /// How many times the learning has been reviewed
    pub review_count: i64,
}

impl Learning {
    /// Tags joined for display, or `None` when untagged.
    pub fn tags_display(&self) -> Option<String> {
        if self.tags.is_empty() {
            None
        } else {
            Some(self.tags.join(", "))
        }
    }
}

/// A shell command or git commit subject captured for summarization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawCommand {
    /// Identifier assigned by the store
    pub id: i64,

    /// Where the command came from (e.g. "zsh_history", "git:api")
    pub source: String,

    /// The command text as captured
    pub command: String,

    /// When the command was stored
    pub timestamp: DateTime<Utc>,

    /// Whether a daily sync has already consumed this command
    pub processed: bool,
}

/// Formats a timestamp for storage.
pub fn to_sql_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// Accepts the canonical storage format and falls back to RFC 3339 for
/// rows written by other tools.
pub fn parse_sql_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
