//! SQLite storage layer for DevLog

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;

use super::models::{parse_sql_timestamp, to_sql_timestamp, Learning, RawCommand};

/// Learnings become due for review once this many days passed since the
/// last review.
pub const REVIEW_INTERVAL_DAYS: i64 = 3;

/// SQLite caps bound parameters per statement; bulk updates are chunked.
const MAX_BATCH: usize = 500;

const LEARNING_COLUMNS: &str = "id, content, tags, created_at, last_reviewed, review_count";
const COMMAND_COLUMNS: &str = "id, source, command, timestamp, processed";

/// Database connection wrapper.
///
/// A single connection is held for the lifetime of one CLI command and
/// released when the value is dropped.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Create tables if absent. Safe to run on every open.
    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS learnings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                last_reviewed TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                review_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS commands (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                command TEXT NOT NULL,
                timestamp TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                processed INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_learnings_created_at ON learnings(created_at);
            CREATE INDEX IF NOT EXISTS idx_learnings_last_reviewed ON learnings(last_reviewed);
            CREATE INDEX IF NOT EXISTS idx_commands_processed ON commands(processed, command);
            "#,
        )?;
        Ok(())
    }

    // ==================== Learnings ====================

    /// Record a new learning and return its identifier.
    ///
    /// Fails when `content` is empty or whitespace.
    pub fn add_learning(&self, content: &str, tags: &[String]) -> Result<i64> {
        self.add_learning_at(content, tags, Utc::now())
    }

    /// Record a learning with an explicit creation time.
    ///
    /// The last-reviewed time starts equal to the creation time.
    pub fn add_learning_at(
        &self,
        content: &str,
        tags: &[String],
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        if content.trim().is_empty() {
            bail!("Learning content is required");
        }

        let tags_json = serde_json::to_string(tags)?;
        let ts = to_sql_timestamp(&created_at);

        self.conn.execute(
            "INSERT INTO learnings (content, tags, created_at, last_reviewed, review_count)
             VALUES (?1, ?2, ?3, ?3, 0)",
            params![content, tags_json, ts],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a learning by ID
    pub fn get_learning(&self, id: i64) -> Result<Option<Learning>> {
        self.conn
            .query_row(
                &format!("SELECT {LEARNING_COLUMNS} FROM learnings WHERE id = ?1"),
                params![id],
                Self::row_to_learning,
            )
            .optional()
            .context("Failed to get learning")
    }

    /// The least recently reviewed learning whose last review is more than
    /// [`REVIEW_INTERVAL_DAYS`] old, if any.
    pub fn get_due_flashcard(&self) -> Result<Option<Learning>> {
        let now = to_sql_timestamp(&Utc::now());
        self.conn
            .query_row(
                &format!(
                    "SELECT {LEARNING_COLUMNS} FROM learnings
                     WHERE julianday(?1) - julianday(last_reviewed) > ?2
                     ORDER BY last_reviewed ASC, id ASC
                     LIMIT 1"
                ),
                params![now, REVIEW_INTERVAL_DAYS],
                Self::row_to_learning,
            )
            .optional()
            .context("Failed to get due flashcard")
    }

    /// Stamp a learning as reviewed now and bump its review count.
    ///
    /// Unknown IDs are ignored.
    pub fn mark_reviewed(&self, id: i64) -> Result<()> {
        let now = to_sql_timestamp(&Utc::now());
        self.conn.execute(
            "UPDATE learnings
             SET last_reviewed = ?1,
                 review_count = review_count + 1
             WHERE id = ?2",
            params![now, id],
        )?;
        Ok(())
    }

    /// Learnings created within the last `days` days, newest first.
    ///
    /// Stored times have one-second precision, so the cutoff is widened by
    /// one second; `days == 0` still returns what was just recorded.
    pub fn get_learnings_since(&self, days: u32) -> Result<Vec<Learning>> {
        let cutoff = Utc::now() - Duration::days(i64::from(days)) - Duration::seconds(1);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LEARNING_COLUMNS} FROM learnings
             WHERE created_at >= ?1
             ORDER BY created_at DESC, id DESC"
        ))?;

        let rows = stmt.query_map(params![to_sql_timestamp(&cutoff)], Self::row_to_learning)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list recent learnings")
    }

    /// Substring search over learning content, newest first.
    ///
    /// Matching follows SQLite's `LIKE`, so ASCII letters compare
    /// case-insensitively. `%` and `_` in the keyword match literally.
    pub fn search_learnings(&self, keyword: &str) -> Result<Vec<Learning>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LEARNING_COLUMNS} FROM learnings
             WHERE content LIKE ?1 ESCAPE '\\'
             ORDER BY created_at DESC, id DESC"
        ))?;

        let pattern = format!("%{}%", escape_like(keyword));
        let rows = stmt.query_map(params![pattern], Self::row_to_learning)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to search learnings")
    }

    /// Learnings created on the given (UTC) calendar day, oldest first.
    pub fn get_learnings_by_date(&self, date: NaiveDate) -> Result<Vec<Learning>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LEARNING_COLUMNS} FROM learnings
             WHERE date(created_at) = ?1
             ORDER BY created_at ASC, id ASC"
        ))?;

        let day = date.format("%Y-%m-%d").to_string();
        let rows = stmt.query_map(params![day], Self::row_to_learning)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to get learnings by date")
    }

    /// Distinct days that have at least one learning, most recent first.
    pub fn get_all_logged_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT date(created_at) AS day
             FROM learnings
             WHERE date(created_at) IS NOT NULL
             ORDER BY day DESC",
        )?;

        let days = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        days.iter()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .with_context(|| format!("Invalid stored date '{d}'"))
            })
            .collect()
    }

    fn row_to_learning(row: &rusqlite::Row) -> rusqlite::Result<Learning> {
        let tags_json: String = row.get(2)?;
        let tags = serde_json::from_str(&tags_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Learning {
            id: row.get(0)?,
            content: row.get(1)?,
            tags,
            created_at: timestamp_column(row, 3)?,
            last_reviewed: timestamp_column(row, 4)?,
            review_count: row.get(5)?,
        })
    }

    // ==================== Raw commands ====================

    /// Store a captured command unless an unprocessed row with the same
    /// text already exists.
    ///
    /// Returns `true` when a row was inserted.
    pub fn store_raw_command(&self, source: &str, command: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM commands WHERE command = ?1 AND processed = 0 LIMIT 1",
                params![command],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO commands (source, command, timestamp, processed) VALUES (?1, ?2, ?3, 0)",
            params![source, command, to_sql_timestamp(&Utc::now())],
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// All commands not yet consumed by a sync, oldest first.
    pub fn get_unprocessed_commands(&self) -> Result<Vec<RawCommand>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMAND_COLUMNS} FROM commands
             WHERE processed = 0
             ORDER BY timestamp ASC, id ASC"
        ))?;

        let rows = stmt.query_map([], Self::row_to_command)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list unprocessed commands")
    }

    /// Flag the given commands as processed. Empty input is a no-op.
    ///
    /// Returns the number of rows updated.
    pub fn mark_processed(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut updated = 0;
        for chunk in ids.chunks(MAX_BATCH) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            updated += tx.execute(
                &format!("UPDATE commands SET processed = 1 WHERE id IN ({placeholders})"),
                params_from_iter(chunk.iter()),
            )?;
        }
        tx.commit()?;
        Ok(updated)
    }

    fn row_to_command(row: &rusqlite::Row) -> rusqlite::Result<RawCommand> {
        Ok(RawCommand {
            id: row.get(0)?,
            source: row.get(1)?,
            command: row.get(2)?,
            timestamp: timestamp_column(row, 3)?,
            processed: row.get(4)?,
        })
    }

    // ==================== Stats ====================

    /// Get total learning count
    pub fn learning_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM learnings", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get total captured command count
    pub fn command_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM commands", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get count of commands waiting for the next sync
    pub fn unprocessed_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM commands WHERE processed = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_sql_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid timestamp '{raw}'").into(),
        )
    })
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
