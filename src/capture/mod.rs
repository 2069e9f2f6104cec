//! Activity collection.
//!
//! Scrapes recent shell history and git commit subjects into the
//! `commands` table so the daily sync can summarize them.
//!
//! # Sources
//!
//! - zsh - `~/.zsh_history` (extended format prefix stripped)
//! - bash - `~/.bash_history`
//! - git - commit subjects from the last 24 hours of every repository
//!   listed under `git_repos`

pub mod filter;
pub mod history;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::git::{self, GitError};
use crate::storage::Database;

pub use filter::is_valid_command;
pub use history::{tail_lines, Shell};

/// How far back git commits are collected.
pub const GIT_LOOKBACK_HOURS: i64 = 24;

/// What a collection run did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectionReport {
    /// History lines read across all shells.
    pub history_lines_read: usize,
    /// New rows inserted from shell history.
    pub history_stored: usize,
    /// New rows inserted from git logs.
    pub commits_stored: usize,
    /// Configured repositories that could not be read.
    pub skipped_repos: Vec<PathBuf>,
}

impl CollectionReport {
    /// Total new rows inserted.
    pub fn stored(&self) -> usize {
        self.history_stored + self.commits_stored
    }
}

/// Runs every collector against the configured sources.
///
/// Missing history files and unreadable repositories are skipped; only
/// storage failures abort the run.
pub fn run_collection(db: &Database, settings: &Settings) -> Result<CollectionReport> {
    let mut report = CollectionReport::default();

    for shell in Shell::ALL {
        let path = shell.history_file(settings.user_home());
        let (read, stored) = collect_shell_history(db, shell, &path, settings.history_lines())?;
        report.history_lines_read += read;
        report.history_stored += stored;
    }

    let since = Utc::now() - Duration::hours(GIT_LOOKBACK_HOURS);
    let (stored, skipped) = collect_git_logs(db, &settings.git_repos(), since)?;
    report.commits_stored = stored;
    report.skipped_repos = skipped;

    tracing::info!(
        "Collected {} new command(s) ({} history lines scanned, {} repo(s) skipped)",
        report.stored(),
        report.history_lines_read,
        report.skipped_repos.len()
    );

    Ok(report)
}

/// Stores the valid commands among the last `max_lines` lines of a
/// history file.
///
/// Returns `(lines read, rows inserted)`. A missing file reads as empty;
/// other read errors are logged and the shell is skipped.
pub fn collect_shell_history(
    db: &Database,
    shell: Shell,
    path: &Path,
    max_lines: usize,
) -> Result<(usize, usize)> {
    let lines = match tail_lines(path, max_lines) {
        Ok(lines) => lines,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((0, 0)),
        Err(e) => {
            tracing::warn!("Error reading {shell} history {}: {e}", path.display());
            return Ok((0, 0));
        }
    };

    // Oldest first, so insertion order follows the history file.
    let source = shell.source_tag();
    let mut stored = 0;
    for line in lines.iter().rev() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = shell.clean_line(line);
        if is_valid_command(&command) && db.store_raw_command(&source, &command)? {
            stored += 1;
        }
    }

    tracing::debug!(
        "{shell}: read {} line(s), stored {stored} new command(s)",
        lines.len()
    );
    Ok((lines.len(), stored))
}

/// Stores commit subjects newer than `since` from each repository.
///
/// Returns `(rows inserted, repositories skipped)`. Subjects are stored as
/// `git commit: <subject>` under the source `git:<repo name>`.
pub fn collect_git_logs(
    db: &Database,
    repos: &[PathBuf],
    since: DateTime<Utc>,
) -> Result<(usize, Vec<PathBuf>)> {
    let mut stored = 0;
    let mut skipped = Vec::new();

    for repo in repos {
        let subjects = match git::commit_subjects_since(repo, since) {
            Ok(subjects) => subjects,
            Err(GitError::NotARepository(path)) => {
                tracing::warn!(
                    "Tracked repo {} does not exist or is not a git repository",
                    path.display()
                );
                skipped.push(repo.clone());
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch git log for {}: {e}", repo.display());
                skipped.push(repo.clone());
                continue;
            }
        };

        let source = format!("git:{}", git::repo_name(repo));
        for subject in subjects.iter().rev() {
            let subject = subject.trim();
            if is_valid_command(subject)
                && db.store_raw_command(&source, &format!("git commit: {subject}"))?
            {
                stored += 1;
            }
        }
    }

    Ok((stored, skipped))
}
