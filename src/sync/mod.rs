//! The daily sync pipeline.
//!
//! collect -> read unprocessed commands and today's learnings ->
//! summarize -> publish -> mark the summarized commands processed.

use anyhow::Result;
use chrono::NaiveDate;

use crate::capture::{self, CollectionReport};
use crate::config::Settings;
use crate::publish::{self, PublishOutcome};
use crate::storage::Database;
use crate::summarize;

/// What a sync run did.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub collection: CollectionReport,
    /// Unprocessed commands fed to the summarizer.
    pub commands_summarized: usize,
    /// Learnings from the last day fed to the summarizer.
    pub learnings_summarized: usize,
    pub outcome: PublishOutcome,
    /// Rows flipped to processed.
    pub marked_processed: usize,
}

/// Runs the whole pipeline for `today`.
///
/// Commands are marked processed only once the entry is committed (or
/// found unchanged). A failed push does not hold them back; the commit
/// is still in the local journal and goes out with the next push.
pub fn run_daily_sync(db: &Database, settings: &Settings, today: NaiveDate) -> Result<SyncReport> {
    let collection = capture::run_collection(db, settings)?;

    let unprocessed = db.get_unprocessed_commands()?;
    let learnings = db.get_learnings_since(1)?;

    let commands: Vec<String> = unprocessed.iter().map(|c| c.command.clone()).collect();
    let learning_texts: Vec<String> = learnings.iter().map(|l| l.content.clone()).collect();

    tracing::info!(
        "Summarizing {} command(s) and {} learning(s)",
        commands.len(),
        learning_texts.len()
    );
    let markdown = summarize::generate_daily_summary(settings, &commands, &learning_texts, today);

    let outcome = publish::publish_and_push(settings, &markdown, today)?;

    let ids: Vec<i64> = unprocessed.iter().map(|c| c.id).collect();
    let marked_processed = db.mark_processed(&ids)?;

    Ok(SyncReport {
        collection,
        commands_summarized: commands.len(),
        learnings_summarized: learning_texts.len(),
        outcome,
        marked_processed,
    })
}
