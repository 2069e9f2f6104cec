//! Push command - run the daily sync pipeline.

use anyhow::Result;
use chrono::Local;
use colored::Colorize;

use crate::config::Settings;
use crate::publish::{PublishOutcome, PushStatus};
use crate::storage::Database;
use crate::sync::run_daily_sync;

/// Arguments for the push command.
#[derive(clap::Args)]
#[command(after_help = "Collects shell history and recent commits, summarizes the day,\n\
    writes <year>/<MM-DD>.md into the journal repository, commits and pushes.")]
pub struct Args {}

/// Executes the push command.
pub fn run(_args: Args, settings: &Settings) -> Result<()> {
    println!("Triggering daily sync pipeline...");

    let db = Database::open(&settings.db_path())?;
    let report = run_daily_sync(&db, settings, Local::now().date_naive())?;

    println!(
        "  {} new command(s) collected, {} summarized, {} learning(s)",
        report.collection.stored(),
        report.commands_summarized,
        report.learnings_summarized
    );
    for repo in &report.collection.skipped_repos {
        println!("  {} skipped {}", "!".yellow(), repo.display());
    }

    let path = report.outcome.path().display().to_string();
    match &report.outcome {
        PublishOutcome::NothingToCommit { .. } => {
            println!("  {}", format!("{path} unchanged, nothing to commit").dimmed());
        }
        PublishOutcome::Committed { push, .. } => {
            println!("  {} committed {}", "✓".green(), path.cyan());
            match push {
                PushStatus::Pushed => println!("  {} pushed to origin", "✓".green()),
                PushStatus::NoRemote => println!(
                    "  {}",
                    "No remote configured (set GITHUB_URL or github.remote_url); kept locally"
                        .yellow()
                ),
                PushStatus::Failed(reason) => {
                    println!("  {} push failed: {reason}", "✗".red())
                }
            }
        }
    }

    Ok(())
}
