//! Status command - show current DevLog state.
//!
//! Displays database counts, whether a flashcard is due, and which
//! integrations (summaries, remote push, tracked repos) are configured.

use anyhow::Result;
use colored::Colorize;

use crate::config::Settings;
use crate::storage::Database;

/// Executes the status command.
pub fn run(settings: &Settings) -> Result<()> {
    println!("{}", "DevLog".bold().cyan());
    println!("{}", "Automated engineering journal".dimmed());
    println!();

    let db = Database::open(&settings.db_path())?;
    let learning_count = db.learning_count()?;
    let command_count = db.command_count()?;
    let unprocessed = db.unprocessed_count()?;

    println!("{}", "Database:".bold());
    println!("  Learnings recorded:  {learning_count}");
    println!("  Commands collected:  {command_count}");
    println!("  Awaiting next sync:  {unprocessed}");

    let today = db.get_learnings_since(1)?.len();
    println!("  Learned today:       {today}");

    if db.get_due_flashcard()?.is_some() {
        println!();
        println!(
            "{}",
            "A flashcard is due. Run 'devlog quiz' to review it.".yellow()
        );
    }

    println!();
    println!("{}", "Integrations:".bold());
    print_check(
        settings.gemini_api_key().is_some(),
        &format!("Gemini summaries ({})", settings.gemini_model()),
    );
    print_check(settings.github_remote_url().is_some(), "Journal remote");
    print_check(
        settings.journal_repo_path().join(".git").exists(),
        &format!("Journal repo at {}", settings.journal_repo_path().display()),
    );

    let repos = settings.git_repos();
    if !repos.is_empty() {
        println!();
        println!("{}", "Tracked repositories:".bold());
        for repo in repos {
            print_check(repo.exists(), &repo.display().to_string());
        }
    }

    if learning_count == 0 {
        println!();
        println!(
            "{}",
            "Hint: Run 'devlog learn \"...\"' to record your first learning".yellow()
        );
    }

    Ok(())
}

fn print_check(ok: bool, label: &str) {
    if ok {
        println!("  {} {label}", "✓".green());
    } else {
        println!("  {} {}", "○".dimmed(), label.dimmed());
    }
}
