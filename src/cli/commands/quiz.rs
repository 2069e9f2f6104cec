//! Quiz command - review the flashcard that is due.
//!
//! With `--auto` the command is meant for a shell startup hook: it
//! prints nothing when no card is due, never waits for input, and marks
//! a shown card as reviewed immediately.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::config::Settings;
use crate::storage::{Database, Learning};

/// Arguments for the quiz command.
#[derive(clap::Args)]
#[command(after_help = "HOOK:\n    \
    Add 'devlog quiz --auto' to the end of ~/.zshrc or ~/.bashrc to see a\n    \
    due flashcard whenever a terminal opens.")]
pub struct Args {
    /// Headless mode for shell hooks
    #[arg(long)]
    pub auto: bool,
}

/// Executes the quiz command.
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path())?;

    let Some(card) = db.get_due_flashcard()? else {
        if !args.auto {
            println!();
            println!(
                "{}",
                "No learnings are due for review. You're all caught up!".green()
            );
            println!();
        }
        return Ok(());
    };

    print_card(&card);

    if !args.auto {
        print!("  {}", "Press Enter to mark as reviewed...".bold());
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
    }

    db.mark_reviewed(card.id)?;

    if !args.auto {
        println!("  {}", "Marked as reviewed. Keep it up!".green());
        println!();
    }
    Ok(())
}

fn print_card(card: &Learning) {
    let title = " DevLog Flashcard ";
    let width = card
        .content
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.len() + 4);

    println!();
    println!(
        "  {}",
        format!("╭─{title}{}╮", "─".repeat(width + 1 - title.len())).cyan()
    );
    for line in card.content.lines() {
        let pad = width - line.chars().count();
        println!("  {} {line}{} {}", "│".cyan(), " ".repeat(pad), "│".cyan());
    }
    println!("  {}", format!("╰{}╯", "─".repeat(width + 2)).cyan());

    if let Some(tags) = card.tags_display() {
        println!("  {}", format!("tags: {tags}").yellow());
    }
    println!(
        "  {}",
        format!(
            "recorded {} · reviewed {} time(s)",
            card.created_at.format("%Y-%m-%d"),
            card.review_count
        )
        .dimmed()
    );
    println!();
}
