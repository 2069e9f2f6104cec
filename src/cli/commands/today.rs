//! Today command - preview the learnings going into today's entry.

use anyhow::Result;
use colored::Colorize;

use crate::cli::format::{print_header, print_learning};
use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::storage::Database;

/// Arguments for the today command.
#[derive(clap::Args)]
pub struct Args {
    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the today command.
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path())?;
    let learnings = db.get_learnings_since(1)?;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&learnings)?);
        return Ok(());
    }

    print_header("Today's Engineering Log");

    if learnings.is_empty() {
        println!(
            "  {}",
            "No learnings added today yet. Use 'devlog learn' to add one.".yellow()
        );
        println!();
        return Ok(());
    }

    for (idx, learning) in learnings.iter().enumerate() {
        print_learning(idx + 1, learning, false);
    }
    Ok(())
}
