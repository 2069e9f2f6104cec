//! Search command - substring search across learnings.

use anyhow::Result;
use colored::Colorize;

use crate::cli::format::{pluralize, print_header, print_learning};
use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::storage::Database;

/// Arguments for the search command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    devlog search helm                Learnings mentioning helm\n    \
    devlog search \"node drain\"        Multi-word phrase\n    \
    devlog search 100% --format json  Literal %, output as JSON")]
pub struct Args {
    /// Keyword to search for
    pub keyword: String,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the search command.
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path())?;
    let results = db.search_learnings(&args.keyword)?;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print_header(&format!("Search: '{}'", args.keyword));

    if results.is_empty() {
        println!("  {}", "No learnings found.".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {}",
        format!("{} found", pluralize(results.len(), "result")).cyan()
    );
    println!();
    for (idx, learning) in results.iter().enumerate() {
        print_learning(idx + 1, learning, true);
    }
    Ok(())
}
