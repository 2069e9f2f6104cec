//! Learn command - record a new learning.

use anyhow::Result;
use colored::Colorize;

use crate::config::Settings;
use crate::storage::Database;

/// Arguments for the learn command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    devlog learn \"PDBs block node drains\"\n    \
    devlog learn \"terraform state mv keeps resources\" --tags terraform,state")]
pub struct Args {
    /// The text of what you learned
    pub content: String,

    /// Comma-separated tags
    #[arg(short, long, value_delimiter = ',', value_name = "TAGS")]
    pub tags: Vec<String>,
}

/// Executes the learn command.
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let tags = clean_tags(&args.tags);

    let db = Database::open(&settings.db_path())?;
    let id = db.add_learning(&args.content, &tags)?;

    println!();
    println!("{}", format!("Added learning #{id} successfully.").green());
    println!();
    Ok(())
}

/// Trims tags and drops empty ones, keeping order.
fn clean_tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
