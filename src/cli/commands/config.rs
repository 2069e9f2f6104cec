//! Config command - view and edit `config.yaml`.
//!
//! `show` prints the effective settings with secrets masked. `get` and
//! `set` operate on the YAML file only.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::config::{Config, Settings};

#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    devlog config                                   Show effective settings\n    \
    devlog config get gemini.model                  Print one value\n    \
    devlog config set git_repos ~/src/api,~/src/infra\n    \
    devlog config set github.remote_url \"\"          Clear a value")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value (empty clears it)
    Set { key: String, value: String },
}

pub fn run(args: Args, settings: &Settings) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(settings),
        Some(ConfigCommand::Get { key }) => get_config(settings, &key),
        Some(ConfigCommand::Set { key, value }) => set_config(settings, &key, &value),
    }
}

fn show_config(settings: &Settings) -> Result<()> {
    println!("{}", "DevLog Configuration".bold());
    println!();
    println!("  {}  {}", "Data dir:   ".dimmed(), settings.data_dir().display());
    println!("  {}  {}", "Config file:".dimmed(), settings.config_path().display());
    println!("  {}  {}", "Database:   ".dimmed(), settings.db_path().display());
    println!(
        "  {}  {}",
        "Journal:    ".dimmed(),
        settings.journal_repo_path().display()
    );

    println!();
    println!("{}", "Summaries:".bold());
    println!("  {}  {}", "Model:  ".dimmed(), settings.gemini_model());
    println!(
        "  {}  {}",
        "API key:".dimmed(),
        settings
            .gemini_api_key()
            .map(|k| mask_secret(&k))
            .unwrap_or_else(|| "not set (static summaries)".to_string())
    );

    println!();
    println!("{}", "Publishing:".bold());
    println!(
        "  {}  {}",
        "Remote:".dimmed(),
        settings
            .github_remote_url()
            .unwrap_or_else(|| "not set (commits stay local)".to_string())
    );
    println!(
        "  {}  {}",
        "Token: ".dimmed(),
        settings
            .github_token()
            .map(|t| mask_secret(&t))
            .unwrap_or_else(|| "not set".to_string())
    );

    println!();
    println!("{}", "Collection:".bold());
    println!("  {}  {}", "History lines:".dimmed(), settings.history_lines());
    let repos = settings.git_repos();
    if repos.is_empty() {
        println!("  {}  none", "Git repos:    ".dimmed());
    } else {
        println!("  {}", "Git repos:".dimmed());
        for repo in repos {
            let marker = if repo.exists() {
                "✓".green()
            } else {
                "✗".red()
            };
            println!("    {marker} {}", repo.display());
        }
    }

    Ok(())
}

fn get_config(settings: &Settings, key: &str) -> Result<()> {
    let config = Config::try_load(&settings.config_path())?;
    match config.get(key)? {
        Some(value) => println!("{value}"),
        None => println!("{}", format!("Config key '{key}' is not set").yellow()),
    }
    Ok(())
}

fn set_config(settings: &Settings, key: &str, value: &str) -> Result<()> {
    let path = settings.config_path();
    let mut config = Config::try_load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;

    let shown = if key == "gemini.api_key" {
        mask_secret(value)
    } else {
        value.to_string()
    };
    println!("{}", format!("Set {key} = {shown}").green());
    Ok(())
}

/// Keeps the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
