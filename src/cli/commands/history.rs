//! History command - browse learnings by calendar day.
//!
//! Without a date, lists every day that has at least one learning with
//! the number recorded that day. With a date, shows that day's
//! learnings in the order they were recorded.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;

use crate::cli::format::{pluralize, print_header, print_learning};
use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::storage::Database;

/// Arguments for the history command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    devlog history               List days with learnings\n    \
    devlog history 2024-03-07    Show one day")]
pub struct Args {
    /// Day to show (YYYY-MM-DD); omit to list all days
    #[arg(value_name = "DATE")]
    pub date: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct DaySummary {
    date: NaiveDate,
    count: usize,
}

/// Executes the history command.
pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path())?;

    match args.date {
        Some(raw) => show_day(&db, parse_date(&raw)?, args.format),
        None => list_days(&db, args.format),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{raw}', expected YYYY-MM-DD"))
}

fn show_day(db: &Database, date: NaiveDate, format: OutputFormat) -> Result<()> {
    let learnings = db.get_learnings_by_date(date)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&learnings)?);
        return Ok(());
    }

    print_header(&format!("DevLog: {date}"));

    if learnings.is_empty() {
        println!("  {}", format!("No learnings recorded on {date}.").yellow());
        println!();
        return Ok(());
    }

    for (idx, learning) in learnings.iter().enumerate() {
        print_learning(idx + 1, learning, false);
    }
    Ok(())
}

fn list_days(db: &Database, format: OutputFormat) -> Result<()> {
    let mut days = Vec::new();
    for date in db.get_all_logged_dates()? {
        let count = db.get_learnings_by_date(date)?.len();
        days.push(DaySummary { date, count });
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }

    print_header("DevLog History");

    if days.is_empty() {
        println!(
            "  {}",
            "No history yet. Start with 'devlog learn'.".yellow()
        );
        println!();
        return Ok(());
    }

    println!(
        "  {}",
        format!(
            "You have logged learnings on {}:",
            pluralize(days.len(), "day")
        )
        .cyan()
    );
    println!();
    for day in &days {
        println!(
            "  {} {}  {}",
            "▸".green(),
            day.date,
            format!("({})", pluralize(day.count, "learning")).cyan()
        );
    }
    println!();
    println!(
        "  {}",
        "To view a specific day: devlog history YYYY-MM-DD".yellow()
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
        assert_eq!(
            parse_date(" 2024-03-07 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        let err = parse_date("03/07/2024").unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
        assert!(parse_date("2024-02-30").is_err());
    }
}
