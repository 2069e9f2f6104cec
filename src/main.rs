use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod capture;
mod cli;
mod config;
mod git;
mod publish;
mod storage;
mod summarize;
mod sync;

use cli::commands;
use config::Settings;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "devlog")]
#[command(version)]
#[command(about = "Automated engineering journal - learnings, flashcards and daily logs")]
#[command(long_about = "DevLog records what you learn, quizzes you on it later, and turns\n\
    each day's shell history and commits into a markdown journal entry\n\
    pushed to a git repository.")]
#[command(after_help = "EXAMPLES:\n    \
    devlog learn \"PDBs block node drains\" --tags k8s\n    \
    devlog today                 Preview today's learnings\n    \
    devlog quiz                  Review a due flashcard\n    \
    devlog search helm           Search learnings\n    \
    devlog history 2024-03-07    Learnings from one day\n    \
    devlog push                  Collect, summarize, commit and push\n\n\
    For more information about a command, run 'devlog <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Store a new learning
    Learn(commands::learn::Args),

    /// Preview the learnings recorded in the last day
    Today(commands::today::Args),

    /// Collect activity, write today's entry, commit and push
    #[command(long_about = "Runs the daily sync: reads shell history and the last 24 hours\n\
        of commits from tracked repositories, summarizes them together with\n\
        today's learnings (Gemini when GEMINI_API_KEY is set, a static\n\
        rendering otherwise), writes <year>/<MM-DD>.md into the journal\n\
        repository, commits, and pushes to the configured remote.")]
    Push(commands::push::Args),

    /// Review the flashcard that is due
    Quiz(commands::quiz::Args),

    /// Search learnings for a keyword
    Search(commands::search::Args),

    /// Browse past learnings by date
    History(commands::history::Args),

    /// Show database counts and configured integrations
    Status,

    /// View and manage configuration settings
    #[command(long_about = "Provides subcommands to show, get, and set configuration values.\n\
        Configuration is stored in ~/.devlog/config.yaml (or $DEVLOG_HOME).")]
    Config(commands::config::Args),

    /// Generate shell completion scripts
    Completions(commands::completions::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "devlog=debug"
    } else {
        "devlog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Commands::Completions(args) = &cli.command {
        commands::completions::generate_completions(&mut Cli::command(), args.shell);
        return Ok(());
    }

    let settings = Settings::load()?;

    match cli.command {
        Commands::Learn(args) => commands::learn::run(args, &settings),
        Commands::Today(args) => commands::today::run(args, &settings),
        Commands::Push(args) => commands::push::run(args, &settings),
        Commands::Quiz(args) => commands::quiz::run(args, &settings),
        Commands::Search(args) => commands::search::run(args, &settings),
        Commands::History(args) => commands::history::run(args, &settings),
        Commands::Status => commands::status::run(&settings),
        Commands::Config(args) => commands::config::run(args, &settings),
        Commands::Completions(_) => Ok(()),
    }
}
