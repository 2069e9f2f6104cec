//! Completions command - generate shell completion scripts.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    devlog completions bash > ~/.local/share/bash-completion/completions/devlog\n    \
    devlog completions zsh > ~/.zfunc/_devlog\n    \
    devlog completions fish > ~/.config/fish/completions/devlog.fish")]
pub struct Args {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Writes the completion script for `shell` to stdout.
///
/// Called from main.rs, which owns the `Cli` definition.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    generate(shell, cmd, "devlog", &mut io::stdout());
}
