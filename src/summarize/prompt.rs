//! Prompt construction and the static fallback rendering.
//!
//! Both paths share [`filter_commands`], which is narrower than the
//! collector's validity filter: it also drops read-only inspection
//! commands (`git status`, `docker ps`, ...) that say nothing about what
//! was actually done.

use chrono::NaiveDate;

/// Commands that carry no signal for the journal, matched on the whole
/// command, its first word (when followed by at most one argument), or
/// its first two words.
const NOISE_COMMANDS: &[&str] = &[
    "ls", "ll", "la", "l", "cd", "pwd", "clear", "cls", "exit", "history", "cat", "echo", "man",
    "whoami", "date", "which", "type", "alias", "git status", "git log", "git diff",
    "git branch", "git fetch", "kubectl get pods", "kubectl get nodes", "kubectl get svc",
    "docker ps", "docker images", "top", "htop", "ps", "df", "du",
];

/// Most recent meaningful commands kept for the prompt.
pub const MAX_PROMPT_COMMANDS: usize = 80;

/// Commands listed verbatim in the fallback document.
pub const MAX_FALLBACK_COMMANDS: usize = 60;

/// Heading date, e.g. "March 07, 2024".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Drops noise and keeps the [`MAX_PROMPT_COMMANDS`] most recent
/// survivors, preserving input order.
pub fn filter_commands(commands: &[String]) -> Vec<String> {
    let filtered: Vec<String> = commands
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && !is_noise(c))
        .map(str::to_string)
        .collect();

    let skip = filtered.len().saturating_sub(MAX_PROMPT_COMMANDS);
    filtered.into_iter().skip(skip).collect()
}

fn is_noise(cmd: &str) -> bool {
    let tokens: Vec<&str> = cmd.split_whitespace().collect();
    let base = tokens.first().copied().unwrap_or_default();
    let first_two = tokens.iter().take(2).copied().collect::<Vec<_>>().join(" ");

    NOISE_COMMANDS.contains(&cmd)
        || (NOISE_COMMANDS.contains(&base) && tokens.len() < 3)
        || NOISE_COMMANDS.contains(&first_two.as_str())
}

/// The fixed system instruction sent with every request.
pub fn system_prompt() -> &'static str {
    "You keep a technical journal for a cloud and DevOps engineer. \
     Turn one day of raw terminal activity into an honest engineering log \
     written by the engineer, for the engineer.\n\n\
     Rules:\n\
     - The reader ran these commands. Never explain basic tools.\n\
     - Every statement must be traceable to a specific command or recorded learning.\n\
     - Omit any section you have nothing grounded to say about. Never write filler \
     such as \"nothing to report\".\n\
     - No emojis. Bold only the term being defined.\n\
     - Output GitHub-flavored Markdown only, with no preamble and no sign-off."
}

/// Builds the user turn for one day.
///
/// `commands` should already be filtered.
pub fn build_user_prompt(date: NaiveDate, commands: &[String], learnings: &[String]) -> String {
    let date = format_date(date);

    let commands_block = if commands.is_empty() {
        "_None._".to_string()
    } else {
        commands.join("\n")
    };

    let learnings_block = if learnings.is_empty() {
        "_None recorded today._".to_string()
    } else {
        learnings
            .iter()
            .map(|l| format!("- {l}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Today: {date}\n\
         \n\
         ## Commands run today (noise removed)\n\
         ```\n\
         {commands_block}\n\
         ```\n\
         \n\
         ## Learnings recorded by hand today\n\
         {learnings_block}\n\
         \n\
         ---\n\
         \n\
         Write a journal entry for the day with the structure below. Include a \
         section only when the input above gives you real material for it.\n\
         \n\
         # {date}\n\
         \n\
         ## What I worked on\n\
         Two to four sentences telling the story behind the command clusters. \
         Name the services, resources and flags involved.\n\
         \n\
         ## Key commands worth keeping\n\
         | Command | Why it matters |\n\
         |---------|----------------|\n\
         Only non-obvious, flag-heavy or situational invocations, one line each.\n\
         \n\
         ## Learnings\n\
         The hand-recorded learnings first, then facts implied by the commands, each \
         as `- **topic**: reusable rule`.\n\
         \n\
         ## Friction & anti-patterns\n\
         Retries, forced flags, permission workarounds or repeated failures, quoting \
         the command and naming the better approach.\n\
         \n\
         ## Open threads\n\
         Work that looks unfinished: a deploy never verified, a resource left in a \
         temporary state. One concrete line each.\n\
         \n\
         Return only the markdown, starting with the `# {date}` heading."
    )
}

/// Renders the day without a language model.
///
/// Learnings are listed as bullets, then up to [`MAX_FALLBACK_COMMANDS`]
/// filtered commands in a fenced block. An empty day is a single
/// "Nothing recorded today." line under the heading.
pub fn render_fallback(date: NaiveDate, commands: &[String], learnings: &[String]) -> String {
    let meaningful = filter_commands(commands);
    let mut lines = vec![format!("# {}", format_date(date)), String::new()];

    if !learnings.is_empty() {
        lines.push("## Learnings".to_string());
        lines.push(String::new());
        lines.extend(learnings.iter().map(|l| format!("- {l}")));
        lines.push(String::new());
    }

    if !meaningful.is_empty() {
        lines.push("## Commands".to_string());
        lines.push(String::new());
        lines.push("```".to_string());
        lines.extend(meaningful.iter().take(MAX_FALLBACK_COMMANDS).cloned());
        if meaningful.len() > MAX_FALLBACK_COMMANDS {
            lines.push(format!(
                "# ... and {} more",
                meaningful.len() - MAX_FALLBACK_COMMANDS
            ));
        }
        lines.push("```".to_string());
        lines.push(String::new());
    }

    if learnings.is_empty() && meaningful.is_empty() {
        lines.push("_Nothing recorded today._".to_string());
    }

    lines.join("\n")
}
