//! Journal repository publishing.
//!
//! Writes the day's markdown into a dedicated working tree, commits it
//! and pushes to the configured remote. Local work (init, identity,
//! staging, committing) goes through libgit2. Pull and push shell out to
//! `git` so the token embedded in the remote URL and any credential
//! helpers are honored.
//!
//! Push problems never fail a publish; they come back as
//! [`PushStatus::Failed`] with credentials redacted.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::git::{self, GitError};

/// Branch the journal lives on.
pub const BRANCH: &str = "main";

/// Remote name the journal pushes to.
pub const REMOTE: &str = "origin";

const BOT_NAME: &str = "DevLog Bot";
const BOT_EMAIL: &str = "devlog@local";

/// What happened to the push step.
#[derive(Debug, Clone, PartialEq)]
pub enum PushStatus {
    /// The branch was pushed.
    Pushed,
    /// No remote URL is configured; the commit stays local.
    NoRemote,
    /// The push was attempted and failed.
    Failed(String),
}

/// Result of a publish.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    /// A new commit was created.
    Committed {
        /// File written, relative to the repository root.
        path: PathBuf,
        push: PushStatus,
    },
    /// The file already had this content; no commit was made and nothing
    /// was pushed.
    NothingToCommit {
        /// File written, relative to the repository root.
        path: PathBuf,
    },
}

impl PublishOutcome {
    pub fn path(&self) -> &Path {
        match self {
            PublishOutcome::Committed { path, .. } | PublishOutcome::NothingToCommit { path } => {
                path
            }
        }
    }
}

/// Builds the push URL for `base`.
///
/// When a token is present, the URL is HTTPS and it carries no
/// credentials yet, the token becomes the userinfo component. Anything
/// else is returned unchanged.
pub fn authenticated_remote_url(base: &str, token: Option<&str>) -> String {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => match base.strip_prefix("https://") {
            Some(rest) if !base.contains('@') => format!("https://{token}@{rest}"),
            _ => base.to_string(),
        },
        None => base.to_string(),
    }
}

/// Path of the file for `date`, relative to the repository root.
pub fn entry_path(date: NaiveDate) -> PathBuf {
    PathBuf::from(date.year().to_string()).join(format!("{}.md", date.format("%m-%d")))
}

/// Publishes markdown into one journal working tree.
pub struct Publisher {
    repo_path: PathBuf,
    remote_url: Option<String>,
    token: Option<String>,
}

impl Publisher {
    pub fn new(repo_path: PathBuf, remote_url: Option<String>, token: Option<String>) -> Self {
        Self {
            repo_path,
            remote_url,
            token,
        }
    }

    /// Uses the journal path, remote URL and token from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.journal_repo_path(),
            settings.github_remote_url(),
            settings.github_token(),
        )
    }

    /// Writes, commits and pushes `markdown` as the entry for `date`.
    pub fn publish(&self, markdown: &str, date: NaiveDate) -> Result<PublishOutcome> {
        let repo = self.ensure_repo()?;
        self.reconcile_remote(&repo)?;

        let relative = entry_path(date);
        let absolute = self.repo_path.join(&relative);
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&absolute, markdown)
            .with_context(|| format!("Failed to write {}", absolute.display()))?;

        if !commit_all(&repo, date).context("Failed to commit journal entry")? {
            tracing::info!("Nothing to commit for {}", relative.display());
            return Ok(PublishOutcome::NothingToCommit { path: relative });
        }
        tracing::info!("Committed {}", relative.display());

        let push = self.push();
        Ok(PublishOutcome::Committed {
            path: relative,
            push,
        })
    }

    /// Opens the working tree, initializing it on `main` when absent.
    fn ensure_repo(&self) -> Result<git2::Repository> {
        let repo = match git::open_repo(&self.repo_path) {
            Ok(repo) => repo,
            Err(GitError::NotARepository(_)) => {
                fs::create_dir_all(&self.repo_path).with_context(|| {
                    format!("Failed to create {}", self.repo_path.display())
                })?;
                let mut opts = git2::RepositoryInitOptions::new();
                opts.initial_head(BRANCH);
                let repo = git2::Repository::init_opts(&self.repo_path, &opts)
                    .context("Failed to initialize journal repository")?;
                tracing::info!("Initialized journal repository at {}", self.repo_path.display());
                repo
            }
            Err(e) => return Err(e.into()),
        };

        ensure_identity(&repo)?;
        Ok(repo)
    }

    /// Adds or updates `origin` to point at the configured URL.
    fn reconcile_remote(&self, repo: &git2::Repository) -> Result<()> {
        let Some(base) = &self.remote_url else {
            return Ok(());
        };
        let url = authenticated_remote_url(base, self.token.as_deref());

        match repo.find_remote(REMOTE) {
            Ok(remote) if remote.url() == Some(url.as_str()) => {}
            Ok(_) => {
                repo.remote_set_url(REMOTE, &url)
                    .context("Failed to update origin")?;
                tracing::debug!("Updated origin remote");
            }
            Err(_) => {
                repo.remote(REMOTE, &url).context("Failed to add origin")?;
                tracing::debug!("Added origin remote");
            }
        }
        Ok(())
    }

    /// Rebases onto the remote branch when it exists, then pushes.
    fn push(&self) -> PushStatus {
        if self.remote_url.is_none() {
            return PushStatus::NoRemote;
        }

        if let Err(e) = git::run_git(&self.repo_path, &["pull", "--rebase", REMOTE, BRANCH]) {
            tracing::debug!("Pull before push skipped: {}", self.redact(&e.to_string()));
            // A conflicting rebase leaves the tree mid-operation.
            let _ = git::run_git(&self.repo_path, &["rebase", "--abort"]);
        }

        match git::run_git(&self.repo_path, &["push", "--set-upstream", REMOTE, BRANCH]) {
            Ok(()) => {
                tracing::info!("Pushed journal to {REMOTE}/{BRANCH}");
                PushStatus::Pushed
            }
            Err(e) => {
                let reason = self.redact(&e.to_string());
                tracing::warn!("Push failed: {reason}");
                PushStatus::Failed(reason)
            }
        }
    }

    fn redact(&self, text: &str) -> String {
        match self.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => text.replace(token, "***"),
            None => text.to_string(),
        }
    }
}

/// Sets the bot identity in the repository config when no config level
/// (local, global or system) provides one.
fn ensure_identity(repo: &git2::Repository) -> Result<()> {
    let merged = repo
        .config()
        .and_then(|mut c| c.snapshot())
        .context("Failed to read git config")?;
    let mut local = repo
        .config()
        .and_then(|c| c.open_level(git2::ConfigLevel::Local))
        .context("Failed to open repository config")?;

    if merged.get_string("user.name").is_err() {
        local.set_str("user.name", BOT_NAME)?;
    }
    if merged.get_string("user.email").is_err() {
        local.set_str("user.email", BOT_EMAIL)?;
    }
    Ok(())
}

/// Stages every change and commits it.
///
/// Returns `false` without committing when the staged tree matches HEAD.
fn commit_all(repo: &git2::Repository, date: NaiveDate) -> std::result::Result<bool, git2::Error> {
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"].iter(), None)?;
    index.write()?;
    let tree_id = index.write_tree()?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if matches!(e.code(), git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound) => {
            None
        }
        Err(e) => return Err(e),
    };

    if parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
        return Ok(false);
    }

    let tree = repo.find_tree(tree_id)?;
    let signature = repo
        .signature()
        .or_else(|_| git2::Signature::now(BOT_NAME, BOT_EMAIL))?;
    let message = format!("DevLog auto-update: {}", date.format("%Y-%m-%d"));
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, &message, &tree, &parents)?;
    Ok(true)
}

/// Publishes `markdown` as the entry for `date` to the journal configured
/// in `settings`.
pub fn publish_and_push(
    settings: &Settings,
    markdown: &str,
    date: NaiveDate,
) -> Result<PublishOutcome> {
    Publisher::from_settings(settings).publish(markdown, date)
}
