//! Git integration.
//!
//! Local reads (recent commit subjects, repository discovery) go through
//! libgit2. Operations that talk to a remote shell out to the `git`
//! binary so URL credentials and the user's credential helpers apply.

use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors from git operations.
///
/// Callers pick a policy per variant: the collector skips repositories
/// that are not git repositories, the publisher reports push failures.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The path does not exist or is not inside a git repository.
    #[error("{0} is not a git repository")]
    NotARepository(PathBuf),

    /// The `git` binary could not be started.
    #[error("git binary unavailable: {0}")]
    Unavailable(#[source] io::Error),

    /// A `git` invocation exited with a non-zero status.
    #[error("`git {command}` failed ({status}): {stderr}")]
    Failed {
        /// The arguments passed to git.
        command: String,
        /// Exit status, or "signal" when killed.
        status: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// libgit2 reported an error.
    #[error("git error: {0}")]
    Libgit2(#[from] git2::Error),
}

/// Runs `git <args>` in `dir` and waits for it to finish.
///
/// Non-zero exit maps to [`GitError::Failed`]; a missing binary maps to
/// [`GitError::Unavailable`].
pub fn run_git(dir: &Path, args: &[&str]) -> Result<(), GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(GitError::Unavailable)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let status = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(GitError::Failed {
            command: args.join(" "),
            status,
            stderr: if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            },
        });
    }

    Ok(())
}

/// Opens the repository rooted at `path`.
///
/// Only the path itself is considered; parent directories are not
/// searched, so a configured path that merely lives inside another
/// repository is rejected.
pub fn open_repo(path: &Path) -> Result<git2::Repository, GitError> {
    if !path.exists() {
        return Err(GitError::NotARepository(path.to_path_buf()));
    }
    git2::Repository::open(path).map_err(|e| match e.code() {
        git2::ErrorCode::NotFound => GitError::NotARepository(path.to_path_buf()),
        _ => GitError::Libgit2(e),
    })
}

/// Subjects of commits reachable from HEAD committed at or after `since`,
/// newest first.
///
/// A repository without commits yields an empty list.
pub fn commit_subjects_since(path: &Path, since: DateTime<Utc>) -> Result<Vec<String>, GitError> {
    let repo = open_repo(path)?;

    match repo.head() {
        Ok(_) => {}
        Err(e) if matches!(e.code(), git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound) => {
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    }

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(git2::Sort::TIME)?;
    revwalk.push_head()?;

    let cutoff = since.timestamp();
    let mut subjects = Vec::new();
    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        if commit.time().seconds() < cutoff {
            break;
        }
        if let Some(summary) = commit.summary() {
            subjects.push(summary.to_string());
        }
    }

    Ok(subjects)
}

/// The final path component, used to label commit sources.
pub fn repo_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use git2::{Repository, Signature, Time};
    use tempfile::tempdir;

    fn commit_at(repo: &Repository, message: &str, when: DateTime<Utc>) {
        let sig = Signature::new("Test", "test@example.com", &Time::new(when.timestamp(), 0))
            .expect("signature");
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .expect("commit");
    }

    #[test]
    fn test_commit_subjects_since_filters_by_time() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let now = Utc::now();

        commit_at(&repo, "old work\n\nbody text", now - Duration::days(3));
        commit_at(&repo, "Add retry to webhook handler", now - Duration::hours(5));
        commit_at(&repo, "Fix flaky integration test\n\ndetails", now - Duration::minutes(10));

        let subjects = commit_subjects_since(dir.path(), now - Duration::hours(24)).unwrap();
        assert_eq!(
            subjects,
            vec!["Fix flaky integration test", "Add retry to webhook handler"]
        );
    }

    #[test]
    fn test_commit_subjects_empty_repo() {
        let dir = tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let subjects = commit_subjects_since(dir.path(), Utc::now()).unwrap();
        assert!(subjects.is_empty());
    }

    #[test]
    fn test_open_repo_rejects_plain_and_missing_dirs() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            open_repo(dir.path()),
            Err(GitError::NotARepository(_))
        ));
        assert!(matches!(
            open_repo(&dir.path().join("missing")),
            Err(GitError::NotARepository(_))
        ));
    }

    #[test]
    fn test_run_git_reports_failure() {
        let dir = tempdir().unwrap();
        match run_git(dir.path(), &["definitely-not-a-subcommand"]) {
            Err(GitError::Failed { command, .. }) => {
                assert_eq!(command, "definitely-not-a-subcommand");
            }
            // Environments without git report the binary as unavailable.
            Err(GitError::Unavailable(_)) => {}
            other => panic!("Expected failure, got: {other:?}"),
        }
    }

    #[test]
    fn test_repo_name() {
        assert_eq!(repo_name(Path::new("/home/dev/src/api")), "api");
    }

    #[test]
    fn test_error_display() {
        let err = GitError::NotARepository(PathBuf::from("/tmp/x"));
        assert!(err.to_string().contains("not a git repository"));

        let err = GitError::Failed {
            command: "push origin main".to_string(),
            status: "1".to_string(),
            stderr: "rejected".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("push origin main"));
        assert!(msg.contains("rejected"));
    }
}
