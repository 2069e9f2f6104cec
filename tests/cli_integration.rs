//! Integration tests for the DevLog pipeline
//!
//! These tests exercise the store, collector, summarizer and publisher
//! through the library API using temporary homes, databases and git
//! repositories to ensure test isolation.

use chrono::{Duration, NaiveDate, Utc};
use devlog_cli::capture::{self, Shell};
use devlog_cli::config::{Config, Settings};
use devlog_cli::publish::{PublishOutcome, Publisher, PushStatus};
use devlog_cli::storage::Database;
use devlog_cli::summarize;
use devlog_cli::sync::run_daily_sync;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

// =============================================================================
// Test Helpers
// =============================================================================

/// Creates a test database in a temporary directory.
/// Returns the Database instance and the temp directory (which must be kept alive).
fn create_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("devlog.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    (db, dir)
}

/// Settings rooted in `root`: data dir at `root/data`, home at `root/home`.
fn create_test_settings(root: &Path, config: Config) -> Settings {
    let home = root.join("home");
    fs::create_dir_all(&home).expect("Failed to create home");
    Settings::new(
        root.join("data"),
        home,
        config,
        HashMap::new(),
        HashMap::new(),
    )
}

/// Initializes a repository at `path` with one commit per subject, all
/// dated `when`.
fn create_git_repo(path: &Path, subjects: &[&str], when: chrono::DateTime<Utc>) {
    let repo = git2::Repository::init(path).expect("Failed to init repo");
    let sig = git2::Signature::new(
        "Test",
        "test@example.com",
        &git2::Time::new(when.timestamp(), 0),
    )
    .expect("Failed to build signature");

    for subject in subjects {
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, subject, &tree, &parents)
            .expect("Failed to commit");
    }
}

fn march_7() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
}

// =============================================================================
// Store Tests
// =============================================================================

mod store_tests {
    use super::*;

    #[test]
    fn test_learning_round_trip_with_tags() {
        let (db, _dir) = create_test_db();
        let tags = vec!["k8s".to_string(), "networking".to_string()];

        let id = db
            .add_learning("NetworkPolicies are additive", &tags)
            .expect("Failed to add learning");

        let recent = db.get_learnings_since(0).expect("Failed to list");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert_eq!(recent[0].content, "NetworkPolicies are additive");
        assert_eq!(recent[0].tags, tags);
        assert_eq!(recent[0].review_count, 0);
        assert_eq!(recent[0].last_reviewed, recent[0].created_at);
    }

    #[test]
    fn test_flashcard_cycle() {
        let (db, _dir) = create_test_db();
        let now = Utc::now();

        db.add_learning_at("fresh", &[], now - Duration::days(1)).unwrap();
        let older = db
            .add_learning_at("older", &[], now - Duration::days(5))
            .unwrap();
        let oldest = db
            .add_learning_at("oldest", &[], now - Duration::days(9))
            .unwrap();

        let due = db.get_due_flashcard().unwrap().expect("A card should be due");
        assert_eq!(due.id, oldest);

        db.mark_reviewed(oldest).unwrap();
        let due = db.get_due_flashcard().unwrap().expect("A card should be due");
        assert_eq!(due.id, older);

        db.mark_reviewed(older).unwrap();
        assert!(db.get_due_flashcard().unwrap().is_none());

        let reviewed = db.get_learning(oldest).unwrap().unwrap();
        assert_eq!(reviewed.review_count, 1);
    }

    #[test]
    fn test_history_days_and_counts() {
        let (db, _dir) = create_test_db();
        let day = |d: u32, h: u32| {
            NaiveDate::from_ymd_opt(2024, 3, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
                .and_utc()
        };

        db.add_learning_at("a", &[], day(5, 9)).unwrap();
        db.add_learning_at("b", &[], day(7, 9)).unwrap();
        db.add_learning_at("c", &[], day(7, 17)).unwrap();

        let dates = db.get_all_logged_dates().unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            ]
        );

        let on_7th: Vec<String> = db
            .get_learnings_by_date(march_7())
            .unwrap()
            .into_iter()
            .map(|l| l.content)
            .collect();
        assert_eq!(on_7th, vec!["b", "c"]);
    }

    #[test]
    fn test_command_dedup_until_processed() {
        let (db, _dir) = create_test_db();

        assert!(db.store_raw_command("zsh_history", "make deploy").unwrap());
        assert!(!db.store_raw_command("bash_history", "make deploy").unwrap());
        assert_eq!(db.command_count().unwrap(), 1);

        let ids: Vec<i64> = db
            .get_unprocessed_commands()
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(db.mark_processed(&ids).unwrap(), 1);

        assert!(db.store_raw_command("zsh_history", "make deploy").unwrap());
        assert_eq!(db.command_count().unwrap(), 2);
        assert_eq!(db.unprocessed_count().unwrap(), 1);
    }
}

// =============================================================================
// Collector Tests
// =============================================================================

mod collector_tests {
    use super::*;

    #[test]
    fn test_collection_reads_history_and_git() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("api");
        create_git_repo(
            &repo_path,
            &["Add readiness probe", "Rotate token for deploy bot"],
            Utc::now() - Duration::hours(2),
        );

        let config = Config {
            git_repos: vec![
                repo_path.to_string_lossy().to_string(),
                dir.path().join("missing").to_string_lossy().to_string(),
            ],
            ..Config::default()
        };
        let settings = create_test_settings(dir.path(), config);

        fs::write(
            Shell::Zsh.history_file(settings.user_home()),
            ": 1709800000:0;kubectl rollout status deploy/api\n\
             : 1709800010:0;ls\n\
             : 1709800020:0;export DB_PASSWORD=hunter2\n",
        )
        .unwrap();
        fs::write(
            Shell::Bash.history_file(settings.user_home()),
            "terraform plan -out tfplan\nkubectl rollout status deploy/api\n",
        )
        .unwrap();

        let db = Database::open(&settings.db_path()).unwrap();
        let report = capture::run_collection(&db, &settings).expect("Collection failed");

        assert_eq!(report.history_stored, 2);
        assert_eq!(report.commits_stored, 1);
        assert_eq!(report.skipped_repos, vec![dir.path().join("missing")]);

        let stored: Vec<(String, String)> = db
            .get_unprocessed_commands()
            .unwrap()
            .into_iter()
            .map(|c| (c.source, c.command))
            .collect();
        assert!(stored.contains(&(
            "zsh_history".to_string(),
            "kubectl rollout status deploy/api".to_string()
        )));
        assert!(stored.contains(&(
            "bash_history".to_string(),
            "terraform plan -out tfplan".to_string()
        )));
        assert!(stored.contains(&(
            "git:api".to_string(),
            "git commit: Add readiness probe".to_string()
        )));
        assert!(stored.iter().all(|(_, c)| !c.contains("PASSWORD")));
        assert!(stored.iter().all(|(_, c)| !c.contains("Rotate token")));

        let again = capture::run_collection(&db, &settings).unwrap();
        assert_eq!(again.stored(), 0, "Unprocessed rows must not be duplicated");
    }

    #[test]
    fn test_collection_without_sources_is_empty() {
        let dir = tempdir().unwrap();
        let settings = create_test_settings(dir.path(), Config::default());
        let db = Database::open(&settings.db_path()).unwrap();

        let report = capture::run_collection(&db, &settings).unwrap();
        assert_eq!(report.stored(), 0);
        assert_eq!(report.history_lines_read, 0);
        assert!(report.skipped_repos.is_empty());
    }

    #[test]
    fn test_history_lines_limit_is_respected() {
        let dir = tempdir().unwrap();
        let config = Config {
            history_lines: Some(3),
            ..Config::default()
        };
        let settings = create_test_settings(dir.path(), config);

        let history: String = (0..10).map(|i| format!("cargo test shard_{i}\n")).collect();
        fs::write(Shell::Bash.history_file(settings.user_home()), history).unwrap();

        let db = Database::open(&settings.db_path()).unwrap();
        capture::run_collection(&db, &settings).unwrap();

        let commands: Vec<String> = db
            .get_unprocessed_commands()
            .unwrap()
            .into_iter()
            .map(|c| c.command)
            .collect();
        // The trailing newline uses one of the three lines.
        assert_eq!(commands.len(), 2);
        assert!(commands.contains(&"cargo test shard_9".to_string()));
        assert!(commands.contains(&"cargo test shard_8".to_string()));
    }

    #[test]
    fn test_prompt_cap_keeps_newest_history() {
        let dir = tempdir().unwrap();
        let settings = create_test_settings(dir.path(), Config::default());

        let history: String = (0..200)
            .map(|i| format!(": {}:0;terraform apply -target=module.m{i}\n", 1709800000 + i))
            .collect();
        fs::write(Shell::Zsh.history_file(settings.user_home()), history).unwrap();

        let db = Database::open(&settings.db_path()).unwrap();
        capture::run_collection(&db, &settings).unwrap();

        let commands: Vec<String> = db
            .get_unprocessed_commands()
            .unwrap()
            .into_iter()
            .map(|c| c.command)
            .collect();
        assert_eq!(
            commands.first().map(String::as_str),
            Some("terraform apply -target=module.m1")
        );
        assert_eq!(
            commands.last().map(String::as_str),
            Some("terraform apply -target=module.m199")
        );

        let kept = summarize::filter_commands(&commands);
        assert_eq!(kept.len(), 80);
        assert_eq!(kept[0], "terraform apply -target=module.m120");
        assert_eq!(kept[79], "terraform apply -target=module.m199");
    }
}

// =============================================================================
// Summarizer Tests
// =============================================================================

mod summarizer_tests {
    use super::*;

    #[test]
    fn test_fallback_without_api_key() {
        let dir = tempdir().unwrap();
        let settings = create_test_settings(dir.path(), Config::default());

        let summary = summarize::generate_daily_summary(&settings, &[], &[], march_7());
        assert_eq!(summary, "# March 07, 2024\n\n_Nothing recorded today._");
    }

    #[test]
    fn test_unreachable_provider_falls_back() {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let provider = summarize::GeminiProvider::with_base_url(
            client,
            "test-key".to_string(),
            "gemini-2.5-flash".to_string(),
            "http://127.0.0.1:9".to_string(),
        );

        let summary = summarize::summarize_with(
            &provider,
            &["helm upgrade api ./chart --atomic".to_string()],
            &["Atomic upgrades roll back on failure".to_string()],
            march_7(),
        );

        assert!(summary.starts_with("# March 07, 2024"));
        assert!(summary.contains("## Learnings"));
        assert!(summary.contains("helm upgrade api ./chart --atomic"));
    }
}

// =============================================================================
// Publisher and Sync Tests
// =============================================================================

mod publish_tests {
    use super::*;

    #[test]
    fn test_publish_path_and_commit_skip() {
        let dir = tempdir().unwrap();
        let publisher = Publisher::new(dir.path().join("journal"), None, None);

        let first = publisher.publish("# March 07, 2024\n", march_7()).unwrap();
        assert_eq!(
            first,
            PublishOutcome::Committed {
                path: PathBuf::from("2024/03-07.md"),
                push: PushStatus::NoRemote,
            }
        );
        assert!(dir.path().join("journal/2024/03-07.md").is_file());

        let second = publisher.publish("# March 07, 2024\n", march_7()).unwrap();
        assert!(matches!(second, PublishOutcome::NothingToCommit { .. }));
    }

    #[test]
    fn test_daily_sync_end_to_end() {
        let dir = tempdir().unwrap();
        let settings = create_test_settings(dir.path(), Config::default());
        fs::write(
            Shell::Bash.history_file(settings.user_home()),
            "docker build -t api:dev .\n",
        )
        .unwrap();

        let db = Database::open(&settings.db_path()).unwrap();
        db.add_learning("Multi-stage builds keep images small", &["docker".to_string()])
            .unwrap();

        let report = run_daily_sync(&db, &settings, march_7()).expect("Sync failed");
        assert_eq!(report.commands_summarized, 1);
        assert_eq!(report.learnings_summarized, 1);
        assert_eq!(report.marked_processed, 1);
        assert_eq!(db.unprocessed_count().unwrap(), 0);

        let entry = fs::read_to_string(settings.journal_repo_path().join("2024/03-07.md"))
            .expect("Entry should be written");
        assert!(entry.contains("- Multi-stage builds keep images small"));
        assert!(entry.contains("docker build -t api:dev ."));

        let repo = git2::Repository::open(settings.journal_repo_path()).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("DevLog auto-update: 2024-03-07"));
    }
}
