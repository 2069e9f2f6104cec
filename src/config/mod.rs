//! Configuration management
//!
//! Settings come from three places: the process environment, a dotfile
//! (`.env.local` or `.env`) in the DevLog data directory, and
//! `config.yaml` in the same directory. [`Settings`] is built once at
//! startup and handed to every component that needs a secret or a path.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the data directory (defaults to `~/.devlog`).
pub const HOME_ENV: &str = "DEVLOG_HOME";

/// Environment keys that may carry secrets or endpoints.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const GITHUB_URL: &str = "GITHUB_URL";

const DOTFILE_CANDIDATES: [&str; 2] = [".env.local", ".env"];

/// Lines of shell history scanned per shell when not configured.
pub const DEFAULT_HISTORY_LINES: usize = 200;

/// Model used for summaries when `gemini.model` is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Keys accepted by `devlog config get/set`.
pub const CONFIG_KEYS: &[&str] = &[
    "github.repo",
    "github.remote_url",
    "gemini.api_key",
    "gemini.model",
    "git_repos",
    "history_lines",
];

/// The YAML document stored at `<data dir>/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Journal repository settings
    pub github: GithubConfig,

    /// Summary provider settings
    pub gemini: GeminiConfig,

    /// Repositories whose recent commit subjects are collected
    pub git_repos: Vec<String>,

    /// Shell history lines scanned per run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_lines: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GithubConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Config {
    /// Loads the config file.
    ///
    /// A missing file yields the defaults. A file that does not parse is
    /// reported and also yields the defaults, so a typo never blocks
    /// `devlog learn`.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to read config {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    /// Loads the config file, propagating parse errors.
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Writes the config file, creating the directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_saphyr::to_string(self).context("Failed to serialize config")?;
        fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Reads a single value by dotted key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "github.repo" => self.github.repo.clone(),
            "github.remote_url" => self.github.remote_url.clone(),
            "gemini.api_key" => self.gemini.api_key.clone(),
            "gemini.model" => self.gemini.model.clone(),
            "git_repos" => {
                if self.git_repos.is_empty() {
                    None
                } else {
                    Some(self.git_repos.join(","))
                }
            }
            "history_lines" => self.history_lines.map(|n| n.to_string()),
            other => bail!(
                "Unknown config key '{other}'. Valid keys: {}",
                CONFIG_KEYS.join(", ")
            ),
        };
        Ok(value)
    }

    /// Sets a single value by dotted key. An empty value clears the key.
    ///
    /// `git_repos` takes a comma-separated list; duplicates are dropped.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let optional = || {
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        match key {
            "github.repo" => self.github.repo = optional(),
            "github.remote_url" => self.github.remote_url = optional(),
            "gemini.api_key" => self.gemini.api_key = optional(),
            "gemini.model" => self.gemini.model = optional(),
            "git_repos" => {
                let mut repos: Vec<String> = Vec::new();
                for repo in value.split(',').map(str::trim).filter(|r| !r.is_empty()) {
                    if !repos.iter().any(|r| r == repo) {
                        repos.push(repo.to_string());
                    }
                }
                self.git_repos = repos;
            }
            "history_lines" => {
                self.history_lines = if value.is_empty() {
                    None
                } else {
                    let n: usize = value
                        .parse()
                        .with_context(|| format!("history_lines must be a number, got '{value}'"))?;
                    Some(n)
                };
            }
            other => bail!(
                "Unknown config key '{other}'. Valid keys: {}",
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

/// Resolved runtime settings.
///
/// Built once per process; components receive it by reference instead of
/// reading the environment themselves.
#[derive(Debug, Clone)]
pub struct Settings {
    data_dir: PathBuf,
    user_home: PathBuf,
    config: Config,
    env: HashMap<String, String>,
    dotfile: HashMap<String, String>,
}

impl Settings {
    /// Resolves settings from the real environment.
    pub fn load() -> Result<Self> {
        let user_home = dirs::home_dir().context("Could not find home directory")?;

        let data_dir = std::env::var(HOME_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| user_home.join(".devlog"));

        let env: HashMap<String, String> = [GEMINI_API_KEY, GITHUB_TOKEN, GITHUB_URL]
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();

        let dotfile = load_dotfile(&data_dir);
        let config = Config::load(&data_dir.join("config.yaml"));

        Ok(Self::new(data_dir, user_home, config, env, dotfile))
    }

    /// Assembles settings from already-resolved parts.
    pub fn new(
        data_dir: PathBuf,
        user_home: PathBuf,
        config: Config,
        env: HashMap<String, String>,
        dotfile: HashMap<String, String>,
    ) -> Self {
        Self {
            data_dir,
            user_home,
            config,
            env,
            dotfile,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn user_home(&self) -> &Path {
        &self.user_home
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.yaml")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("devlog.db")
    }

    /// The local working tree that receives the daily markdown files.
    pub fn journal_repo_path(&self) -> PathBuf {
        self.data_dir.join("repo")
    }

    pub fn history_lines(&self) -> usize {
        self.config.history_lines.unwrap_or(DEFAULT_HISTORY_LINES)
    }

    pub fn gemini_model(&self) -> String {
        self.config
            .gemini
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }

    /// Configured repositories with a leading `~` expanded.
    pub fn git_repos(&self) -> Vec<PathBuf> {
        self.config
            .git_repos
            .iter()
            .map(|p| expand_tilde(p, &self.user_home))
            .collect()
    }

    /// Environment first, then the dotfile. Empty values count as unset.
    fn lookup(&self, key: &str) -> Option<String> {
        self.env
            .get(key)
            .filter(|v| !v.is_empty())
            .or_else(|| self.dotfile.get(key).filter(|v| !v.is_empty()))
            .cloned()
    }

    /// API key for the summary provider: env, dotfile, then `gemini.api_key`.
    pub fn gemini_api_key(&self) -> Option<String> {
        self.lookup(GEMINI_API_KEY).or_else(|| {
            self.config
                .gemini
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
        })
    }

    /// Token used to authenticate pushes: env, then dotfile.
    pub fn github_token(&self) -> Option<String> {
        self.lookup(GITHUB_TOKEN)
    }

    /// Remote for the journal repo: env, dotfile, then `github.remote_url`.
    pub fn github_remote_url(&self) -> Option<String> {
        self.lookup(GITHUB_URL).or_else(|| {
            self.config
                .github
                .remote_url
                .clone()
                .filter(|u| !u.is_empty())
        })
    }
}

/// Reads the first dotfile present in `dir`.
///
/// Values are parsed without touching the process environment. An
/// unreadable file is logged and treated as empty.
pub fn load_dotfile(dir: &Path) -> HashMap<String, String> {
    let Some(path) = DOTFILE_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
    else {
        return HashMap::new();
    };

    let iter = match dotenvy::from_path_iter(&path) {
        Ok(iter) => iter,
        Err(e) => {
            tracing::warn!("Failed to open {}: {e}", path.display());
            return HashMap::new();
        }
    };

    let mut values = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                values.insert(key, value);
            }
            Err(e) => tracing::warn!("Skipping malformed line in {}: {e}", path.display()),
        }
    }
    values
}

/// Expands a leading `~` or `~/` against `home`.
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
