//! Application configuration and environment variable parsing.
//!
//! This module handles loading configuration settings from the environment (e.g., .env file).
//! It defines `AppConfig`, which carries the GitHub credentials and paging settings, and
//! `RunConfig`, the explicit value handed to every stage of a lead-time run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest page size the GitHub REST API accepts.
pub const MAX_PER_PAGE: u8 = 100;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl RepoId {
    /// Builds repository coordinates, rejecting values that are not a single route segment.
    pub fn new(owner: &str, repo: &str) -> anyhow::Result<Self> {
        Ok(Self {
            owner: route_segment("owner", owner)?,
            repo: route_segment("repository", repo)?,
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Trims a value and checks it can be spliced into an API route as one segment.
pub fn route_segment(label: &str, value: &str) -> anyhow::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        anyhow::bail!("{label} must not be empty");
    }
    if value.contains(['/', '\\', '?', '#'])
        || value.contains("..")
        || value.contains(char::is_whitespace)
    {
        anyhow::bail!("invalid {label} \"{value}\"");
    }
    Ok(value.to_string())
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub Personal Access Token used for every API call.
    pub github_token: String,

    /// Base URI of the GitHub API, for GitHub Enterprise installations.
    pub github_api_url: Option<String>,

    /// Page size used when listing the commits that touched a path.
    #[serde(default = "default_commits_per_page")]
    pub commits_per_page: u8,
}

fn default_commits_per_page() -> u8 {
    MAX_PER_PAGE
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Reads a `.env` file from the working directory, if any, then the environment.
    pub fn load() -> Result<Self, envy::Error> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_env()
    }

    /// The configured page size, clamped to what the API accepts.
    pub fn per_page(&self) -> u8 {
        self.commits_per_page.clamp(1, MAX_PER_PAGE)
    }
}

/// Lowercased logins whose commits are attributed to the pull requests they landed in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetAuthors(Vec<String>);

impl TargetAuthors {
    /// Parses a comma-separated login list. Blank entries are dropped.
    pub fn parse(list: &str) -> Self {
        let mut logins: Vec<String> = Vec::new();
        for login in list.split(',').map(str::trim).filter(|l| !l.is_empty()) {
            let login = login.to_lowercase();
            if !logins.contains(&login) {
                logins.push(login);
            }
        }
        Self(logins)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, login: &str) -> bool {
        let login = login.to_lowercase();
        self.0.iter().any(|target| *target == login)
    }

    pub fn logins(&self) -> &[String] {
        &self.0
    }
}

/// Everything a single run needs, built once at startup.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub repo_id: RepoId,
    /// Repository path whose history is analysed.
    pub path: String,
    pub per_page: u8,
    pub target_authors: TargetAuthors,
}

impl RunConfig {
    pub fn new(repo_id: RepoId, path: impl Into<String>, per_page: u8) -> Self {
        Self {
            repo_id,
            path: path.into(),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            target_authors: TargetAuthors::default(),
        }
    }

    pub fn with_target_authors(mut self, target_authors: TargetAuthors) -> Self {
        self.target_authors = target_authors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_config_from_env() {
        env::set_var("GITHUB_TOKEN", "ghp_test");
        env::set_var("GITHUB_API_URL", "https://github.example.com/api/v3");
        env::set_var("COMMITS_PER_PAGE", "50");

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.github_token, "ghp_test");
        assert_eq!(
            config.github_api_url.as_deref(),
            Some("https://github.example.com/api/v3")
        );
        assert_eq!(config.per_page(), 50);

        env::remove_var("GITHUB_TOKEN");
        env::remove_var("GITHUB_API_URL");
        env::remove_var("COMMITS_PER_PAGE");
    }

    #[test]
    #[serial]
    fn test_config_defaults_page_size() {
        env::set_var("GITHUB_TOKEN", "ghp_test");
        env::remove_var("COMMITS_PER_PAGE");
        env::remove_var("GITHUB_API_URL");

        let config = AppConfig::from_env().expect("Failed to load config");
        assert_eq!(config.per_page(), MAX_PER_PAGE);
        assert!(config.github_api_url.is_none());

        env::remove_var("GITHUB_TOKEN");
    }

    #[test]
    #[serial]
    fn test_config_missing_token() {
        env::remove_var("GITHUB_TOKEN");
        let result = AppConfig::from_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_per_page_is_clamped() {
        let config = AppConfig {
            github_token: "t".to_string(),
            github_api_url: None,
            commits_per_page: 250,
        };
        assert_eq!(config.per_page(), 100);

        let run = RunConfig::new(RepoId::new("o", "r").unwrap(), "src", 0);
        assert_eq!(run.per_page, 1);
    }

    #[test]
    fn test_repo_id_trims_segments() {
        let repo_id = RepoId::new(" rust-lang ", "rust\n").unwrap();
        assert_eq!(repo_id.to_string(), "rust-lang/rust");
    }

    #[test]
    fn test_repo_id_rejects_route_injection() {
        assert!(RepoId::new("rust-lang", "../rust").is_err());
        assert!(RepoId::new("rust-lang", "rust/pulls").is_err());
        assert!(RepoId::new("rust lang", "rust").is_err());
        assert!(RepoId::new("", "rust").is_err());
        assert!(RepoId::new("rust-lang", "rust?page=2").is_err());
    }

    #[test]
    fn test_route_segment_accepts_dotted_names() {
        assert_eq!(route_segment("repository", "socket.io").unwrap(), "socket.io");
        assert_eq!(route_segment("repository", ".github").unwrap(), ".github");
    }

    #[test]
    fn test_target_authors_parse() {
        let authors = TargetAuthors::parse(" Alice, ,bob,ALICE,");
        assert_eq!(authors.logins(), ["alice", "bob"]);
        assert!(authors.contains("BOB"));
        assert!(!authors.contains("carol"));
        assert!(TargetAuthors::parse("").is_empty());
        assert!(TargetAuthors::parse(" , ").is_empty());
    }
}
