use crate::config::{route_segment, AppConfig, RepoId};
use crate::types::{Commit, PullRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Serialize;

/// The two hosting-service queries a lead-time run is built from.
///
/// `GitHubClient` talks to the real API; tests substitute an in-memory source.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Returns one page (1-based) of the commits that modified `path`, newest first.
    async fn list_commits_page(
        &self,
        repo_id: &RepoId,
        path: &str,
        per_page: u8,
        page: u32,
    ) -> Result<Vec<Commit>>;

    /// Returns the pull requests GitHub associates with a commit.
    async fn pull_requests_for_commit(
        &self,
        repo_id: &RepoId,
        sha: &str,
    ) -> Result<Vec<PullRequest>>;
}

#[derive(Serialize)]
struct ListCommitsParams<'a> {
    path: &'a str,
    per_page: u8,
    page: u32,
}

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(config.github_token.clone());
        if let Some(url) = &config.github_api_url {
            builder = builder
                .base_uri(url.as_str())
                .with_context(|| format!("invalid GITHUB_API_URL {url}"))?;
        }

        Ok(Self {
            octocrab: builder.build()?,
        })
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn list_commits_page(
        &self,
        repo_id: &RepoId,
        path: &str,
        per_page: u8,
        page: u32,
    ) -> Result<Vec<Commit>> {
        let route = format!("/repos/{}/{}/commits", repo_id.owner, repo_id.repo);
        let params = ListCommitsParams {
            path,
            per_page,
            page,
        };

        let commits: Vec<Commit> = self
            .octocrab
            .get(&route, Some(&params))
            .await
            .with_context(|| format!("listing commits for {path} in {repo_id} (page {page})"))?;

        Ok(commits)
    }

    async fn pull_requests_for_commit(
        &self,
        repo_id: &RepoId,
        sha: &str,
    ) -> Result<Vec<PullRequest>> {
        let sha = route_segment("commit sha", sha)?;
        let route = format!(
            "/repos/{}/{}/commits/{}/pulls",
            repo_id.owner, repo_id.repo, sha
        );

        let prs: Vec<PullRequest> = self
            .octocrab
            .get(&route, None::<&()>)
            .await
            .with_context(|| format!("listing pull requests for commit {sha} in {repo_id}"))?;

        Ok(prs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_rejects_invalid_base_uri() {
        let config = AppConfig {
            github_token: "ghp_test".to_string(),
            github_api_url: Some("not a uri".to_string()),
            commits_per_page: 100,
        };
        assert!(GitHubClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_client_builds_with_enterprise_uri() {
        let config = AppConfig {
            github_token: "ghp_test".to_string(),
            github_api_url: Some("https://github.example.com/api/v3".to_string()),
            commits_per_page: 100,
        };
        assert!(GitHubClient::new(&config).is_ok());
    }

    #[test]
    fn test_list_commits_params_shape() {
        let params = ListCommitsParams {
            path: "src/lib.rs",
            per_page: 100,
            page: 2,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["path"], "src/lib.rs");
        assert_eq!(json["per_page"], 100);
        assert_eq!(json["page"], 2);
    }
}
