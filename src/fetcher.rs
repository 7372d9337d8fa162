use crate::config::RunConfig;
use crate::github::HostingApi;
use crate::lead_time::{AggregatedPr, LeadTimeAggregator};
use crate::types::Commit;
use anyhow::Result;

/// Walks the commit listing for the configured path until a short page comes back.
pub async fn fetch_commits(api: &dyn HostingApi, config: &RunConfig) -> Result<Vec<Commit>> {
    let mut commits = Vec::new();
    let mut page = 1;

    loop {
        let batch = api
            .list_commits_page(&config.repo_id, &config.path, config.per_page, page)
            .await?;
        let batch_len = batch.len();
        commits.extend(batch);

        if batch_len < usize::from(config.per_page) {
            break;
        }
        page += 1;
    }

    tracing::debug!(pages = page, commits = commits.len(), "Commit listing exhausted");
    Ok(commits)
}

/// Resolves the pull requests of every commit, in listing order, and aggregates them.
///
/// This separates data retrieval and aggregation from CSV rendering.
pub async fn collect_lead_times(
    api: &dyn HostingApi,
    config: &RunConfig,
    commits: &[Commit],
) -> Result<Vec<AggregatedPr>> {
    let mut aggregator = LeadTimeAggregator::new(config.target_authors.clone());

    for commit in commits {
        let prs = api
            .pull_requests_for_commit(&config.repo_id, &commit.sha)
            .await?;
        tracing::debug!(sha = %commit.sha, prs = prs.len(), "Resolved associated pull requests");
        aggregator.add_commit(commit, &prs);
    }

    Ok(aggregator.into_records())
}
