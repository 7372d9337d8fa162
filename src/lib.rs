pub mod config;
pub mod fetcher;
pub mod github;
pub mod lead_time;
pub mod report;
pub mod types;

use config::RunConfig;
use github::HostingApi;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Which CSV layout a run emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// Title, dates, number and lead time.
    LeadTime,
    /// Repository, title, author, dates, number, lead time and optionally target authors.
    Contribution,
}

/// How a run ended. Only `Reported` wrote anything to the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Reported { rows: usize },
    NoCommits,
    NoMergedPullRequests,
    Failed,
}

/// Filter used when `RUST_LOG` is unset. Each binary logs under its own target.
pub const DEFAULT_LOG_DIRECTIVE: &str = "pr_lead_time=info,pr_author_lead_time=info";

/// Installs the diagnostic subscriber. Everything goes to stderr so stdout stays pure CSV.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_DIRECTIVE.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Runs the whole pipeline and writes the CSV report to `out`.
///
/// Failures are logged rather than returned. Nothing is written to `out` unless the
/// report was fully rendered.
pub async fn run<W: Write>(
    api: &dyn HostingApi,
    config: &RunConfig,
    kind: ReportKind,
    out: &mut W,
) -> RunOutcome {
    let (outcome, csv) = match build_report(api, config, kind).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("An error occurred: {:#}", e);
            return RunOutcome::Failed;
        }
    };

    if let RunOutcome::Reported { .. } = outcome {
        if let Err(e) = out.write_all(&csv).and_then(|()| out.flush()) {
            tracing::error!("Failed to write CSV output: {}", e);
            return RunOutcome::Failed;
        }
    }

    outcome
}

/// Fetches, aggregates and renders into memory.
async fn build_report(
    api: &dyn HostingApi,
    config: &RunConfig,
    kind: ReportKind,
) -> anyhow::Result<(RunOutcome, Vec<u8>)> {
    tracing::info!(
        "Searching for PRs affecting path \"{}\" in repository {}...",
        config.path,
        config.repo_id
    );

    let commits = fetcher::fetch_commits(api, config).await?;
    if commits.is_empty() {
        tracing::info!("No commits found for the specified path.");
        return Ok((RunOutcome::NoCommits, Vec::new()));
    }

    tracing::info!(
        "Found {} commits. Analyzing associated pull requests...",
        commits.len()
    );

    let mut records = fetcher::collect_lead_times(api, config, &commits).await?;
    if records.is_empty() {
        tracing::info!(
            "No merged pull requests were found associated with the commits for this path."
        );
        return Ok((RunOutcome::NoMergedPullRequests, Vec::new()));
    }

    report::sort_by_creation(&mut records);
    tracing::info!(
        "Processing complete. Found {} unique, merged PRs.",
        records.len()
    );

    let mut csv = Vec::new();
    match kind {
        ReportKind::LeadTime => report::write_lead_time_csv(&mut csv, &records)?,
        ReportKind::Contribution => report::write_contribution_csv(
            &mut csv,
            &config.repo_id,
            &records,
            !config.target_authors.is_empty(),
        )?,
    }

    Ok((
        RunOutcome::Reported {
            rows: records.len(),
        },
        csv,
    ))
}
