use clap::Parser;
use pr_lead_time::config::{AppConfig, RepoId, RunConfig};
use pr_lead_time::github::GitHubClient;
use pr_lead_time::ReportKind;
use std::process::ExitCode;

/// Report the lead time of every merged pull request that touched a path
#[derive(Parser)]
#[command(name = "pr-lead-time")]
#[command(long_about = r#"pr-lead-time - Lead time of merged PRs that touched a path

Prints a CSV report to stdout; progress goes to stderr.

REQUIREMENTS:
    GITHUB_TOKEN must be set (directly or in a .env file)"#)]
struct Args {
    /// Repository owner (user or organization)
    owner: String,

    /// Repository name
    repo: String,

    /// File or directory path inside the repository
    path: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    pr_lead_time::init_tracing();

    let app_config = match AppConfig::load() {
        Ok(config) => config,
        Err(envy::Error::MissingValue(field)) => {
            tracing::error!("Error: {} environment variable is not set.", field.to_uppercase());
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let repo_id = match RepoId::new(&args.owner, &args.repo) {
        Ok(repo_id) => repo_id,
        Err(e) => {
            tracing::error!("Invalid repository: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match GitHubClient::new(&app_config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create GitHub client: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = RunConfig::new(
        repo_id,
        args.path,
        app_config.per_page(),
    );

    let outcome = pr_lead_time::run(
        &client,
        &config,
        ReportKind::LeadTime,
        &mut std::io::stdout(),
    )
    .await;
    tracing::debug!(?outcome, "Run finished");

    ExitCode::SUCCESS
}
