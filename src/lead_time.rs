use crate::config::TargetAuthors;
use crate::types::{Commit, PullRequest, Timestamp};
use std::collections::{HashMap, HashSet};

const SECONDS_PER_DAY: f64 = 60.0 * 60.0 * 24.0;

/// A merged pull request, finalized the first time it was seen merged.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPr {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub created_at: Timestamp,
    pub merged_at: Timestamp,
    pub lead_time_days: f64,
    /// Lowercased target-author logins that contributed before the PR was finalized.
    pub target_authors: Vec<String>,
}

/// Elapsed days between creation and merge, at millisecond precision.
pub fn lead_time_days(created_at: &Timestamp, merged_at: &Timestamp) -> f64 {
    let elapsed = merged_at.at() - created_at.at();
    elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Folds commits and their associated pull requests into one record per merged PR.
///
/// Commits must be fed in the order the commit listing returned them. A PR is
/// recorded once, at its first merged encounter, and the target authors captured
/// at that moment are never revised by later commits.
#[derive(Debug, Default)]
pub struct LeadTimeAggregator {
    target_authors: TargetAuthors,
    contributors: HashMap<u64, Vec<String>>,
    seen: HashSet<u64>,
    records: Vec<AggregatedPr>,
}

impl LeadTimeAggregator {
    pub fn new(target_authors: TargetAuthors) -> Self {
        Self {
            target_authors,
            ..Self::default()
        }
    }

    /// Whether the commit's author or committer is one of the target authors.
    fn is_target_contribution(&self, commit: &Commit) -> bool {
        if self.target_authors.is_empty() {
            return false;
        }
        [commit.author_login(), commit.committer_login()]
            .into_iter()
            .flatten()
            .any(|login| self.target_authors.contains(login))
    }

    /// Records one commit together with the pull requests associated with it.
    pub fn add_commit(&mut self, commit: &Commit, prs: &[PullRequest]) {
        let target_contribution = self.is_target_contribution(commit);

        for pr in prs {
            if target_contribution {
                let logins = self.contributors.entry(pr.number).or_default();
                for login in [commit.author_login(), commit.committer_login()]
                    .into_iter()
                    .flatten()
                {
                    let login = login.to_lowercase();
                    if !logins.contains(&login) {
                        logins.push(login);
                    }
                }
            }

            let Some(merged_at) = &pr.merged_at else {
                continue;
            };
            if !self.seen.insert(pr.number) {
                continue;
            }

            self.records.push(AggregatedPr {
                number: pr.number,
                title: pr.title.clone(),
                author: pr.author_login().to_string(),
                created_at: pr.created_at.clone(),
                merged_at: merged_at.clone(),
                lead_time_days: lead_time_days(&pr.created_at, merged_at),
                target_authors: self
                    .contributors
                    .get(&pr.number)
                    .cloned()
                    .unwrap_or_default(),
            });
        }
    }

    /// The finalized records, in insertion order.
    pub fn into_records(self) -> Vec<AggregatedPr> {
        self.records
    }
}
