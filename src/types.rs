//! GitHub API payloads, reduced to the fields lead-time reporting reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// An ISO-8601 instant that remembers the exact text GitHub sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    at: DateTime<Utc>,
}

impl Timestamp {
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        let at = DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc);
        Ok(Self {
            raw: raw.to_string(),
            at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A GitHub account as embedded in commit and pull request payloads.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub login: String,
}

/// An entry of `GET /repos/{owner}/{repo}/commits`.
///
/// `author` and `committer` are the linked GitHub accounts, which are `null` when
/// the git identity doesn't map to a user.
#[derive(Clone, Debug, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub author: Option<Account>,
    #[serde(default)]
    pub committer: Option<Account>,
}

impl Commit {
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }

    pub fn committer_login(&self) -> Option<&str> {
        self.committer.as_ref().map(|c| c.login.as_str())
    }
}

/// An entry of `GET /repos/{owner}/{repo}/commits/{sha}/pulls`.
#[derive(Clone, Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub user: Option<Account>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub merged_at: Option<Timestamp>,
}

impl PullRequest {
    /// Login of the account that opened the pull request.
    pub fn author_login(&self) -> &str {
        self.user.as_ref().map_or("unknown", |u| u.login.as_str())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_keeps_original_text() {
        let ts = Timestamp::parse("2024-03-05T10:20:30Z").unwrap();
        assert_eq!(ts.to_string(), "2024-03-05T10:20:30Z");
        assert_eq!(ts.at(), Utc.with_ymd_and_hms(2024, 3, 5, 10, 20, 30).unwrap());

        let offset = Timestamp::parse("2024-03-05T12:20:30+02:00").unwrap();
        assert_eq!(offset.as_str(), "2024-03-05T12:20:30+02:00");
        assert_eq!(offset.at(), ts.at());
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_commit_with_unlinked_accounts() {
        let json = r#"{
            "sha": "abc123",
            "commit": { "message": "fix" },
            "author": null,
            "committer": { "login": "web-flow", "id": 19864447 }
        }"#;
        let commit: Commit = serde_json::from_str(json).unwrap();

        assert_eq!(commit.sha, "abc123");
        assert_eq!(commit.author_login(), None);
        assert_eq!(commit.committer_login(), Some("web-flow"));
    }

    #[test]
    fn test_commit_without_account_fields() {
        let commit: Commit = serde_json::from_str(r#"{ "sha": "def456" }"#).unwrap();
        assert!(commit.author.is_none());
        assert!(commit.committer.is_none());
    }

    #[test]
    fn test_pull_request_payload() {
        let json = r#"{
            "number": 42,
            "title": "Fix \"bug\" in parser",
            "state": "closed",
            "user": { "login": "alice" },
            "created_at": "2024-01-01T00:00:00Z",
            "merged_at": "2024-01-03T00:00:00Z"
        }"#;
        let pr: PullRequest = serde_json::from_str(json).unwrap();

        assert_eq!(pr.number, 42);
        assert_eq!(pr.title, "Fix \"bug\" in parser");
        assert_eq!(pr.author_login(), "alice");
        assert_eq!(pr.merged_at.unwrap().as_str(), "2024-01-03T00:00:00Z");
    }

    #[test]
    fn test_unmerged_pull_request_defaults() {
        let json = r#"{
            "number": 7,
            "title": null,
            "user": null,
            "created_at": "2024-01-01T00:00:00Z",
            "merged_at": null
        }"#;
        let pr: PullRequest = serde_json::from_str(json).unwrap();

        assert_eq!(pr.title, "");
        assert_eq!(pr.author_login(), "unknown");
        assert!(pr.merged_at.is_none());
    }
}
