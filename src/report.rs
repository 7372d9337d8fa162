//! CSV rendering of aggregated pull requests.
//!
//! Two layouts exist. The lead-time layout is a compact five-column report; the
//! contribution layout adds repository and author columns and, when a target-author
//! filter was supplied, the logins of the targets that contributed to each PR.

use crate::config::RepoId;
use crate::lead_time::AggregatedPr;
use std::io::{self, Write};

/// GitHub's committer identity for commits made through the web UI.
pub const WEB_FLOW_LOGIN: &str = "web-flow";

const LEAD_TIME_HEADER: &str =
    r#""PR Title","Opening Date","Closing Date","PR Number","Lead Time (Days)""#;

const CONTRIBUTION_HEADER: &str =
    "repository_full_name,title,author,created_at,merged_at,number,lead_time_days";

/// Wraps a value in double quotes, doubling any embedded quotes.
pub fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Quotes a value only when it would otherwise break the row.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        csv_quote(value)
    } else {
        value.to_string()
    }
}

/// Orders records by creation time. Ties keep their aggregation order.
pub fn sort_by_creation(records: &mut [AggregatedPr]) {
    records.sort_by_key(|pr| pr.created_at.at());
}

/// Writes the five-column lead-time report.
pub fn write_lead_time_csv<W: Write>(out: &mut W, records: &[AggregatedPr]) -> io::Result<()> {
    writeln!(out, "{LEAD_TIME_HEADER}")?;
    for pr in records {
        writeln!(
            out,
            "{},{},{},{},{:.2}",
            csv_quote(&pr.title),
            pr.created_at,
            pr.merged_at,
            pr.number,
            pr.lead_time_days
        )?;
    }
    Ok(())
}

/// Writes the per-repository contribution report.
///
/// The `target_authors` column is only present when `with_target_authors` is set.
pub fn write_contribution_csv<W: Write>(
    out: &mut W,
    repo_id: &RepoId,
    records: &[AggregatedPr],
    with_target_authors: bool,
) -> io::Result<()> {
    if with_target_authors {
        writeln!(out, "{CONTRIBUTION_HEADER},\"target_authors\"")?;
    } else {
        writeln!(out, "{CONTRIBUTION_HEADER}")?;
    }

    let repository = csv_field(&repo_id.to_string());
    for pr in records {
        write!(
            out,
            "{},{},{},{},{},{},{:.2}",
            repository,
            csv_quote(&pr.title),
            csv_field(&pr.author),
            pr.created_at,
            pr.merged_at,
            pr.number,
            pr.lead_time_days
        )?;
        if with_target_authors {
            let logins: Vec<&str> = pr
                .target_authors
                .iter()
                .map(String::as_str)
                .filter(|login| *login != WEB_FLOW_LOGIN)
                .collect();
            write!(out, ",{}", csv_quote(&logins.join(",")))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
