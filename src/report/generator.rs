//! Report rendering.
//!
//! Text output is line-oriented so it can be piped into other tools:
//! `YEAR-MONTH, COUNT` per month and `YYYY-MM-DD, COUNT` per week.

use crate::models::{ContributorStats, MonthlyCount, Report, WeeklyCount};
use anyhow::Result;

/// One line per month, oldest first.
pub fn render_monthly(counts: &[MonthlyCount]) -> String {
    counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per week, oldest first.
pub fn render_weekly(counts: &[WeeklyCount]) -> String {
    counts
        .iter()
        .map(|c| format!("{}, {}", c.week.format("%Y-%m-%d"), c.contributors))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-contributor listing for a single repository.
pub fn render_contributors(stats: &[ContributorStats]) -> String {
    let mut lines = Vec::with_capacity(stats.len() + 1);
    lines.push("login\tid\tcommits\tweeks\tadditions\tdeletions".to_string());

    for c in stats {
        let (login, id) = match &c.author {
            Some(author) => (author.login.as_str(), author.id.to_string()),
            None => ("(deleted)", "-".to_string()),
        };
        let additions: u64 = c.weeks.iter().map(|w| w.additions).sum();
        let deletions: u64 = c.weeks.iter().map(|w| w.deletions).sum();
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            login,
            id,
            c.total,
            c.weeks.len(),
            additions,
            deletions
        ));
    }

    lines.join("\n")
}

/// Generate the plain-text report: weekly lines (if present), a blank
/// line, then monthly lines.
pub fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    if let Some(ref weekly) = report.weekly {
        if !weekly.is_empty() {
            output.push_str(&render_weekly(weekly));
            output.push_str("\n\n");
        }
    }

    output.push_str(&render_monthly(&report.monthly));
    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
