//! Data models for ecosystem contributor statistics.
//!
//! This module contains the input manifest, the contributor statistics
//! returned by the GitHub API, and the derived weekly/monthly counts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Platform-assigned numeric account id.
pub type ContributorId = u64;

/// Week-start timestamp as labelled by the statistics API.
pub type WeekBucket = DateTime<Utc>;

/// A repository entry in the ecosystem manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub url: String,
}

/// The ecosystem manifest: explicit repositories plus organizations to scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Explicitly listed repositories.
    #[serde(default)]
    pub repo: Vec<RepoEntry>,
    /// Organizations whose public repositories belong to the ecosystem.
    /// Entries may be URLs; only the last path segment is used.
    #[serde(default)]
    pub github_organizations: Vec<String>,
}

impl Manifest {
    /// Load a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Organization identifiers (final path segment of each entry).
    pub fn organizations(&self) -> Vec<String> {
        self.github_organizations
            .iter()
            .filter_map(|o| {
                o.trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(String::from)
            })
            .collect()
    }
}

/// A repository record from the organization listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgRepository {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub private: bool,
}

/// The account a contributor entry belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: ContributorId,
    pub login: String,
}

/// One week of a contributor's activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekActivity {
    /// Start of the week.
    #[serde(rename = "w", with = "chrono::serde::ts_seconds")]
    pub week: WeekBucket,
    /// Number of additions.
    #[serde(rename = "a", default)]
    pub additions: u64,
    /// Number of deletions.
    #[serde(rename = "d", default)]
    pub deletions: u64,
    /// Number of commits.
    #[serde(rename = "c", default)]
    pub commits: u64,
}

/// Per-contributor statistics for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorStats {
    /// `None` for deleted ("ghost") accounts.
    pub author: Option<Author>,
    /// Total commit count.
    #[serde(default)]
    pub total: u64,
    /// Weekly activity, oldest first.
    #[serde(default)]
    pub weeks: Vec<WeekActivity>,
}

impl ContributorStats {
    /// Weeks with at least one commit.
    pub fn active_weeks(&self) -> impl Iterator<Item = &WeekActivity> {
        self.weeks.iter().filter(|w| w.commits > 0)
    }
}

/// Distinct contributors active in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCount {
    pub week: WeekBucket,
    pub contributors: usize,
}

/// Distinct contributors active in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    pub contributors: usize,
}

impl MonthlyCount {
    pub fn new(year: i32, month: u32, contributors: usize) -> Self {
        Self {
            year,
            month,
            contributors,
        }
    }
}

impl fmt::Display for MonthlyCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}, {}", self.year, self.month, self.contributors)
    }
}

/// Outcome counts for one run over the repository set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Repositories in the deduplicated set.
    pub repositories: usize,
    /// Repositories whose statistics were fetched and folded in.
    pub processed: usize,
    /// References that could not be parsed into owner/name.
    pub skipped: usize,
    /// Repositories whose statistics could not be fetched.
    pub failed: usize,
}

/// The ecosystem activity report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Manifest path or repository URL the report covers.
    pub source: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    /// Weekly counts, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly: Option<Vec<WeeklyCount>>,
    pub monthly: Vec<MonthlyCount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "repo": [{"url": "https://github.com/a/b"}, {"url": "https://github.com/c/d"}],
            "github_organizations": ["https://github.com/org-one", "org-two"]
        }"#;

        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.repo.len(), 2);
        assert_eq!(manifest.repo[0].url, "https://github.com/a/b");
        assert_eq!(manifest.organizations(), vec!["org-one", "org-two"]);
    }

    #[test]
    fn test_manifest_missing_fields_default_to_empty() {
        let manifest = Manifest::from_json(r#"{"repo": []}"#).unwrap();
        assert!(manifest.github_organizations.is_empty());
    }

    #[test]
    fn test_manifest_corrupt_is_error() {
        assert!(Manifest::from_json("{not json").is_err());
        assert!(Manifest::from_json(r#"{"repo": "nope"}"#).is_err());
    }

    #[test]
    fn test_manifest_load_missing_file() {
        let err = Manifest::load(Path::new("/definitely/not/here/stacks.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }

    #[test]
    fn test_manifest_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"repo": [{{"url": "https://github.com/x/y"}}], "github_organizations": []}}"#
        )
        .unwrap();

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.repo[0].url, "https://github.com/x/y");
    }

    #[test]
    fn test_organizations_trailing_slash_and_empty() {
        let manifest = Manifest {
            repo: vec![],
            github_organizations: vec![
                "https://github.com/solana-labs/".to_string(),
                "".to_string(),
            ],
        };
        assert_eq!(manifest.organizations(), vec!["solana-labs"]);
    }

    #[test]
    fn test_parse_contributor_stats() {
        let json = r#"[{
            "author": {"login": "octocat", "id": 583231, "type": "User"},
            "total": 3,
            "weeks": [
                {"w": 1367712000, "a": 10, "d": 2, "c": 0},
                {"w": 1368316800, "a": 5, "d": 1, "c": 3}
            ]
        }, {
            "author": null,
            "total": 1,
            "weeks": []
        }]"#;

        let stats: Vec<ContributorStats> = serde_json::from_str(json).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].author.as_ref().unwrap().id, 583231);
        assert_eq!(
            stats[0].weeks[1].week,
            Utc.with_ymd_and_hms(2013, 5, 12, 0, 0, 0).unwrap()
        );
        assert_eq!(stats[0].active_weeks().count(), 1);
        assert!(stats[1].author.is_none());
    }

    #[test]
    fn test_monthly_count_display() {
        assert_eq!(MonthlyCount::new(2023, 1, 3).to_string(), "2023-1, 3");
        assert_eq!(MonthlyCount::new(2022, 11, 4).to_string(), "2022-11, 4");
    }
}
