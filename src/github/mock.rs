//! In-memory GitHub API for tests.

use super::client::GitHubApi;
use super::error::ApiError;
use crate::models::{Author, ContributorStats, OrgRepository, WeekActivity, WeekBucket};
use chrono::{TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

type StatsResponse = Result<Vec<ContributorStats>, ApiError>;
type ListingResponse = Result<Vec<OrgRepository>, ApiError>;

/// Scripted responses keyed by organization / `owner/repo`.
///
/// Responses for one listing page or one repository are consumed in order;
/// the last one repeats.
#[derive(Default)]
pub struct MockGitHub {
    org_pages: RefCell<HashMap<String, Vec<VecDeque<ListingResponse>>>>,
    stats: RefCell<HashMap<String, VecDeque<StatsResponse>>>,
    stats_calls: Cell<u32>,
    listing_calls: RefCell<Vec<(String, u32, u32)>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page to an organization's listing.
    pub fn with_org_page(self, org: &str, page: ListingResponse) -> Self {
        self.with_org_page_responses(org, vec![page])
    }

    /// Append a page whose successive requests get `responses`.
    pub fn with_org_page_responses(self, org: &str, responses: Vec<ListingResponse>) -> Self {
        self.org_pages
            .borrow_mut()
            .entry(org.to_string())
            .or_default()
            .push(responses.into_iter().collect());
        self
    }

    pub fn with_stats(self, key: &str, responses: Vec<StatsResponse>) -> Self {
        self.stats
            .borrow_mut()
            .insert(key.to_string(), responses.into_iter().collect());
        self
    }

    pub fn stats_calls(&self) -> u32 {
        self.stats_calls.get()
    }

    pub fn listing_calls(&self) -> Vec<(String, u32, u32)> {
        self.listing_calls.borrow().clone()
    }
}

impl GitHubApi for MockGitHub {
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<OrgRepository>, ApiError> {
        self.listing_calls
            .borrow_mut()
            .push((org.to_string(), page, per_page));

        let mut org_pages = self.org_pages.borrow_mut();
        let pages = org_pages
            .get_mut(org)
            .ok_or_else(|| ApiError::NotFound(org.to_string()))?;

        match pages.get_mut(page as usize - 1) {
            Some(queue) => next_response(queue),
            None => Ok(vec![]),
        }
    }

    async fn contributor_stats(&self, owner: &str, repo: &str) -> StatsResponse {
        self.stats_calls.set(self.stats_calls.get() + 1);

        let key = format!("{}/{}", owner, repo);
        let mut stats = self.stats.borrow_mut();
        let queue = stats
            .get_mut(&key)
            .ok_or_else(|| ApiError::NotFound(key.clone()))?;

        next_response(queue)
    }
}

fn next_response<T: Clone>(queue: &mut VecDeque<Result<Vec<T>, ApiError>>) -> Result<Vec<T>, ApiError> {
    if queue.len() > 1 {
        queue.pop_front().unwrap_or(Ok(vec![]))
    } else {
        queue.front().cloned().unwrap_or(Ok(vec![]))
    }
}

pub fn org_repo(owner: &str, name: &str) -> OrgRepository {
    OrgRepository {
        name: name.to_string(),
        html_url: format!("https://github.com/{}/{}", owner, name),
        private: false,
    }
}

pub fn week(year: i32, month: u32, day: u32) -> WeekBucket {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Contributor `id` with `(week, commits)` entries.
pub fn contributor(id: u64, weeks: &[(WeekBucket, u64)]) -> ContributorStats {
    ContributorStats {
        author: Some(Author {
            id,
            login: format!("user{}", id),
        }),
        total: weeks.iter().map(|(_, c)| c).sum(),
        weeks: weeks
            .iter()
            .map(|(w, c)| WeekActivity {
                week: *w,
                additions: 0,
                deletions: 0,
                commits: *c,
            })
            .collect(),
    }
}
