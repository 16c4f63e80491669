//! Building the ecosystem's repository set.
//!
//! The set is seeded with the manifest's explicit URLs and extended with every
//! public repository of the listed organizations. References are deduplicated
//! by exact string identity; explicit URLs are not normalized.

use crate::github::fetcher::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::github::{ApiError, GitHubApi, StatsFetcher};
use crate::models::Manifest;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// GitHub rejects larger pages.
pub const MAX_PER_PAGE: u32 = 100;

/// Deduplicated repository references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySet {
    repos: BTreeSet<String>,
}

impl RepositorySet {
    /// Add a reference. Returns `false` if it was already present.
    pub fn insert(&mut self, reference: impl Into<String>) -> bool {
        self.repos.insert(reference.into())
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.repos.iter().map(String::as_str)
    }
}

/// Merges explicit repositories with organization listings.
///
/// Listing pages go through the fetcher, so rate-limited pages are retried
/// instead of cutting an organization short.
pub struct RepositorySetBuilder<'a, A, C = SystemClock, S = TokioSleeper> {
    fetcher: &'a StatsFetcher<'a, A, C, S>,
    per_page: u32,
}

impl<'a, A: GitHubApi, C: Clock, S: Sleeper> RepositorySetBuilder<'a, A, C, S> {
    pub fn new(fetcher: &'a StatsFetcher<'a, A, C, S>, per_page: u32) -> Self {
        Self {
            fetcher,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Build the repository set for a manifest.
    ///
    /// Organization listing failures are logged and skipped; repositories
    /// found before the failure are kept.
    pub async fn build(&self, manifest: &Manifest) -> RepositorySet {
        let mut repos = RepositorySet::default();

        for entry in &manifest.repo {
            repos.insert(entry.url.as_str());
        }
        info!("Number of repos before org scan: {}", repos.len());

        for org in manifest.organizations() {
            info!("Fetching public repositories for GitHub org {}", org);

            match self.scan_org(&org, &mut repos).await {
                Ok(found) => info!("Found {} public repos in org {}", found, org),
                Err(e) => warn!("Failed to list repositories for org {}: {}", org, e),
            }
        }
        info!("Number of repos after org scan: {}", repos.len());

        repos
    }

    /// Walk every listing page of `org`, inserting each public repository's URL.
    async fn scan_org(&self, org: &str, repos: &mut RepositorySet) -> Result<usize, ApiError> {
        let mut found = 0;
        let mut page = 1;

        loop {
            let batch = self.fetcher.list_org_page(org, page, self.per_page).await?;
            let batch_len = batch.len();

            for repo in batch.into_iter().filter(|r| !r.private) {
                if !repos.insert(repo.html_url) {
                    debug!("{}/{} already listed", org, repo.name);
                }
                found += 1;
            }

            if batch_len < self.per_page as usize {
                return Ok(found);
            }
            page += 1;
        }
    }
}
