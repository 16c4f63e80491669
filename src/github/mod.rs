//! GitHub API access.
//!
//! This module provides the REST client and the retrying statistics fetcher.

pub mod client;
pub mod error;
pub mod fetcher;

#[cfg(test)]
pub mod mock;

pub use client::{GitHubApi, GitHubClient};
pub use error::ApiError;
pub use fetcher::{RetryPolicy, StatsFetcher};
