//! GitHub REST API client.
//!
//! Thin wrapper over `reqwest` that knows the two endpoints ecostats needs
//! and maps HTTP responses onto [`ApiError`].

use super::error::ApiError;
use crate::config::GitHubConfig;
use crate::models::{ContributorStats, OrgRepository};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// The subset of the GitHub API used to build and measure an ecosystem.
#[allow(async_fn_in_trait)]
pub trait GitHubApi {
    /// One page (1-based) of an organization's public repositories.
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<OrgRepository>, ApiError>;

    /// Weekly contributor statistics for a repository.
    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<ContributorStats>, ApiError>;
}

/// HTTP client for api.github.com (or a compatible endpoint).
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    timeout_seconds: u64,
}

impl GitHubClient {
    /// Build a client. Requests are unauthenticated when `token` is `None`.
    pub fn new(config: &GitHubConfig, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("GitHub token contains invalid characters")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Send a GET request and decode the JSON body.
    ///
    /// Returns `Ok(None)` for `204 No Content`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ApiError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if status == StatusCode::ACCEPTED {
            return Err(ApiError::Pending);
        }

        if let Some(reset) = rate_limit_reset(status, response.headers(), Utc::now()) {
            return Err(ApiError::RateLimited { reset });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Transport(format!(
                "Request timed out after {}s",
                self.timeout_seconds
            ))
        } else if e.is_connect() {
            ApiError::Transport(format!("Cannot connect to GitHub API at {}", self.api_url))
        } else {
            ApiError::Transport(format!("Failed to send request: {}", e))
        }
    }
}

impl GitHubApi for GitHubClient {
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<OrgRepository>, ApiError> {
        let url = self.endpoint(&format!("orgs/{}/repos", org));
        let query = [
            ("type", "public".to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];

        Ok(self.get_json(&url, &query).await?.unwrap_or_default())
    }

    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<ContributorStats>, ApiError> {
        let url = self.endpoint(&format!("repos/{}/{}/stats/contributors", owner, repo));

        Ok(self.get_json(&url, &[]).await?.unwrap_or_default())
    }
}

/// Extract the rate-limit reset time from a response, if it is a rate-limit response.
///
/// Primary limits answer 403/429 with `x-ratelimit-remaining: 0` and an epoch
/// `x-ratelimit-reset`; secondary limits send `retry-after` in seconds. A bare
/// 429 is treated as rate limited with an unknown (already elapsed) reset.
pub(crate) fn rate_limit_reset(
    status: StatusCode,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    };

    if let Some(secs) = header("retry-after").and_then(|v| v.parse::<i64>().ok()) {
        // Out-of-range values fall back to the backoff floor.
        let reset = chrono::Duration::try_seconds(secs).and_then(|d| now.checked_add_signed(d));
        return Some(reset.unwrap_or(now));
    }

    if header("x-ratelimit-remaining") == Some("0") {
        let reset = header("x-ratelimit-reset")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        return Some(reset.unwrap_or(now));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(now);
    }

    None
}
