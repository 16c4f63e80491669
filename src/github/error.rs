//! Error classification for GitHub API calls.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Outcome of a failed GitHub API call.
///
/// `RateLimited` and `Pending` are transient and retried by the
/// [`StatsFetcher`](super::StatsFetcher); everything else is terminal for
/// the repository or organization being processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Rate limit exhausted; requests may resume at `reset`.
    #[error("rate limited until {reset}")]
    RateLimited { reset: DateTime<Utc> },

    /// The statistics are being computed in the background (HTTP 202).
    #[error("statistics are still being computed")]
    Pending,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("GitHub API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The configured attempt budget ran out while the API kept answering
    /// with a transient condition.
    #[error("gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl ApiError {
    /// Whether the same request should be issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. } | ApiError::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_variants() {
        assert!(ApiError::Pending.is_retryable());
        assert!(ApiError::RateLimited { reset: Utc::now() }.is_retryable());
        assert!(!ApiError::NotFound("x".into()).is_retryable());
        assert!(!ApiError::RetriesExhausted { attempts: 3 }.is_retryable());
        assert!(!ApiError::Status {
            status: 500,
            body: String::new()
        }
        .is_retryable());
    }
}
