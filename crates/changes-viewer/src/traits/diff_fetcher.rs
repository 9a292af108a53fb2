//! Trait for fetching the raw diff of a comparison.

use crate::model::ComparisonKey;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when fetching a diff.
///
/// These are the only errors shown to the user; the view offers a retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport failed before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a failure status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body was not valid UTF-8.
    #[error("Invalid UTF-8 in diff: {0}")]
    InvalidUtf8(String),

    /// The fetcher is not available.
    #[error("Diff fetcher unavailable: {0}")]
    Unavailable(String),
}

/// Fetches the unified diff between two revisions of a repository.
///
/// # Example
///
/// ```ignore
/// struct StaticFetcher(String);
///
/// #[async_trait]
/// impl DiffFetcher for StaticFetcher {
///     async fn fetch_diff(&self, _key: &ComparisonKey) -> Result<String, FetchError> {
///         Ok(self.0.clone())
///     }
///
///     fn is_available(&self) -> bool {
///         true
///     }
/// }
/// ```
#[async_trait]
pub trait DiffFetcher: Send + Sync {
    /// Fetch the raw diff for `target...source`.
    async fn fetch_diff(&self, key: &ComparisonKey) -> Result<String, FetchError>;

    /// Check if the fetcher is available (e.g., has valid credentials).
    fn is_available(&self) -> bool;
}

/// A fetcher for when no transport is configured.
pub struct NoOpDiffFetcher;

#[async_trait]
impl DiffFetcher for NoOpDiffFetcher {
    async fn fetch_diff(&self, _key: &ComparisonKey) -> Result<String, FetchError> {
        Err(FetchError::Unavailable(
            "No diff transport configured".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }
}
