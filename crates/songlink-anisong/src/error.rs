//! Error types for catalog access.

use thiserror::Error;

/// Errors that can occur while talking to the catalog or ingesting from it.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog was unreachable or answered with a server error.
    #[error("HTTP error from AnisongDB: {message}")]
    Http { message: String },

    /// The catalog returned a rate-limit response.
    #[error("rate limited by AnisongDB")]
    RateLimited,

    /// The catalog refused the request itself.
    #[error("AnisongDB rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A response could not be parsed.
    #[error("parse error from AnisongDB: {message}")]
    Parse { message: String },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the core store or the operator.
    #[error(transparent)]
    Database(#[from] songlink_core::Error),
}

impl CatalogError {
    /// Returns `true` when the error is transient and the request may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::RateLimited)
    }
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
