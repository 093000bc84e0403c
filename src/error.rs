//! Error types for kontext-client
//!
//! This module provides the error taxonomy for the library:
//! - Transport failures (request never completed) which polling retries transparently
//! - Service failures (a well-formed response reports an error) which are terminal
//! - Protocol failures (a response is missing an expected field) which are terminal
//! - Timeout and cancellation of the poll loop

use std::time::Duration;
use thiserror::Error;

/// Result type alias for kontext-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kontext-client
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_key")
        key: Option<String>,
    },

    /// Transport-level failure: the request could not be completed
    /// (network unreachable, DNS failure, connection reset, request timeout)
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned a well-formed response reporting failure
    /// (non-success result code, non-2xx HTTP status, server error message)
    #[error("service error: {0}")]
    Service(String),

    /// A response was well-formed JSON but missing an expected field
    /// (no task id, no result URL on a claimed completion)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Polling ceiling exceeded without reaching a terminal state
    #[error("generation timed out after {}s, please try again later", .0.as_secs())]
    Timeout(Duration),

    /// The caller cancelled the operation via its cancellation token
    #[error("generation cancelled")]
    Cancelled,

    /// A local asset was rejected before upload (unsupported type, too large)
    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    /// URL parsing or resolution failed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, connection resets) should return `true`.
/// Permanent failures (service rejections, malformed responses) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

/// Implementation of IsRetryable for our Error type
///
/// Classification is structural, never based on message contents: only failures
/// where the request itself did not complete count as transient. An error that
/// arrived inside a successfully received response is an application-level
/// failure and must not be retried.
impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // The request never completed - retryable unless reqwest classified
            // it as a body-decode or status error (those mean a response arrived)
            Error::Transport(e) => !e.is_status() && !e.is_decode(),
            // Application-level outcomes are permanent
            Error::Service(_) | Error::Protocol(_) => false,
            // The ceiling already fired; retrying inside the same call is meaningless
            Error::Timeout(_) => false,
            // Cancellation is a caller decision
            Error::Cancelled => false,
            // Config and input errors need user action
            Error::Config { .. } | Error::InvalidAsset(_) | Error::InvalidUrl(_) => false,
            // Serialization errors are permanent
            Error::Serialization(_) => false,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_and_protocol_errors_are_not_retryable() {
        assert!(!Error::Service("bad prompt".into()).is_retryable());
        assert!(!Error::Protocol("missing taskId".into()).is_retryable());
    }

    #[test]
    fn timeout_and_cancelled_are_not_retryable() {
        assert!(!Error::Timeout(Duration::from_secs(300)).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn config_and_asset_errors_are_not_retryable() {
        let config = Error::Config {
            message: "api_key must not be empty".into(),
            key: Some("api_key".into()),
        };
        assert!(!config.is_retryable());
        assert!(!Error::InvalidAsset("file too large".into()).is_retryable());
    }

    #[tokio::test]
    async fn connection_failures_are_retryable() {
        // Port 1 is reserved and nothing listens on it; the connect fails
        // before any response exists, which is exactly the transient case.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        assert!(Error::Transport(err).is_retryable());
    }

    #[test]
    fn timeout_message_suggests_retrying() {
        let msg = Error::Timeout(Duration::from_secs(300)).to_string();
        assert!(msg.contains("300s"));
        assert!(msg.contains("try again"));
    }
}
