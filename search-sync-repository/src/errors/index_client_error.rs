//! Index client error types.
//!
//! Every failure carries a transient/permanent classification so callers can
//! decide whether a retry is worthwhile. The client itself never retries.

use thiserror::Error;

/// Errors that can occur while talking to the search index service.
#[derive(Debug, Clone, Error)]
pub enum IndexClientError {
    /// Invalid input (bad batch size, malformed request). Not retryable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failed to reach the search index service. Retryable.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The call did not complete within the configured timeout. Retryable.
    #[error("Timeout after {0} ms")]
    Timeout(u64),

    /// The service rejected the call due to rate limiting. Retryable.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The service reported a server-side failure (5xx). Retryable.
    #[error("Backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// The service rejected the request as malformed (4xx). Not retryable.
    #[error("Request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Failed to serialize a document for the index. Not retryable.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Batch size exceeds configured maximum. Not retryable.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl IndexClientError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Classify an HTTP status returned by the index service.
    ///
    /// 429 and 5xx map to retryable variants, everything else 4xx is a
    /// permanent rejection.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => Self::RateLimited(message),
            s if s >= 500 => Self::Backend { status: s, message },
            s => Self::Rejected { status: s, message },
        }
    }

    /// Whether a retry of the failed call could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::RateLimited(_) | Self::Backend { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            IndexClientError::from_status(429, "slow down"),
            IndexClientError::RateLimited(_)
        ));
        assert!(matches!(
            IndexClientError::from_status(503, "unavailable"),
            IndexClientError::Backend { status: 503, .. }
        ));
        assert!(matches!(
            IndexClientError::from_status(400, "bad mapping"),
            IndexClientError::Rejected { status: 400, .. }
        ));
    }

    #[test]
    fn test_transient_classification() {
        assert!(IndexClientError::from_status(429, "").is_transient());
        assert!(IndexClientError::from_status(500, "").is_transient());
        assert!(IndexClientError::Timeout(3000).is_transient());
        assert!(IndexClientError::connection("refused").is_transient());

        assert!(!IndexClientError::from_status(400, "").is_transient());
        assert!(!IndexClientError::validation("bad batch").is_transient());
        assert!(!IndexClientError::serialization("bad doc").is_transient());
    }
}
