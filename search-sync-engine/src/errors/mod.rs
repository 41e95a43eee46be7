//! Error types for the synchronization engine.
//!
//! The engine never retries on its own; every failure is surfaced with its
//! transient/permanent classification so the caller can decide whether a
//! retry is worthwhile or the drift is acceptable.

use thiserror::Error;

use search_sync_repository::IndexClientError;

/// Details of one failed batch within a bulk operation or rebuild.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Position of the batch in submission order (0-based).
    pub batch_index: usize,
    /// Record ids contained in the failed batch, for targeted re-submission.
    pub record_ids: Vec<i64>,
    /// The underlying client error.
    pub error: IndexClientError,
}

/// Errors that can occur during synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid input (e.g. zero batch size). Surfaced immediately, no side
    /// effect.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The index service failed in a retryable way (timeout, rate limit,
    /// 5xx). The caller may retry with backoff.
    #[error("Transient sync failure: {0}")]
    Transient(#[source] IndexClientError),

    /// The index service rejected the request (schema violation, 4xx).
    /// Retrying the same payload will not help.
    #[error("Permanent sync failure: {0}")]
    Permanent(#[source] IndexClientError),

    /// A rebuild is already populating its shadow index.
    #[error("A rebuild is already in progress")]
    RebuildInProgress,

    /// The rebuild was abandoned: its shadow index has been discarded and the
    /// previously live index is untouched.
    #[error("Rebuild aborted: {} batch(es) failed (cancelled: {})", .failures.len(), .cancelled)]
    RebuildAborted {
        failures: Vec<BatchFailure>,
        cancelled: bool,
    },

    /// One or more batches of a bulk operation failed. Batches that succeeded
    /// before remain applied; the failures list which subset to re-submit.
    #[error("Bulk operation failed: {} of {} batch(es)", .failures.len(), .total_batches)]
    BatchesFailed {
        failures: Vec<BatchFailure>,
        total_batches: usize,
    },

    /// The record source failed while being read.
    #[error("Record source error: {0}")]
    Source(String),
}

impl SyncError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a record source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Lift a client error into the engine taxonomy using its
    /// transient/permanent classification.
    pub fn from_client(error: IndexClientError) -> Self {
        match error {
            IndexClientError::Validation(_) | IndexClientError::BatchSizeExceeded { .. } => {
                Self::Validation(error.to_string())
            }
            e if e.is_transient() => Self::Transient(e),
            e => Self::Permanent(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_lifting() {
        let transient = SyncError::from_client(IndexClientError::Timeout(3000));
        assert!(matches!(transient, SyncError::Transient(_)));

        let permanent = SyncError::from_client(IndexClientError::from_status(400, "bad mapping"));
        assert!(matches!(permanent, SyncError::Permanent(_)));

        let validation = SyncError::from_client(IndexClientError::batch_size_exceeded(10, 5));
        assert!(matches!(validation, SyncError::Validation(_)));
    }
}
