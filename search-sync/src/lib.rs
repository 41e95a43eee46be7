//! # Search Sync
//!
//! Main library for the catalog search index synchronizer binary.
//!
//! This crate wires configuration and dependencies together and exposes the
//! operator entry points (bulk save, bulk delete, full rebuild).

pub mod config;
pub mod source;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during synchronizer initialization or execution.
#[derive(Error, Debug)]
pub enum SearchSyncError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Synchronization error.
    #[error("Sync error: {0}")]
    SyncError(#[from] search_sync_engine::SyncError),

    /// Search index client error.
    #[error("Index client error: {0}")]
    ClientError(#[from] search_sync_repository::IndexClientError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchSyncError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
