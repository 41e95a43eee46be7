//! # Search Sync Repository
//!
//! Search index client boundary for the catalog search synchronizer.
//!
//! The remote index service is reached through the [`SearchIndexProvider`]
//! trait; [`OpenSearchClient`] is the production implementation and
//! [`SearchIndexClient`] is the validating wrapper application code uses.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use client::SearchIndexClient;
pub use config::SearchIndexConfig;
pub use errors::IndexClientError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchClient;
pub use types::IndexHandle;
