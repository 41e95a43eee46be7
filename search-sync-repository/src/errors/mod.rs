//! Error types for search index client operations.

mod index_client_error;

pub use index_client_error::IndexClientError;
