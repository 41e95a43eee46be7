//! OpenSearch backend for the search index client.

mod client;
mod index_config;

pub use client::OpenSearchClient;
pub use index_config::index_settings;
