//! Dependency initialization and wiring for the search synchronizer.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::source::load_records;
use crate::SearchSyncError;
use search_sync_engine::{StaticRecordSource, Synchronizer, SynchronizerConfig};
use search_sync_repository::{OpenSearchClient, SearchIndexClient, SearchIndexConfig};
use search_sync_shared::PackageRecord;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default alias of the live package index.
const DEFAULT_INDEX_ALIAS: &str = "packages";

/// Default batch size for bulk operations and rebuilds.
const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default per-call timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default path of the record export file.
const DEFAULT_RECORDS_FILE: &str = "records.json";

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured synchronizer ready to run.
    pub synchronizer: Synchronizer,
    /// Records loaded from the export file, for bulk save/delete actions.
    pub records: Vec<PackageRecord>,
    /// Batch size for bulk operations and rebuilds.
    pub batch_size: usize,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: optional basic auth
    /// - `SEARCH_INDEX_ALIAS`: alias of the live index (default: packages)
    /// - `SYNC_BATCH_SIZE`: batch size for bulk operations (default: 1000)
    /// - `SYNC_TIMEOUT_MS`: per-call timeout in milliseconds (default: 30000)
    /// - `RECORDS_FILE`: path to the JSON record export (default: records.json)
    pub async fn new() -> Result<Self, SearchSyncError> {
        let endpoint =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let alias =
            env::var("SEARCH_INDEX_ALIAS").unwrap_or_else(|_| DEFAULT_INDEX_ALIAS.to_string());
        let username = env::var("OPENSEARCH_USERNAME").ok();
        let password = env::var("OPENSEARCH_PASSWORD").ok();
        let batch_size = read_env_number("SYNC_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let timeout_ms = read_env_number("SYNC_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let records_file =
            env::var("RECORDS_FILE").unwrap_or_else(|_| DEFAULT_RECORDS_FILE.to_string());

        if batch_size == 0 {
            return Err(SearchSyncError::config("SYNC_BATCH_SIZE must be at least 1"));
        }

        info!(
            endpoint = %endpoint,
            alias = %alias,
            batch_size = batch_size,
            records_file = %records_file,
            "Initializing dependencies"
        );

        let index_config = SearchIndexConfig {
            endpoint,
            username,
            password,
            alias,
            request_timeout: Duration::from_millis(timeout_ms),
            max_batch_size: Some(batch_size),
        };

        let provider = OpenSearchClient::new(&index_config)
            .map_err(|e| SearchSyncError::config(format!("Failed to create index client: {}", e)))?;
        let client = Arc::new(SearchIndexClient::with_config(
            Box::new(provider),
            &index_config,
        ));

        let healthy = client
            .health_check()
            .await
            .map_err(|e| SearchSyncError::config(format!("Index health check failed: {}", e)))?;
        if !healthy {
            return Err(SearchSyncError::config("Search index cluster is unhealthy"));
        }

        client.ensure_live_index().await?;
        info!("Search index connection verified");

        let records = load_records(&records_file).await?;
        info!(count = records.len(), "Loaded record export");

        let source = Arc::new(StaticRecordSource::new(records.clone()));
        let synchronizer = Synchronizer::with_config(
            client,
            source,
            SynchronizerConfig {
                default_batch_size: batch_size,
                ..Default::default()
            },
        );

        Ok(Self {
            synchronizer,
            records,
            batch_size,
        })
    }
}

/// Read a numeric environment variable, falling back to a default.
fn read_env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T, SearchSyncError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| SearchSyncError::config(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
