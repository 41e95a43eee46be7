//! Synchronizer for the catalog search index.
//!
//! Single authority for translating record-store mutations into index
//! service calls, and for performing zero-downtime full rebuilds.
//!
//! A rebuild populates a fresh shadow index and promotes it with one atomic
//! alias swap, so readers observe either the pre-rebuild or post-rebuild
//! index and never a mix. A failed or cancelled rebuild discards the shadow
//! and leaves the live index untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::batcher;
use crate::errors::{BatchFailure, SyncError};
use crate::source::RecordSource;
use search_sync_repository::{IndexHandle, SearchIndexClient};
use search_sync_shared::{PackageDocument, PackageRecord};

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SynchronizerConfig {
    /// Batch size used when the caller does not supply one.
    pub default_batch_size: usize,
    /// Maximum number of batch calls in flight at once.
    pub max_concurrent_batches: usize,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 1000,
            max_concurrent_batches: 4,
        }
    }
}

/// Outcome of a successful bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    /// Records submitted across all batches.
    pub records: usize,
    /// Number of batches issued.
    pub batches: usize,
}

/// Outcome of a successful full rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Documents written into the promoted index.
    pub documents_indexed: usize,
    /// Number of batches issued.
    pub batches: usize,
}

/// Per-batch outcome collected while populating an index.
enum BatchOutcome {
    Indexed(usize),
    Skipped,
    Failed(BatchFailure),
    SourceFailed(SyncError),
}

/// Resets the rebuild-active flag when a rebuild leaves the populating state.
struct RebuildGuard<'a> {
    active: &'a AtomicBool,
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// The search index synchronization engine.
///
/// Constructed once at process start and shared by handle; all methods take
/// `&self`. Single-record syncs and bulk operations target the live index;
/// only one rebuild may be populating its shadow index at a time.
///
/// Syncs for the same record id issued by different callers race; the last
/// network call to land wins. Callers needing strict per-record ordering
/// must serialize above this layer.
pub struct Synchronizer {
    client: Arc<SearchIndexClient>,
    source: Arc<dyn RecordSource>,
    config: SynchronizerConfig,
    rebuild_active: AtomicBool,
    cancel_requested: AtomicBool,
}

impl Synchronizer {
    /// Create a new synchronizer with default configuration.
    pub fn new(client: Arc<SearchIndexClient>, source: Arc<dyn RecordSource>) -> Self {
        Self::with_config(client, source, SynchronizerConfig::default())
    }

    /// Create a new synchronizer with custom configuration.
    pub fn with_config(
        client: Arc<SearchIndexClient>,
        source: Arc<dyn RecordSource>,
        config: SynchronizerConfig,
    ) -> Self {
        Self {
            client,
            source,
            config,
            rebuild_active: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Batch size used when the caller does not supply one.
    pub fn default_batch_size(&self) -> usize {
        self.config.default_batch_size
    }

    /// Synchronize a created or updated record into the live index.
    ///
    /// Idempotent: re-sending the same record produces the same document
    /// state (last write wins on the record id). A failure here means the
    /// index has drifted from the store; the caller decides whether to retry.
    #[instrument(skip(self, record), fields(id = record.id))]
    pub async fn sync_upsert(&self, record: &PackageRecord) -> Result<(), SyncError> {
        let document = PackageDocument::from(record);
        self.client
            .put_document(&document)
            .await
            .map_err(SyncError::from_client)?;

        debug!(id = record.id, "Record synchronized");
        Ok(())
    }

    /// Remove a deleted record's document from the live index.
    ///
    /// Deleting a record that was never synchronized is not an error.
    #[instrument(skip(self, record), fields(id = record.id))]
    pub async fn sync_delete(&self, record: &PackageRecord) -> Result<(), SyncError> {
        self.client
            .delete_document(record.id)
            .await
            .map_err(SyncError::from_client)?;

        debug!(id = record.id, "Record removed from index");
        Ok(())
    }

    /// Synchronize many records into the live index.
    ///
    /// Records are partitioned into batches of at most `batch_size` and
    /// written with bounded concurrency. Not atomic: batches that succeed
    /// stay applied even when later batches fail; the error lists the failed
    /// batches with their record ids so the caller can re-submit only those.
    #[instrument(skip(self, records), fields(record_count = records.len(), batch_size))]
    pub async fn bulk_upsert(
        &self,
        records: Vec<PackageRecord>,
        batch_size: usize,
    ) -> Result<BulkReport, SyncError> {
        let total_records = records.len();
        let batches = batcher::partition(records, batch_size)?;
        let total_batches = batches.len();
        let live = self.client.live_index();

        let mut failures = Vec::new();
        {
            let mut outcomes = stream::iter(batches.into_iter().enumerate())
                .map(|(index, batch)| {
                    let client = Arc::clone(&self.client);
                    let target = live.clone();
                    async move {
                        let ids: Vec<i64> = batch.iter().map(|r| r.id).collect();
                        let documents: Vec<PackageDocument> =
                            batch.iter().map(PackageDocument::from).collect();
                        client
                            .bulk_put_documents(&target, &documents)
                            .await
                            .map_err(|error| BatchFailure {
                                batch_index: index,
                                record_ids: ids,
                                error,
                            })
                    }
                })
                .buffer_unordered(self.config.max_concurrent_batches);

            while let Some(outcome) = outcomes.next().await {
                if let Err(failure) = outcome {
                    warn!(
                        batch_index = failure.batch_index,
                        error = %failure.error,
                        "Bulk upsert batch failed"
                    );
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            info!(records = total_records, batches = total_batches, "Bulk upsert completed");
            Ok(BulkReport {
                records: total_records,
                batches: total_batches,
            })
        } else {
            failures.sort_by_key(|f| f.batch_index);
            Err(SyncError::BatchesFailed {
                failures,
                total_batches,
            })
        }
    }

    /// Remove many records' documents from the live index.
    ///
    /// Same batching and partial-failure reporting as [`Self::bulk_upsert`];
    /// ids that are already absent count as successfully deleted.
    #[instrument(skip(self, ids), fields(record_count = ids.len(), batch_size))]
    pub async fn bulk_delete(
        &self,
        ids: Vec<i64>,
        batch_size: usize,
    ) -> Result<BulkReport, SyncError> {
        let total_records = ids.len();
        let batches = batcher::partition(ids, batch_size)?;
        let total_batches = batches.len();

        let mut failures = Vec::new();
        {
            let mut outcomes = stream::iter(batches.into_iter().enumerate())
                .map(|(index, batch)| {
                    let client = Arc::clone(&self.client);
                    async move {
                        client
                            .bulk_delete_documents(&batch)
                            .await
                            .map_err(|error| BatchFailure {
                                batch_index: index,
                                record_ids: batch,
                                error,
                            })
                    }
                })
                .buffer_unordered(self.config.max_concurrent_batches);

            while let Some(outcome) = outcomes.next().await {
                if let Err(failure) = outcome {
                    warn!(
                        batch_index = failure.batch_index,
                        error = %failure.error,
                        "Bulk delete batch failed"
                    );
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            info!(records = total_records, batches = total_batches, "Bulk delete completed");
            Ok(BulkReport {
                records: total_records,
                batches: total_batches,
            })
        } else {
            failures.sort_by_key(|f| f.batch_index);
            Err(SyncError::BatchesFailed {
                failures,
                total_batches,
            })
        }
    }

    /// Rebuild the index from scratch with zero downtime.
    ///
    /// Creates a fresh shadow index, streams every record from the source
    /// into it in batches, then atomically swaps it to live. If any batch
    /// fails, the source errors, or the rebuild is cancelled, the shadow is
    /// discarded and the previously live index keeps serving unchanged.
    ///
    /// Only one rebuild may be populating at a time; a concurrent call fails
    /// immediately with [`SyncError::RebuildInProgress`]. Single-record syncs
    /// keep targeting the live index while a rebuild runs.
    #[instrument(skip(self), fields(batch_size))]
    pub async fn rebuild_index(&self, batch_size: usize) -> Result<RebuildReport, SyncError> {
        batcher::validate_batch_size(batch_size)?;

        if self
            .rebuild_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::RebuildInProgress);
        }
        let _guard = RebuildGuard {
            active: &self.rebuild_active,
        };
        self.cancel_requested.store(false, Ordering::SeqCst);

        let shadow = self
            .client
            .create_index()
            .await
            .map_err(SyncError::from_client)?;

        info!(index = %shadow.physical_name, "Rebuild started");

        let records = match self.source.fetch_all().await {
            Ok(stream) => stream,
            Err(e) => {
                self.discard_shadow(&shadow).await;
                return Err(e);
            }
        };

        let mut failures = Vec::new();
        let mut documents_indexed = 0usize;
        let mut batches = 0usize;
        let mut source_error = None;

        {
            let mut outcomes = records
                .chunks(batch_size)
                .enumerate()
                .map(|(index, chunk)| {
                    let client = Arc::clone(&self.client);
                    let target = shadow.clone();
                    let cancel = &self.cancel_requested;
                    async move {
                        let mut batch = Vec::with_capacity(chunk.len());
                        for record in chunk {
                            match record {
                                Ok(record) => batch.push(record),
                                Err(e) => return BatchOutcome::SourceFailed(e),
                            }
                        }

                        // Cooperative cancellation: checked before the batch
                        // is submitted; batches already in flight complete.
                        if cancel.load(Ordering::SeqCst) {
                            return BatchOutcome::Skipped;
                        }

                        let ids: Vec<i64> = batch.iter().map(|r| r.id).collect();
                        let documents: Vec<PackageDocument> =
                            batch.iter().map(PackageDocument::from).collect();
                        match client.bulk_put_documents(&target, &documents).await {
                            Ok(()) => BatchOutcome::Indexed(documents.len()),
                            Err(error) => BatchOutcome::Failed(BatchFailure {
                                batch_index: index,
                                record_ids: ids,
                                error,
                            }),
                        }
                    }
                })
                .buffer_unordered(self.config.max_concurrent_batches);

            while let Some(outcome) = outcomes.next().await {
                batches += 1;
                match outcome {
                    BatchOutcome::Indexed(count) => documents_indexed += count,
                    BatchOutcome::Skipped => {}
                    BatchOutcome::Failed(failure) => {
                        warn!(
                            batch_index = failure.batch_index,
                            error = %failure.error,
                            "Rebuild batch failed"
                        );
                        failures.push(failure);
                    }
                    // Keep draining so in-flight batches finish before we
                    // report the abort.
                    BatchOutcome::SourceFailed(e) => {
                        if source_error.is_none() {
                            source_error = Some(e);
                        }
                    }
                }
            }
        }

        if let Some(e) = source_error {
            self.discard_shadow(&shadow).await;
            return Err(e);
        }

        let cancelled = self.cancel_requested.load(Ordering::SeqCst);
        if cancelled || !failures.is_empty() {
            self.discard_shadow(&shadow).await;
            failures.sort_by_key(|f| f.batch_index);
            return Err(SyncError::RebuildAborted {
                failures,
                cancelled,
            });
        }

        if let Err(e) = self.client.swap_index(&shadow).await {
            self.discard_shadow(&shadow).await;
            return Err(SyncError::from_client(e));
        }

        info!(
            documents = documents_indexed,
            batches, "Rebuild completed and promoted"
        );
        Ok(RebuildReport {
            documents_indexed,
            batches,
        })
    }

    /// Request cancellation of an in-flight rebuild.
    ///
    /// No-op when no rebuild is populating. The rebuild stops before
    /// submitting its next batch and discards its shadow index.
    pub fn cancel_rebuild(&self) {
        if self.rebuild_active.load(Ordering::SeqCst) {
            self.cancel_requested.store(true, Ordering::SeqCst);
            info!("Rebuild cancellation requested");
        }
    }

    /// Best-effort drop of an abandoned shadow index.
    async fn discard_shadow(&self, shadow: &IndexHandle) {
        if let Err(e) = self.client.drop_index(shadow).await {
            warn!(
                index = %shadow.physical_name,
                error = %e,
                "Failed to drop abandoned shadow index"
            );
        }
    }
}
