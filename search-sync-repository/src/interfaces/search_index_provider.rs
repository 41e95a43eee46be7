//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! mocks for testing, etc.).

use async_trait::async_trait;

use crate::errors::IndexClientError;
use crate::types::IndexHandle;
use search_sync_shared::PackageDocument;

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into [`crate::SearchIndexClient`] to enable
/// dependency injection and easy testing with mock implementations. All
/// operations are network calls that may time out or be rejected by rate
/// limiting; errors carry a transient/permanent classification via
/// [`IndexClientError::is_transient`].
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Handle addressing the live index.
    fn live_index(&self) -> IndexHandle;

    /// Write a single document to the live index.
    ///
    /// If a document with the same id already exists, it is replaced
    /// (last write wins).
    async fn put_document(&self, document: &PackageDocument) -> Result<(), IndexClientError>;

    /// Delete a document from the live index by id.
    ///
    /// Deleting a document that does not exist is not an error.
    async fn delete_document(&self, id: i64) -> Result<(), IndexClientError>;

    /// Write multiple documents to the given index in one bulk call.
    ///
    /// The target may be the live index or a shadow handle obtained from
    /// [`Self::create_index`]. Fails as a whole: either every document in the
    /// batch was accepted, or an error describing the rejection is returned.
    async fn bulk_put_documents(
        &self,
        target: &IndexHandle,
        documents: &[PackageDocument],
    ) -> Result<(), IndexClientError>;

    /// Delete multiple documents from the live index in one bulk call.
    ///
    /// Ids that are already absent are counted as successfully deleted.
    async fn bulk_delete_documents(&self, ids: &[i64]) -> Result<(), IndexClientError>;

    /// Create a fresh, empty shadow index and return its handle.
    async fn create_index(&self) -> Result<IndexHandle, IndexClientError>;

    /// Atomically promote a shadow index to live.
    ///
    /// The alias is moved to the shadow index in a single action set, so
    /// readers observe either the old or the new index, never a mix. The
    /// previously live physical index is retired.
    async fn swap_index(&self, shadow: &IndexHandle) -> Result<(), IndexClientError>;

    /// Drop a physical index (used to discard an abandoned shadow).
    async fn drop_index(&self, handle: &IndexHandle) -> Result<(), IndexClientError>;

    /// Ensure a live index exists behind the alias.
    ///
    /// Called at startup; creates an initial physical index and points the
    /// alias at it when none exists yet.
    async fn ensure_live_index(&self) -> Result<(), IndexClientError>;

    /// Check if the search service is healthy and reachable.
    async fn health_check(&self) -> Result<bool, IndexClientError>;
}
