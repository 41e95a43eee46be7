//! Search index client implementation.
//!
//! This module provides the main client for interacting with the search
//! index. The synchronizer uses this to write, delete, and manage documents
//! and index lifecycles.

use crate::config::SearchIndexConfig;
use crate::errors::IndexClientError;
use crate::interfaces::SearchIndexProvider;
use crate::types::IndexHandle;
use search_sync_shared::PackageDocument;

/// The main client for interacting with the search index.
///
/// Wraps a [`SearchIndexProvider`] and enforces the configured batch size
/// limit before any bulk request reaches the network.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    max_batch_size: Option<usize>,
}

impl SearchIndexClient {
    /// Create a new client with the default batch size limit.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            max_batch_size: SearchIndexConfig::default().max_batch_size,
        }
    }

    /// Create a new client with the batch size limit from the given config.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: &SearchIndexConfig) -> Self {
        Self {
            provider,
            max_batch_size: config.max_batch_size,
        }
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), IndexClientError> {
        if let Some(max) = self.max_batch_size {
            if size > max {
                return Err(IndexClientError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Handle addressing the live index.
    pub fn live_index(&self) -> IndexHandle {
        self.provider.live_index()
    }

    /// Write a single document to the live index (last write wins).
    pub async fn put_document(&self, document: &PackageDocument) -> Result<(), IndexClientError> {
        self.provider.put_document(document).await
    }

    /// Delete a document from the live index. Absence is not an error.
    pub async fn delete_document(&self, id: i64) -> Result<(), IndexClientError> {
        self.provider.delete_document(id).await
    }

    /// Write a batch of documents to the given index in one bulk call.
    ///
    /// An empty batch is a no-op. The batch size is limited by the configured
    /// maximum (default: 1000).
    pub async fn bulk_put_documents(
        &self,
        target: &IndexHandle,
        documents: &[PackageDocument],
    ) -> Result<(), IndexClientError> {
        if documents.is_empty() {
            return Ok(());
        }
        self.validate_batch_size(documents.len())?;
        self.provider.bulk_put_documents(target, documents).await
    }

    /// Delete a batch of documents from the live index in one bulk call.
    ///
    /// Ids that are already absent are counted as successfully deleted.
    pub async fn bulk_delete_documents(&self, ids: &[i64]) -> Result<(), IndexClientError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.validate_batch_size(ids.len())?;
        self.provider.bulk_delete_documents(ids).await
    }

    /// Create a fresh, empty shadow index.
    pub async fn create_index(&self) -> Result<IndexHandle, IndexClientError> {
        self.provider.create_index().await
    }

    /// Atomically promote a shadow index to live.
    pub async fn swap_index(&self, shadow: &IndexHandle) -> Result<(), IndexClientError> {
        self.provider.swap_index(shadow).await
    }

    /// Drop a physical index.
    pub async fn drop_index(&self, handle: &IndexHandle) -> Result<(), IndexClientError> {
        self.provider.drop_index(handle).await
    }

    /// Ensure a live index exists behind the alias.
    pub async fn ensure_live_index(&self) -> Result<(), IndexClientError> {
        self.provider.ensure_live_index().await
    }

    /// Check if the search service is healthy and reachable.
    pub async fn health_check(&self) -> Result<bool, IndexClientError> {
        self.provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock provider that records call counts.
    struct MockProvider {
        puts: AtomicUsize,
        bulk_puts: AtomicUsize,
        bulk_deletes: AtomicUsize,
    }

    impl MockProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                puts: AtomicUsize::new(0),
                bulk_puts: AtomicUsize::new(0),
                bulk_deletes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchIndexProvider for Arc<MockProvider> {
        fn live_index(&self) -> IndexHandle {
            IndexHandle::live("packages")
        }

        async fn put_document(&self, _document: &PackageDocument) -> Result<(), IndexClientError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete_document(&self, _id: i64) -> Result<(), IndexClientError> {
            Ok(())
        }

        async fn bulk_put_documents(
            &self,
            _target: &IndexHandle,
            _documents: &[PackageDocument],
        ) -> Result<(), IndexClientError> {
            self.bulk_puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn bulk_delete_documents(&self, _ids: &[i64]) -> Result<(), IndexClientError> {
            self.bulk_deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn create_index(&self) -> Result<IndexHandle, IndexClientError> {
            Ok(IndexHandle::shadow("packages"))
        }

        async fn swap_index(&self, _shadow: &IndexHandle) -> Result<(), IndexClientError> {
            Ok(())
        }

        async fn drop_index(&self, _handle: &IndexHandle) -> Result<(), IndexClientError> {
            Ok(())
        }

        async fn ensure_live_index(&self) -> Result<(), IndexClientError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, IndexClientError> {
            Ok(true)
        }
    }

    fn doc(id: i64) -> PackageDocument {
        PackageDocument::new(id, format!("pkg-{}", id), None, 0)
    }

    #[tokio::test]
    async fn test_bulk_put_respects_batch_limit() {
        let provider = MockProvider::new();
        let config = SearchIndexConfig {
            max_batch_size: Some(2),
            ..Default::default()
        };
        let client = SearchIndexClient::with_config(Box::new(provider.clone()), &config);

        let docs: Vec<PackageDocument> = (0..3).map(doc).collect();
        let err = client
            .bulk_put_documents(&IndexHandle::live("packages"), &docs)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IndexClientError::BatchSizeExceeded {
                provided: 3,
                max: 2
            }
        ));
        assert_eq!(provider.bulk_puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_bulk_is_noop() {
        let provider = MockProvider::new();
        let client = SearchIndexClient::new(Box::new(provider.clone()));

        client
            .bulk_put_documents(&IndexHandle::live("packages"), &[])
            .await
            .unwrap();
        client.bulk_delete_documents(&[]).await.unwrap();

        assert_eq!(provider.bulk_puts.load(Ordering::SeqCst), 0);
        assert_eq!(provider.bulk_deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_passthrough_operations() {
        let provider = MockProvider::new();
        let client = SearchIndexClient::new(Box::new(provider.clone()));

        client.put_document(&doc(1)).await.unwrap();
        client
            .bulk_put_documents(&IndexHandle::live("packages"), &[doc(2), doc(3)])
            .await
            .unwrap();
        client.bulk_delete_documents(&[2, 3]).await.unwrap();

        assert_eq!(provider.puts.load(Ordering::SeqCst), 1);
        assert_eq!(provider.bulk_puts.load(Ordering::SeqCst), 1);
        assert_eq!(provider.bulk_deletes.load(Ordering::SeqCst), 1);
    }
}
