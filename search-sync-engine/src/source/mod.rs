//! Record source abstraction.
//!
//! The canonical store yields the full record set for a rebuild as a lazy
//! stream. No transactional snapshot is assumed: records mutated while the
//! fetch is running may be missed until their own single-record sync lands.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::errors::SyncError;
use search_sync_shared::PackageRecord;

/// Lazy stream of records from the canonical store.
pub type RecordStream = BoxStream<'static, Result<PackageRecord, SyncError>>;

/// Source of canonical records for full rebuilds.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch all records as a lazy stream.
    ///
    /// The stream may be very large; the synchronizer consumes it in batches
    /// without collecting it whole.
    async fn fetch_all(&self) -> Result<RecordStream, SyncError>;
}

/// Record source backed by an in-memory vector.
///
/// Used for operator-supplied record dumps and in tests.
pub struct StaticRecordSource {
    records: Vec<PackageRecord>,
}

impl StaticRecordSource {
    /// Create a source yielding the given records in order.
    pub fn new(records: Vec<PackageRecord>) -> Self {
        Self { records }
    }

    /// Number of records this source will yield.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this source is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn fetch_all(&self) -> Result<RecordStream, SyncError> {
        let records = self.records.clone();
        Ok(stream::iter(records.into_iter().map(Ok)).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_static_source_yields_in_order() {
        let records = vec![
            PackageRecord::new(1, "a", None, 0),
            PackageRecord::new(2, "b", None, 0),
        ];
        let source = StaticRecordSource::new(records.clone());

        let fetched: Vec<PackageRecord> =
            source.fetch_all().await.unwrap().try_collect().await.unwrap();

        assert_eq!(fetched, records);
    }

    #[tokio::test]
    async fn test_static_source_is_repeatable() {
        let source = StaticRecordSource::new(vec![PackageRecord::new(1, "a", None, 0)]);

        let first: Vec<_> = source.fetch_all().await.unwrap().try_collect().await.unwrap();
        let second: Vec<_> = source.fetch_all().await.unwrap().try_collect().await.unwrap();

        assert_eq!(first, second);
    }
}
