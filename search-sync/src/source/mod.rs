//! Record loading for operator-triggered actions.
//!
//! The CRUD tier owns the canonical store; for operator actions this binary
//! reads a record export (JSON array of records) and serves it through the
//! engine's record source abstraction.

use std::path::Path;

use search_sync_shared::PackageRecord;

use crate::SearchSyncError;

/// Load records from a JSON export file.
pub async fn load_records(path: impl AsRef<Path>) -> Result<Vec<PackageRecord>, SearchSyncError> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path).await?;
    let records: Vec<PackageRecord> = serde_json::from_slice(&raw).map_err(|e| {
        SearchSyncError::config(format!("Invalid records file {}: {}", path.display(), e))
    })?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_records_from_json() {
        let dir = std::env::temp_dir();
        let path = dir.join("search-sync-test-records.json");
        tokio::fs::write(
            &path,
            r#"[{"id":1,"name":"serde","link":"https://serde.rs","count":3},
                {"id":2,"name":"tokio","link":null,"count":9}]"#,
        )
        .await
        .unwrap();

        let records = load_records(&path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "serde");
        assert_eq!(records[1].link, None);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_records_rejects_malformed_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("search-sync-test-bad-records.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = load_records(&path).await.unwrap_err();
        assert!(matches!(err, SearchSyncError::ConfigError(_)));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
