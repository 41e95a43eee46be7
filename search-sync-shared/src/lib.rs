//! # Search Sync Shared
//!
//! Shared types for the catalog search synchronizer.
//!
//! The canonical record lives in the relational store; the search index holds
//! a derived document per record. Both shapes are defined here so that every
//! crate in the workspace agrees on the mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A canonical catalog record as stored in the relational store.
///
/// The synchronizer only ever reads records; ownership of the data stays with
/// the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Stable identifier, shared with the search index document key.
    pub id: i64,
    /// Display name of the package.
    pub name: String,
    /// Project or homepage link.
    pub link: Option<String>,
    /// Tracked install/download count.
    pub count: i64,
}

impl PackageRecord {
    /// Create a new record.
    pub fn new(id: i64, name: impl Into<String>, link: Option<String>, count: i64) -> Self {
        Self {
            id,
            name: name.into(),
            link,
            count,
        }
    }
}

/// The search-index representation of a [`PackageRecord`].
///
/// Derived deterministically from its source record; the document key in the
/// index is always the record `id`, so a record and its document are a strict
/// 1:1 pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDocument {
    /// Document key; equal to the source record id.
    pub id: i64,
    /// Indexed package name.
    pub name: String,
    /// Project or homepage link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Tracked install/download count.
    pub count: i64,
    /// When this document was last written by the synchronizer.
    pub indexed_at: DateTime<Utc>,
}

impl PackageDocument {
    /// Create a new document with the current timestamp.
    pub fn new(id: i64, name: impl Into<String>, link: Option<String>, count: i64) -> Self {
        Self {
            id,
            name: name.into(),
            link,
            count,
            indexed_at: Utc::now(),
        }
    }
}

impl From<&PackageRecord> for PackageDocument {
    fn from(record: &PackageRecord) -> Self {
        Self::new(record.id, record.name.clone(), record.link.clone(), record.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_record() {
        let record = PackageRecord::new(42, "serde", Some("https://serde.rs".to_string()), 7);

        let doc = PackageDocument::from(&record);

        assert_eq!(doc.id, record.id);
        assert_eq!(doc.name, "serde");
        assert_eq!(doc.link, Some("https://serde.rs".to_string()));
        assert_eq!(doc.count, 7);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let record = PackageRecord::new(1, "tokio", None, 0);

        let a = PackageDocument::from(&record);
        let b = PackageDocument::from(&record);

        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.link, b.link);
        assert_eq!(a.count, b.count);
    }

    #[test]
    fn test_document_serialization_skips_missing_link() {
        let doc = PackageDocument::new(1, "tokio", None, 0);

        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "tokio");
        assert!(value.get("link").is_none());
    }
}
