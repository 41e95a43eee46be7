//! # Search Sync Engine
//!
//! Keeps the remote search index consistent with the canonical record store.
//!
//! ## Architecture
//!
//! The engine is a small orchestration layer over the search index client:
//!
//! 1. **Batcher**: partitions record sequences into bounded-size groups
//! 2. **Record source**: streams the full record set for rebuilds
//! 3. **Synchronizer**: single-record sync, bulk sync, and atomic
//!    zero-downtime full rebuilds via a shadow index

pub mod batcher;
pub mod errors;
pub mod source;
pub mod synchronizer;

pub use errors::{BatchFailure, SyncError};
pub use source::{RecordSource, StaticRecordSource};
pub use synchronizer::{BulkReport, RebuildReport, Synchronizer, SynchronizerConfig};
