use async_trait::async_trait;
use domain::record::Record;
use std::sync::Arc;
use thiserror::Error;

pub mod json;
pub mod mem;

pub use json::load_json_file;
pub use mem::InMemoryRecordStore;

/// Position of a record in the store's scan order.
pub type RecordId = usize;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Async RecordStore abstraction
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only collection of records (in-memory or paged).
///
/// The store is responsible for:
/// - enumerating record ids in a stable scan order
/// - returning a shared handle to the record for an id
///
/// Nothing mutates a store while queries run, so one instance behind an
/// `Arc` serves any number of concurrent queries.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All record ids, in scan order.
    async fn all_ids(&self) -> Result<Vec<RecordId>, StoreError>;

    /// Fetch a record. `Ok(None)` means the id is unknown.
    async fn get(&self, id: RecordId) -> Result<Option<Arc<Record>>, StoreError>;
}
