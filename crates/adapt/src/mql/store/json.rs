use serde_json::Value as Json;
use std::path::Path;
use tracing::info;

use crate::mql::store::{InMemoryRecordStore, StoreError};

/// Load a dataset file (a JSON array of record objects) into memory.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_json_file(path: impl AsRef<Path>) -> Result<InMemoryRecordStore, StoreError> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let value: Json = serde_json::from_slice(&bytes)?;
    let store = InMemoryRecordStore::from_json(value)?;

    info!("loaded {} records", store.len());
    Ok(store)
}
