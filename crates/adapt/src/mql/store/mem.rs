use async_trait::async_trait;
use domain::record::Record;
use serde_json::Value as Json;
use std::sync::Arc;

use crate::mql::store::{RecordId, RecordStore, StoreError};

// ─────────────────────────────────────────────────────────────────────────────
// In-memory RecordStore implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Records held in a vector; scan order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Vec<Arc<Record>>,
}

impl InMemoryRecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build from a JSON array of objects.
    pub fn from_json(value: Json) -> Result<Self, StoreError> {
        let Json::Array(items) = value else {
            return Err(StoreError::InvalidDataset(
                "dataset must be a JSON array of objects".into(),
            ));
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                Record::from_value(item).ok_or_else(|| {
                    StoreError::InvalidDataset(format!("entry {idx} is not a JSON object"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn all_ids(&self) -> Result<Vec<RecordId>, StoreError> {
        Ok((0..self.records.len()).collect())
    }

    async fn get(&self, id: RecordId) -> Result<Option<Arc<Record>>, StoreError> {
        Ok(self.records.get(id).cloned())
    }
}
