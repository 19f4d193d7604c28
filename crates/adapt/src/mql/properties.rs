use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

use crate::mql::ast::Operator;
use crate::mql::store::{RecordStore, StoreError};

pub const LOGICAL_OPERATORS: [&str; 3] = ["and", "or", "not"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Number,
    String,
    Boolean,
    Null,
}

impl DataType {
    /// Type of a scalar leaf, as yielded by [`domain::record::Record::leaves`].
    pub fn of(leaf: &Json) -> Self {
        match leaf {
            Json::Number(_) => DataType::Number,
            Json::String(_) => DataType::String,
            Json::Bool(_) => DataType::Boolean,
            _ => DataType::Null,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AttributeInfo {
    pub name: String,
    pub data_type: DataType,
}

/// What a client can filter on: every scalar attribute in the store plus
/// the operator vocabulary.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Properties {
    pub attributes: Vec<AttributeInfo>,
    pub operators: Vec<String>,
    pub logical_operators: Vec<String>,
}

/// Scan the store and describe its attributes, sorted by name.
///
/// An attribute's type is the first non-null type seen for it; attributes
/// that are null everywhere report `null`.
#[tracing::instrument(skip_all)]
pub async fn collect_properties(store: &dyn RecordStore) -> Result<Properties, StoreError> {
    let mut types: BTreeMap<String, DataType> = BTreeMap::new();

    for id in store.all_ids().await? {
        let Some(record) = store.get(id).await? else {
            continue;
        };

        for (path, value) in record.leaves() {
            let seen = DataType::of(value);
            types
                .entry(path)
                .and_modify(|current| {
                    if *current == DataType::Null {
                        *current = seen;
                    }
                })
                .or_insert(seen);
        }
    }

    Ok(Properties {
        attributes: types
            .into_iter()
            .map(|(name, data_type)| AttributeInfo { name, data_type })
            .collect(),
        operators: Operator::ALL.iter().map(|op| op.as_str().to_string()).collect(),
        logical_operators: LOGICAL_OPERATORS.iter().map(|s| s.to_string()).collect(),
    })
}
