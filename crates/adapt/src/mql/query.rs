use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::ast::Filter;
use super::cache::FilterCache;
use super::error::QueryError;
use super::eval::eval_filter;
use super::parser::parse_filter;
use super::projection::{Document, Projection};
use super::store::RecordStore;

/// Records scanned between cooperative yields to the runtime.
const YIELD_EVERY: usize = 256;

/// Body of `POST /search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub projection: Vec<String>,
    #[serde(default)]
    pub filters: String,
}

impl QueryRequest {
    pub fn new<I, S>(projection: I, filters: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projection: projection.into_iter().map(Into::into).collect(),
            filters: filters.into(),
        }
    }
}

/// Projected matches in store scan order.
pub type QueryResponse = Vec<Document>;

/// Runs requests against one shared store:
///
/// 1. Parse the filter text once (through the cache when configured).
/// 2. Walk the store in scan order, checking for cancellation per record.
/// 3. Evaluate the filter; project every match.
///
/// Either the complete response is returned or an error; partial results
/// never escape.
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn RecordStore>,
    cache: Option<Arc<FilterCache>>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<FilterCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn cache(&self) -> Option<&Arc<FilterCache>> {
        self.cache.as_ref()
    }

    pub fn parse(&self, text: &str) -> Result<Arc<Filter>, QueryError> {
        let filter = match &self.cache {
            Some(cache) => cache.get_or_parse(text)?,
            None => Arc::new(parse_filter(text)?),
        };
        Ok(filter)
    }

    #[tracing::instrument(skip_all, fields(filters = %request.filters))]
    pub async fn execute(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<QueryResponse, QueryError> {
        let filter = self.parse(&request.filters)?;
        let projection = Projection::new(request.projection.iter().cloned());

        let ids = self.store.all_ids().await.inspect_err(|e| {
            error!("failed to enumerate records: {e}");
        })?;

        let scanned = ids.len();
        let mut out = QueryResponse::new();

        for (n, id) in ids.into_iter().enumerate() {
            if n > 0 && n % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
            if cancel.is_cancelled() {
                debug!("cancelled after {n} of {scanned} records");
                return Err(QueryError::Cancelled);
            }

            let record = self.store.get(id).await.inspect_err(|e| {
                error!("failed to read record {id}: {e}");
            })?;
            let Some(record) = record else {
                continue;
            };

            if eval_filter(&filter, &record)? {
                out.push(projection.apply(&record));
            }
        }

        debug!("{} of {} records matched", out.len(), scanned);
        Ok(out)
    }
}

/// One-shot convenience: execute without a cache or external cancellation.
pub async fn execute_query(
    request: &QueryRequest,
    store: Arc<dyn RecordStore>,
) -> Result<QueryResponse, QueryError> {
    QueryExecutor::new(store)
        .execute(request, &CancellationToken::new())
        .await
}
