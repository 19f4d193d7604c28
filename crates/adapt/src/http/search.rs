use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::http::{AppState, HttpError};
use crate::mql::{collect_properties, QueryError, QueryRequest, QueryResponse};

/// `POST /search`
///
/// The scan runs under `query_timeout`; when it elapses the scan is dropped at
/// its next await point and the request fails with `503`.
#[tracing::instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, HttpError> {
    let Json(request) = payload.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    debug!(projection = ?request.projection, filters = %request.filters, "search");

    // Cancels the scan if this handler is dropped mid-query.
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    let result = tokio::time::timeout(
        state.query_timeout,
        state.executor.execute(&request, &token),
    )
    .await;

    match result {
        Ok(Ok(docs)) => {
            info!("search returned {} documents", docs.len());
            Ok(Json(docs))
        }
        Ok(Err(QueryError::Cancelled)) | Err(_) => Err(HttpError::Timeout),
        Ok(Err(e)) => Err(e.into()),
    }
}

/// `GET /properties`
#[tracing::instrument(skip_all)]
pub async fn properties(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let properties = collect_properties(state.executor.store().as_ref()).await?;

    Ok(Json(json!({
        "status": "success",
        "properties": properties,
    })))
}
