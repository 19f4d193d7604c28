// crates/adapt/src/http/app.rs

use axum::{
    http::{header, HeaderValue},
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower::limit::GlobalConcurrencyLimitLayer;

use crate::mql::QueryExecutor;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<QueryExecutor>,
    pub query_timeout: Duration,
}

/// HTTP-facing options, resolved from settings by the caller.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub query_timeout: Duration,
    pub cors_origin: Option<HeaderValue>,
    pub max_concurrent_queries: usize,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
            cors_origin: None,
            max_concurrent_queries: 64,
        }
    }
}

#[tracing::instrument(skip_all)]
pub fn build_app(executor: Arc<QueryExecutor>, options: AppOptions) -> Router {
    let state = AppState {
        executor,
        query_timeout: options.query_timeout,
    };

    let router = Router::new()
        .route("/search", post(crate::http::search::search))
        .route("/properties", get(crate::http::search::properties))
        .with_state(state)
        .layer(GlobalConcurrencyLimitLayer::new(
            options.max_concurrent_queries.max(1),
        ));

    match options.cors_origin {
        Some(origin) => router.layer(middleware::map_response(move |mut res: Response| {
            let origin = origin.clone();
            async move {
                res.headers_mut()
                    .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
                res
            }
        })),
        None => router,
    }
}
