use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::mql::{QueryError, StoreError};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("query timed out")]
    Timeout,
}

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::Query(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            HttpError::Query(QueryError::Cancelled) | HttpError::Timeout => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            HttpError::Query(_) | HttpError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Every failure renders as `{"error": <message>}`.
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, "request failed: {self}");
        } else {
            warn!(%status, "request rejected: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mql::{Operator, SyntaxError};

    #[test]
    fn client_errors_map_to_400() {
        let syntax = HttpError::from(QueryError::from(SyntaxError::new(3, "field name", "`(`")));
        assert_eq!(syntax.status_code(), StatusCode::BAD_REQUEST);

        let type_err = HttpError::from(QueryError::Type {
            field: "t".into(),
            operator: Operator::Gt,
        });
        assert_eq!(type_err.status_code(), StatusCode::BAD_REQUEST);

        assert_eq!(
            HttpError::BadRequest("missing field".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn service_failures_map_to_5xx() {
        let store = HttpError::from(QueryError::from(StoreError::Unavailable("down".into())));
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            HttpError::Query(QueryError::Cancelled).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(HttpError::Timeout.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn syntax_message_carries_position() {
        let err = HttpError::from(QueryError::from(SyntaxError::new(8, "operator", "`between`")));
        assert_eq!(
            err.to_string(),
            "syntax error at position 8: expected operator, found `between`"
        );
    }
}
