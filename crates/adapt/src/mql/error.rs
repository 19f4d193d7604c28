use thiserror::Error;

use super::ast::Operator;
use super::store::StoreError;

/// Malformed filter text.
///
/// `position` is the byte offset of the offending token, or the input length
/// when the text ended too early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at position {position}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub position: usize,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    pub fn new(position: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("type error: operator `{operator}` cannot order string values of field `{field}`")]
    Type { field: String, operator: Operator },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("query cancelled")]
    Cancelled,
}

impl QueryError {
    /// Errors caused by the request itself rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::Syntax(_) | QueryError::Type { .. })
    }
}
