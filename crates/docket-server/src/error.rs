use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use docket_store::{OpError, StoreError};

/// Body message for a missing document.
pub const NOT_FOUND_MESSAGE: &str = "Todo not found.";

#[derive(Debug, Error)]
pub enum ServerError {
    /// Client input failed validation (400).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No document with this id (404).
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<OpError> for ServerError {
    fn from(err: OpError) -> Self {
        match err {
            OpError::Invalid(e) => Self::Validation(e.to_string()),
            OpError::NotFound(id) => Self::NotFound(id),
            OpError::Store(e) => Self::Store(e),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(_) => NOT_FOUND_MESSAGE.to_owned(),
            Self::Store(e) if e.is_unavailable() => "Storage is unavailable.".to_owned(),
            Self::Store(StoreError::Corrupt { .. }) => "Stored data is corrupt.".to_owned(),
            _ => "Internal server error.".to_owned(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}
