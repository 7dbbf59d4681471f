use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ErrorKind;
use serde_json::json;
use thiserror::Error;
use tonic::Status;

/// HTTP status the gateway answers with for each outcome kind.
pub fn http_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::NotEmpty => StatusCode::CONFLICT,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Rejected locally, the engine was never called.
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{}", .0.message())]
    Storage(#[from] Status),

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(status) => ErrorKind::from_rpc_code(status.code())
                .map(http_status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("Generating response for GatewayError: {:?}", self);
        } else {
            tracing::debug!("Generating response for GatewayError: {:?}", self);
        }
        (status_code, Json(json!({ "msg": self.to_string() }))).into_response()
    }
}
