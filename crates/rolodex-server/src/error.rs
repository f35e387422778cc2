use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rolodex_service::{ErrorKind, ServiceError};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::ConfigError;
use crate::dto::ErrorResponse;

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("store error")]
    Store(#[from] rolodex_store::StoreError),

    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

pub(crate) const INVALID_REQUEST: &str = "Invalid request.";
pub(crate) const SERVER_ERROR: &str = "server error";
pub(crate) const USER_NOT_FOUND: &str = "user_not_found";

/// Failure answered to an HTTP client.
///
/// Internal failures carry no detail; the cause is logged instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("user not found")]
    NotFound,

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::InvalidRequest(detail) => ErrorResponse {
                status: INVALID_REQUEST.into(),
                error: Some(detail.clone()),
            },
            Self::NotFound => ErrorResponse {
                status: INVALID_REQUEST.into(),
                error: Some(USER_NOT_FOUND.into()),
            },
            Self::Internal => ErrorResponse {
                status: SERVER_ERROR.into(),
                error: None,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err.kind() {
            ErrorKind::RecordNotFound => {
                warn!(error = %err, "answering 404");
                Self::NotFound
            }
            ErrorKind::StoreUnavailable | ErrorKind::StoreCorrupt => {
                error!(kind = %err.kind(), error = %error_chain(&err), "answering 500");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Render an error and all of its sources as `outer: inner: root`.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
