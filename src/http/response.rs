//! Mapping of management results onto HTTP responses.
//!
//! Error responses carry only a status code. The cause is logged here,
//! once, with the operation that produced it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::upstream::{InvalidInput, UpstreamError};

/// Failure of a single endpoint invocation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] InvalidInput),

    #[error("user already exists")]
    UserExists(#[source] UpstreamError),

    #[error("user not found")]
    UserNotFound(#[source] UpstreamError),

    #[error(transparent)]
    Upstream(UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::UserExists(_) => StatusCode::CONFLICT,
            ApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

/// The operation an upstream error came from.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    AddUser { email: &'a str },
    RemoveUser { email: &'a str },
    QueryStats,
}

/// Classify an upstream failure.
///
/// The management service reports duplicate and missing users only as free
/// text, so these two cases are recognised by substring. Anything else,
/// including transport failures, is an internal error.
pub fn translate_upstream_error(operation: Operation<'_>, error: UpstreamError) -> ApiError {
    let remote = error.remote_message().unwrap_or_default();
    let rejected = match operation {
        Operation::AddUser { email } => remote.contains(&format!("User {email} already exists.")),
        Operation::RemoveUser { email } => remote.contains(&format!("User {email} not found.")),
        Operation::QueryStats => false,
    };

    if !rejected {
        tracing::error!(?operation, error = %error, "Management call failed");
        return ApiError::Upstream(error);
    }

    tracing::warn!(?operation, error = %error, "Management call rejected");
    match operation {
        Operation::AddUser { .. } => ApiError::UserExists(error),
        _ => ApiError::UserNotFound(error),
    }
}
