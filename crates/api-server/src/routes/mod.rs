//! Route handlers

pub mod agents;
pub mod health;
pub mod runs;
pub mod scrape;

use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn bad_request(message: impl Into<String>) -> RouteError {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub(crate) fn not_found(message: impl Into<String>) -> RouteError {
    error_response(StatusCode::NOT_FOUND, message)
}

pub(crate) fn internal_error(err: impl std::fmt::Display) -> RouteError {
    error!("Internal error: {}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub(crate) fn map_core_error(err: crew_core::Error) -> RouteError {
    use crew_core::Error;

    let status = match err {
        Error::AgentNotFound(_) | Error::RunNotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::InvalidTransition { .. } | Error::RunFinished(_) => StatusCode::CONFLICT,
        Error::Io(_) | Error::Serialization(_) => return internal_error(err),
    };
    error_response(status, err.to_string())
}
