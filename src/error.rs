use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the service.
///
/// Validation, rate-limit and not-found failures are user-facing and map to
/// 4xx responses with descriptive bodies. Store failures map to a generic
/// 500; the underlying cause is logged, never leaked.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("too many requests")]
    RateLimited { retry_after: Duration },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("unauthorized")]
    Unauthorized,

    #[error("database error")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            Error::RateLimited { retry_after } => {
                // Round up so a just-expired window never reports zero.
                let secs = retry_after.as_secs().max(1);
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": "Too many comments. Try again in a few minutes.",
                        "retryAfter": secs,
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            Error::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            )
                .into_response(),
            Error::Store(e) => {
                error!("Store error while serving a request: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Server error" })),
                )
                    .into_response()
            }
            Error::Other(e) => {
                error!("Unexpected error while serving a request: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Server error" })),
                )
                    .into_response()
            }
        }
    }
}
