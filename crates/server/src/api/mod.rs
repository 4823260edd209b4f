pub mod extract;
pub mod gateway;
pub mod handlers;
pub mod normalize;
pub mod profile;
pub mod routes;
pub mod status;
pub mod summarize;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

use geoprofile_core::ValidationError;

/// Plain error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Per-field validation error body.
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: BTreeMap<String, String>,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub(crate) fn validation_response(err: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ValidationErrorResponse { errors: err.errors }),
    )
        .into_response()
}
