//! Summarize endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use geoprofile_core::{
    ProcessorInvocation, ResponseMode, SummarizeParams, ValidationError,
};

use super::extract::multipart_fields;
use super::gateway::{stage_path, stage_upload, submit_deferred, StagedInput};
use super::{error_response, validation_response};
use crate::state::AppState;

/// POST /summarize/file
pub async fn summarize_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let (fields, upload) = multipart_fields(multipart).await?;
    let params = SummarizeParams::from_fields(&fields).map_err(validation_response)?;
    let upload = upload.ok_or_else(|| {
        validation_response(ValidationError::single("resource", "This field is required"))
    })?;

    info!("Starting /summarize/file with file: {}", upload.filename);

    let staged = stage_upload(&state, "summarize", &upload)?;
    run(state, params, staged).await
}

/// POST /summarize/path
///
/// The path variant still takes a multipart body; `resource` carries the
/// server-local path as a plain text field.
pub async fn summarize_path(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let (fields, _upload) = multipart_fields(multipart).await?;
    let params = SummarizeParams::from_fields(&fields).map_err(validation_response)?;
    let resource = fields.non_empty("resource").ok_or_else(|| {
        validation_response(ValidationError::single("resource", "This field is required"))
    })?;

    info!("Starting /summarize/path with file: {}", resource);

    let staged = stage_path(&state, "summarize", resource)?;
    run(state, params, staged).await
}

async fn run(
    state: Arc<AppState>,
    params: SummarizeParams,
    staged: StagedInput,
) -> Result<Response, Response> {
    match params.response {
        ResponseMode::Prompt => {
            let summary = state
                .processor()
                .summarize(&staged.input, &params)
                .await
                .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
            Ok(Json(summary).into_response())
        }
        ResponseMode::Deferred => Ok(submit_deferred(
            &state,
            staged,
            ProcessorInvocation::Summarize { params },
        )),
    }
}
