//! Normalize endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::info;

use geoprofile_core::{
    store_dataset, NormalizeParams, ProcessorInvocation, ResponseMode, ValidationError,
};

use super::extract::multipart_fields;
use super::gateway::{stage_path, stage_upload, submit_deferred, StagedInput};
use super::{error_response, validation_response};
use crate::state::AppState;

/// POST /normalize/file
pub async fn normalize_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let (fields, upload) = multipart_fields(multipart).await?;
    let params = NormalizeParams::from_fields(&fields).map_err(validation_response)?;
    let upload = upload.ok_or_else(|| {
        validation_response(ValidationError::single("resource", "This field is required"))
    })?;

    info!("Starting /normalize/file with file: {}", upload.filename);

    let staged = stage_upload(&state, "normalize", &upload)?;
    run(state, params, staged).await
}

/// POST /normalize/path
///
/// The path variant still takes a multipart body; `resource` carries the
/// server-local path as a plain text field.
pub async fn normalize_path(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let (fields, _upload) = multipart_fields(multipart).await?;
    let params = NormalizeParams::from_fields(&fields).map_err(validation_response)?;
    let resource = fields.non_empty("resource").ok_or_else(|| {
        validation_response(ValidationError::single("resource", "This field is required"))
    })?;

    info!("Starting /normalize/path with file: {}", resource);

    let staged = stage_path(&state, "normalize", resource)?;
    run(state, params, staged).await
}

async fn run(
    state: Arc<AppState>,
    params: NormalizeParams,
    staged: StagedInput,
) -> Result<Response, Response> {
    match params.response {
        ResponseMode::Prompt => {
            let dataset = state
                .processor()
                .normalize(&staged.input, &params)
                .await
                .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

            // Export inside the workspace, stream the artifact out, then let
            // the workspace guard remove everything.
            let exported = store_dataset(&dataset, staged.workspace.path(), &dataset.base_name)
                .map_err(|e| {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                })?;
            let bytes = tokio::fs::read(&exported).await.map_err(|e| {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })?;

            let filename = exported
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "result".to_string());

            Ok((
                [
                    (
                        header::CONTENT_TYPE,
                        dataset.format.content_type().to_string(),
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        ResponseMode::Deferred => Ok(submit_deferred(
            &state,
            staged,
            ProcessorInvocation::Normalize { params },
        )),
    }
}
