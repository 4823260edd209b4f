//! Profile endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use tracing::info;

use geoprofile_core::{
    ProcessorInvocation, ProcessorOutput, ProfileParams, ResourceKind, ResponseMode,
    ValidationError,
};

use super::extract::{form_fields, multipart_fields};
use super::gateway::{stage_path, stage_upload, submit_deferred, StagedInput};
use super::{error_response, validation_response};
use crate::state::AppState;

fn parse_kind(kind: &str) -> Result<ResourceKind, Response> {
    kind.parse::<ResourceKind>()
        .map_err(|()| error_response(StatusCode::NOT_FOUND, "Not found."))
}

/// POST /profile/file/{netcdf,raster,vector}
pub async fn profile_file(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let kind = parse_kind(&kind)?;
    let (fields, upload) = multipart_fields(multipart).await?;
    let params = ProfileParams::from_fields(&fields).map_err(validation_response)?;
    let upload = upload.ok_or_else(|| {
        validation_response(ValidationError::single("resource", "This field is required"))
    })?;

    info!(
        "Starting /profile/file/{} with file: {}",
        kind.as_str(),
        upload.filename
    );

    let staged = stage_upload(&state, "profile", &upload)?;
    run(state, kind, params, staged).await
}

/// POST /profile/path/{netcdf,raster,vector}
pub async fn profile_path(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, Response> {
    let kind = parse_kind(&kind)?;
    let fields = form_fields(pairs);
    let params = ProfileParams::from_fields(&fields).map_err(validation_response)?;
    let resource = fields.non_empty("resource").ok_or_else(|| {
        validation_response(ValidationError::single("resource", "This field is required"))
    })?;

    info!("Starting /profile/path/{} with file: {}", kind.as_str(), resource);

    let staged = stage_path(&state, "profile", resource)?;
    run(state, kind, params, staged).await
}

async fn run(
    state: Arc<AppState>,
    kind: ResourceKind,
    params: ProfileParams,
    staged: StagedInput,
) -> Result<Response, Response> {
    let response_mode = params.response;
    let invocation = ProcessorInvocation::Profile { kind, params };

    match response_mode {
        ResponseMode::Prompt => {
            // The staged workspace cleans itself up when this scope ends,
            // whether the processor succeeded or not.
            let output = invocation
                .run(state.processor(), &staged.input)
                .await
                .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
            match output {
                ProcessorOutput::Report(report) => Ok(Json(report).into_response()),
                ProcessorOutput::Dataset(_) => Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Profiling produced an unexpected dataset",
                )),
            }
        }
        ResponseMode::Deferred => Ok(submit_deferred(&state, staged, invocation)),
    }
}
