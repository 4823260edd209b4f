//! Shared per-request flow: input staging and deferred submission.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use geoprofile_core::{
    new_ticket_id, unpack_if_archive, Job, ProcessorInvocation, TempWorkspace,
};

use super::error_response;
use super::extract::Upload;
use crate::state::AppState;

pub const FILE_NOT_FOUND_MESSAGE: &str = "File not found";

/// 202 body for deferred requests.
#[derive(Debug, Serialize)]
pub struct DeferredResponse {
    pub ticket: String,
    pub endpoint: String,
    pub status: String,
}

/// An accepted input, staged into a fresh workspace.
///
/// Dropping the staged input removes the workspace; the deferred path calls
/// [`StagedInput::into_job`] which hands ownership to the background worker.
pub struct StagedInput {
    pub ticket: String,
    pub workspace: TempWorkspace,
    pub input: PathBuf,
    pub filesize: u64,
}

impl StagedInput {
    fn into_job(self, invocation: ProcessorInvocation) -> Job {
        let input = self.input.clone();
        let filesize = self.filesize;
        let ticket = self.ticket.clone();
        let workspace = self.workspace.keep();
        Job {
            ticket,
            input,
            workspace,
            filesize,
            invocation,
        }
    }
}

/// Stage an uploaded file: create the ticket workspace, save the bytes and
/// unpack archives.
pub fn stage_upload(
    state: &AppState,
    namespace: &str,
    upload: &Upload,
) -> Result<StagedInput, Response> {
    let ticket = new_ticket_id();
    let workspace = TempWorkspace::create(state.temp_dir(), namespace, &ticket)
        .map_err(|e| storage_error("create workspace", e))?;
    let saved = workspace
        .save_upload(&upload.filename, &upload.bytes)
        .map_err(|e| storage_error("save upload", e))?;
    let input = unpack_if_archive(&saved)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(StagedInput {
        ticket,
        workspace,
        input,
        filesize: upload.bytes.len() as u64,
    })
}

/// Stage a server-local file: verify it exists under the input root, copy
/// it into the ticket workspace and unpack archives.
pub fn stage_path(
    state: &AppState,
    namespace: &str,
    resource: &str,
) -> Result<StagedInput, Response> {
    let src = state.input_dir().join(resource);
    if !src.exists() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            FILE_NOT_FOUND_MESSAGE,
        ));
    }

    let ticket = new_ticket_id();
    let workspace = TempWorkspace::create(state.temp_dir(), namespace, &ticket)
        .map_err(|e| storage_error("create workspace", e))?;
    let copied = workspace
        .copy_local(&src)
        .map_err(|e| storage_error("copy input", e))?;
    let filesize = std::fs::metadata(&copied)
        .map(|m| m.len())
        .unwrap_or_default();
    let input = unpack_if_archive(&copied)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(StagedInput {
        ticket,
        workspace,
        input,
        filesize,
    })
}

/// Deferred branch: insert the ticket row, hand the workspace to the
/// executor and acknowledge with the polling endpoints.
pub fn submit_deferred(
    state: &AppState,
    staged: StagedInput,
    invocation: ProcessorInvocation,
) -> Response {
    let ticket = staged.ticket.clone();
    let filesize = staged.filesize;

    if let Err(e) = state.ticket_store().insert(&ticket, filesize) {
        error!("Failed to insert ticket {}: {}", ticket, e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    let job = staged.into_job(invocation);
    let workspace = job.workspace.clone();
    if !state.executor().submit(job) {
        // The row exists but no worker will ever own it; close it out so the
        // client sees a terminal failure instead of an eternal pending.
        let _ = state
            .ticket_store()
            .mark_terminal(&ticket, false, None, Some("Job queue is full"));
        let _ = std::fs::remove_dir_all(&workspace);
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Job queue is full");
    }

    (
        StatusCode::ACCEPTED,
        Json(DeferredResponse {
            endpoint: format!("/resource/{}", ticket),
            status: format!("/status/{}", ticket),
            ticket,
        }),
    )
        .into_response()
}

fn storage_error(action: &str, e: impl std::fmt::Display) -> Response {
    error!("Failed to {}: {}", action, e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to {}", action),
    )
}
