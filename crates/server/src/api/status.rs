//! Polling and artifact retrieval endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::error_response;
use crate::state::AppState;

/// Status projection of one ticket.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub completed: bool,
    pub success: Option<bool>,
    pub requested: String,
    #[serde(rename = "execution_time(s)")]
    pub execution_time: Option<f64>,
    pub comment: Option<String>,
}

/// GET /status/{ticket}
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(ticket): Path<String>,
) -> Result<Json<StatusResponse>, Response> {
    let record = state
        .ticket_store()
        .get(&ticket)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Not found."))?;

    Ok(Json(StatusResponse {
        completed: record.completed,
        success: record.success,
        requested: record.requested_time.to_rfc3339(),
        execution_time: record.execution_time,
        comment: record.comment,
    }))
}

/// GET /resource/{ticket}
pub async fn resource(
    State(state): State<Arc<AppState>>,
    Path(ticket): Path<String>,
) -> Result<Response, Response> {
    let rel_path = state
        .ticket_store()
        .result_path(&ticket)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Not found."))?;

    let file = state.output_dir().join(&rel_path);
    if !file.is_file() {
        // The ticket points at an artifact that is gone from disk; this is a
        // data-integrity anomaly, not a "not ready yet".
        return Err(error_response(
            StatusCode::INSUFFICIENT_STORAGE,
            "Resource does not exist.",
        ));
    }

    let bytes = tokio::fs::read(&file)
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "result".to_string());

    Ok((
        [
            (
                header::CONTENT_TYPE,
                content_type_for(&filename).to_string(),
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

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
