//! Health, index and metrics handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::info;

use geoprofile_core::check_directory_writable;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthResponse {
    fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            reason: None,
            detail: None,
        }
    }

    fn failed(reason: &str, detail: String) -> Self {
        Self {
            status: "FAILED".to_string(),
            reason: Some(reason.to_string()),
            detail: Some(detail),
        }
    }
}

/// GET /_health
///
/// Always answers 200; failures are reported in the body.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    info!("Performing health checks...");

    if let Err(e) = check_directory_writable(state.temp_dir()) {
        return Json(HealthResponse::failed(
            "temp directory not writable",
            e.to_string(),
        ));
    }

    if let Err(e) = state.ticket_store().ping() {
        return Json(HealthResponse::failed(
            "cannot connect to SQLite backend",
            e.to_string(),
        ));
    }

    Json(HealthResponse::ok())
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// GET /
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "geoprofile",
        version: VERSION,
        endpoints: vec![
            "POST /profile/file/{netcdf|raster|vector}",
            "POST /profile/path/{netcdf|raster|vector}",
            "POST /normalize/file",
            "POST /normalize/path",
            "POST /summarize/file",
            "POST /summarize/path",
            "GET /status/{ticket}",
            "GET /resource/{ticket}",
            "GET /_health",
            "GET /metrics",
        ],
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::encode_metrics(),
    )
}
