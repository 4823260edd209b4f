use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{handlers, normalize, profile, status, summarize};
use crate::metrics::metrics_middleware;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config().server.max_upload_mb * 1024 * 1024;
    let cors = cors_layer(&state);

    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/_health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Profile
        .route("/profile/file/{kind}", post(profile::profile_file))
        .route("/profile/path/{kind}", post(profile::profile_path))
        // Normalize
        .route("/normalize/file", post(normalize::normalize_file))
        .route("/normalize/path", post(normalize::normalize_path))
        // Summarize
        .route("/summarize/file", post(summarize::summarize_file))
        .route("/summarize/path", post(summarize::summarize_path))
        // Tickets
        .route("/status/{ticket}", get(status::status))
        .route("/resource/{ticket}", get(status::resource))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router
}

fn cors_layer(state: &AppState) -> Option<CorsLayer> {
    let config = state.config().cors.as_ref()?;

    let layer = if config.origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .origins
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    Some(layer.allow_methods(Any).allow_headers(Any))
}
