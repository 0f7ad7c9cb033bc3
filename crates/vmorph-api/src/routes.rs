//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    detect_faces, get_progress, health, submit_enhance, submit_generate, submit_swap,
};
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let pipeline_routes = Router::new()
        // Synchronous face preview
        .route("/detect-faces", post(detect_faces))
        // Job submission
        .route("/swap", post(submit_swap))
        .route("/enhance", post(submit_enhance))
        .route("/generate", post(submit_generate));

    let job_routes = Router::new().route("/progress/:job_id", get(get_progress));

    let health_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(pipeline_routes)
        .merge(job_routes)
        .merge(health_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_bytes))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
