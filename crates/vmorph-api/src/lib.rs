//! Axum HTTP API server.
//!
//! This crate provides:
//! - Submit endpoints for the swap, enhance and generate pipelines
//! - A synchronous face preview endpoint for the track picker
//! - Job progress polling
//! - CORS and request logging middleware

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
