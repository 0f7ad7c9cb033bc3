//! Sidecar client error types.

use thiserror::Error;

pub type InferResult<T> = Result<T, InferError>;

#[derive(Debug, Error)]
pub enum InferError {
    #[error("Inference service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Inference service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Media error: {0}")]
    Media(#[from] vmorph_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InferError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InferError::ServiceUnavailable(_) | InferError::Timeout(_) | InferError::Network(_)
        )
    }
}
