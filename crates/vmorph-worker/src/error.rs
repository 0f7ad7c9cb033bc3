//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// Bad job input. The display text is what the poller sees, so these
    /// messages are written for end users.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Media error: {0}")]
    Media(#[from] vmorph_media::MediaError),

    #[error("Inference error: {0}")]
    Infer(#[from] vmorph_infer::InferError),

    #[error("Job store error: {0}")]
    Store(#[from] vmorph_jobs::JobError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
