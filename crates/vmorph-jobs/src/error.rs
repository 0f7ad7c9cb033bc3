//! Job store error types.

use thiserror::Error;

use vmorph_models::JobId;

pub type StoreResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(JobId),
}
