//! Job progress polling handler.

use axum::extract::{Path, State};
use axum::Json;

use vmorph_models::{JobId, JobRecord};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /progress/:job_id
///
/// Returns the full job record: status, percent complete, frame counters
/// while the frame loop runs, and the result payload once completed.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    let job_id = JobId::from(job_id);
    match state.store.get(&job_id).await {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::not_found("Job not found")),
    }
}
