//! Pipeline endpoints: preview, swap, enhance, generate.
//!
//! All inputs are paths on the shared filesystem. The three submit
//! endpoints validate what they can cheaply, register a queued job and
//! answer immediately; everything slow happens in the spawned worker.

use std::path::Path as FilePath;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::info;

use vmorph_models::{
    DetectFacesRequest, EnhanceRequest, FacePreviewResponse, GenerateRequest, JobId,
    SubmitResponse, SwapRequest,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /detect-faces
///
/// Synchronous: samples the video, runs detection and tracking, and
/// answers with keyframes for the face picker.
pub async fn detect_faces(
    State(state): State<AppState>,
    Json(request): Json<DetectFacesRequest>,
) -> ApiResult<Json<FacePreviewResponse>> {
    info!("detect_faces video_path={}", request.video_path);
    let response =
        vmorph_worker::detect_faces(&state.worker, FilePath::new(&request.video_path)).await?;
    Ok(Json(response))
}

/// POST /swap
pub async fn submit_swap(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    for path in [&request.source_image_path, &request.video_path] {
        if !FilePath::new(path).is_file() {
            return Err(ApiError::bad_request(format!("File not found: {path}")));
        }
    }

    let job_id = job_id_for(request.job_id.as_deref());
    info!("Queued swap job {} for {}", job_id, request.video_path);
    state.store.create(job_id.clone()).await;
    let _ = vmorph_worker::spawn_swap(Arc::clone(&state.worker), job_id.clone(), request);

    Ok(Json(SubmitResponse::queued(job_id)))
}

/// POST /enhance
pub async fn submit_enhance(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    if !FilePath::new(&request.video_path).is_file() {
        return Err(ApiError::bad_request("Video file not found"));
    }

    let job_id = job_id_for(request.job_id.as_deref());
    info!(
        "Queued enhance job {} for {} ({})",
        job_id, request.video_path, request.quality_mode
    );
    state.store.create(job_id.clone()).await;
    let _ = vmorph_worker::spawn_enhance(Arc::clone(&state.worker), job_id.clone(), request);

    Ok(Json(SubmitResponse::queued(job_id)))
}

/// POST /generate
///
/// Mode problems are reported through the job record rather than the
/// submit response, so pollers always have somewhere to look.
pub async fn submit_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let job_id = job_id_for(request.job_id.as_deref());
    info!("Queued generation job {} ({})", job_id, request.mode);
    state.store.create(job_id.clone()).await;
    let _ = vmorph_worker::spawn_generate(Arc::clone(&state.worker), job_id.clone(), request);

    Ok(Json(SubmitResponse::queued(job_id)))
}

/// Callers may bring their own id; otherwise one is generated.
fn job_id_for(requested: Option<&str>) -> JobId {
    requested.map(JobId::from).unwrap_or_default()
}
