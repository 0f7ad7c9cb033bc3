//! Face preview: sampled keyframes with tracked faces.
//!
//! The preview runs a lightweight tracking pass over a handful of sampled
//! frames so the picker UI can show who appears in the video. The track
//! ids it hands out are later resolved back to identity embeddings when a
//! swap is submitted, so both passes must use the same tracker settings.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info};

use vmorph_media::TrackManager;
use vmorph_models::{FacePreviewResponse, Keyframe, KeyframeFace, QualityMode};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};

/// Tracker settings shared by the preview and the swap-side resolution
/// pass. Preview ids only stay meaningful if both passes track alike.
const PREVIEW_MODE: QualityMode = QualityMode::Balanced;

/// Sample the video every couple of seconds and report the faces found,
/// with stable track ids and an inline thumbnail per keyframe.
pub async fn detect_faces(
    ctx: &WorkerContext,
    video_path: &Path,
) -> WorkerResult<FacePreviewResponse> {
    if !video_path.is_file() {
        return Err(WorkerError::invalid_input("Video file not found"));
    }

    let scratch = ctx.scratch_dir().await?;
    let sampled = ctx
        .frame_source
        .sample(
            video_path,
            ctx.config.preview_interval_secs,
            ctx.config.preview_max_frames,
            scratch.path(),
        )
        .await?;
    let info = sampled.info;

    let mut tracker = TrackManager::for_mode(PREVIEW_MODE);
    let mut keyframes = Vec::with_capacity(sampled.frames.len());

    for frame in &sampled.frames {
        let detections = ctx.detector.detect(&frame.path).await?;
        let track_ids = tracker.assign(&detections);

        let faces = detections
            .iter()
            .zip(&track_ids)
            .map(|(det, &track_id)| KeyframeFace {
                bbox: det.bbox.to_int_array(),
                track_id,
            })
            .collect();

        let bytes = tokio::fs::read(&frame.path).await?;
        let image_base64 = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));

        keyframes.push(Keyframe {
            frame_index: frame.index,
            time: (frame.index as f64 / info.fps * 100.0).round() / 100.0,
            width: info.width,
            height: info.height,
            faces,
            image_base64: Some(image_base64),
        });
    }

    info!(
        "Preview of {}: {} keyframes, {} tracks",
        video_path.display(),
        keyframes.len(),
        tracker.track_count()
    );

    Ok(FacePreviewResponse {
        fps: info.fps,
        total_frames: info.total_frames,
        keyframes,
    })
}

/// Re-run the preview tracking pass and resolve one of its track ids to a
/// representative identity embedding.
///
/// Returns `None` when the track never produced an embedding (or the id is
/// unknown); the caller then falls back to positional matching.
pub(crate) async fn preview_representative(
    ctx: &WorkerContext,
    video_path: &Path,
    track_id: u32,
) -> WorkerResult<Option<Vec<f32>>> {
    let scratch = ctx.scratch_dir().await?;
    let sampled = ctx
        .frame_source
        .sample(
            video_path,
            ctx.config.preview_interval_secs,
            ctx.config.preview_max_frames,
            scratch.path(),
        )
        .await?;

    let mut tracker = TrackManager::for_mode(PREVIEW_MODE);
    for frame in &sampled.frames {
        let detections = ctx.detector.detect(&frame.path).await?;
        tracker.assign(&detections);
    }

    let representative = tracker
        .representatives()
        .into_iter()
        .find(|(id, _)| *id == track_id)
        .map(|(_, embedding)| embedding);

    debug!(
        "Track {} representative: {}",
        track_id,
        if representative.is_some() {
            "found"
        } else {
            "absent"
        }
    );

    Ok(representative)
}
