//! Face swap pipeline driver.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use vmorph_jobs::{ProgressReporter, ENCODE_AT, EXTRACTION_AT, FRAME_BAND, LOADING_MODEL_AT};
use vmorph_media::{blend_swapped_region, EncodeSettings, TrackManager};
use vmorph_models::{
    FaceDetection, JobId, JobResult, JobStatus, SourceFace, SwapOutcome, SwapRequest,
};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};
use crate::preview::preview_representative;

/// Swap the requested face throughout the video.
///
/// Frames where the target face is absent, or where the swap model fails,
/// pass through unmodified; the job only fails on errors that affect the
/// whole run.
pub async fn run_swap(
    ctx: &WorkerContext,
    job_id: &JobId,
    request: &SwapRequest,
) -> WorkerResult<()> {
    let source_image = Path::new(&request.source_image_path);
    let video = Path::new(&request.video_path);
    let quality = request.quality_mode;

    ctx.store
        .update_progress(job_id, 0.0, JobStatus::Starting)
        .await?;

    for path in [source_image, video] {
        if !path.is_file() {
            return Err(WorkerError::invalid_input(format!(
                "File not found: {}",
                path.display()
            )));
        }
    }

    let source_detections = ctx.detector.detect(source_image).await?;
    let Some(source_detection) = source_detections.into_iter().next() else {
        return Err(WorkerError::invalid_input("No face found in source image"));
    };
    let source = SourceFace {
        image_path: source_image.to_path_buf(),
        detection: source_detection,
    };

    ctx.store
        .update_progress(job_id, LOADING_MODEL_AT, JobStatus::LoadingModel)
        .await?;

    // Resolve the preview track id to its identity embedding, so the full
    // pass can follow the face even when it moves between keyframes.
    let representative =
        preview_representative(ctx, video, request.target_face_track_id).await?;

    ctx.store
        .update_progress(job_id, EXTRACTION_AT, JobStatus::ProcessingFrames)
        .await?;

    let scratch = ctx.scratch_dir().await?;
    let prepared = ctx.frame_source.prepare(video, scratch.path()).await?;
    let total = prepared.total();

    let mut tracker = TrackManager::for_mode(quality);
    let target_id = match representative {
        Some(embedding) => tracker.seed(embedding),
        // No embedding to pin the identity: fall back to the raw preview
        // id and rely on spatial continuity.
        None => request.target_face_track_id,
    };

    let reporter = ProgressReporter::new(Arc::clone(&ctx.store), job_id.clone(), FRAME_BAND, total);
    let mut frames_swapped: u64 = 0;

    for (idx, frame_path) in prepared.frames.iter().enumerate() {
        let detections = ctx.detector.detect(frame_path).await?;
        let track_ids = tracker.assign(&detections);

        if let Some(target) = find_target(&detections, &track_ids, target_id) {
            match ctx.swapper.swap(frame_path, target, &source).await {
                Ok(swapped) => {
                    let original = image::open(frame_path)?.to_rgb8();
                    let blended = blend_swapped_region(
                        &original,
                        &swapped,
                        target.bbox,
                        ctx.config.feather_fraction,
                    );
                    blended.save(frame_path)?;
                    frames_swapped += 1;
                }
                Err(e) => {
                    warn!("Swap failed on frame {}, keeping original: {}", idx, e);
                }
            }
        }

        reporter.frame_done(idx as u64 + 1).await?;
    }

    ctx.store
        .update_progress(job_id, ENCODE_AT, JobStatus::Encoding)
        .await?;

    let output = ctx.output_path("swap", job_id).await?;
    let settings = EncodeSettings {
        fps: prepared.fps,
        quality: quality.encode_quality(),
        audio_source: None,
    };
    ctx.encoder.encode(scratch.path(), &settings, &output).await?;

    info!(
        job_id = %job_id,
        "Swap complete: {}/{} frames swapped", frames_swapped, total
    );

    ctx.store
        .complete(
            job_id,
            JobResult::Swap(SwapOutcome {
                output_path: output.display().to_string(),
                frames_processed: total,
                frames_swapped,
            }),
        )
        .await?;

    Ok(())
}

fn find_target<'a>(
    detections: &'a [FaceDetection],
    track_ids: &[u32],
    target_id: u32,
) -> Option<&'a FaceDetection> {
    detections
        .iter()
        .zip(track_ids)
        .find(|(_, &id)| id == target_id)
        .map(|(det, _)| det)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vmorph_models::{JobStatus, QualityMode};

    use crate::testkit::{test_context, FailingSwapper, StaticDetector};

    use super::*;

    fn swap_request(root: &Path) -> SwapRequest {
        let source = root.join("source.png");
        let video = root.join("in.mp4");
        std::fs::write(&source, b"stub").unwrap();
        std::fs::write(&video, b"stub").unwrap();
        SwapRequest {
            source_image_path: source.display().to_string(),
            video_path: video.display().to_string(),
            target_face_track_id: 0,
            quality_mode: QualityMode::Balanced,
            job_id: None,
        }
    }

    #[tokio::test]
    async fn test_swap_happy_path() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let request = swap_request(root.path());
        let job_id = JobId::from("swap-1");
        ctx.store.create(job_id.clone()).await;

        run_swap(&ctx, &job_id, &request).await.unwrap();

        let record = ctx.store.get(&job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.progress, 100.0);
        match record.result.unwrap() {
            JobResult::Swap(outcome) => {
                assert_eq!(outcome.frames_processed, 6);
                assert_eq!(outcome.frames_swapped, 6);
                assert!(outcome.output_path.ends_with("swap_swap-1.mp4"));
                assert!(Path::new(&outcome.output_path).is_file());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_swap_missing_video_file() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let mut request = swap_request(root.path());
        request.video_path = "/nonexistent.mp4".to_string();
        let job_id = JobId::from("swap-2");
        ctx.store.create(job_id.clone()).await;

        let err = run_swap(&ctx, &job_id, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "File not found: /nonexistent.mp4");
    }

    #[tokio::test]
    async fn test_swap_requires_source_face() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = test_context(root.path());
        ctx.detector = Arc::new(StaticDetector::empty());
        let request = swap_request(root.path());
        let job_id = JobId::from("swap-3");
        ctx.store.create(job_id.clone()).await;

        let err = run_swap(&ctx, &job_id, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "No face found in source image");
    }

    #[tokio::test]
    async fn test_swap_model_failure_keeps_frames() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = test_context(root.path());
        ctx.swapper = Arc::new(FailingSwapper);
        let request = swap_request(root.path());
        let job_id = JobId::from("swap-4");
        ctx.store.create(job_id.clone()).await;

        run_swap(&ctx, &job_id, &request).await.unwrap();

        let record = ctx.store.get(&job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        match record.result.unwrap() {
            JobResult::Swap(outcome) => {
                assert_eq!(outcome.frames_processed, 6);
                assert_eq!(outcome.frames_swapped, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_swap_cleans_scratch_directories() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let request = swap_request(root.path());
        let job_id = JobId::from("swap-5");
        ctx.store.create(job_id.clone()).await;

        run_swap(&ctx, &job_id, &request).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(&ctx.config.temp_dir)
            .unwrap()
            .collect();
        assert!(leftovers.is_empty(), "scratch directories not cleaned up");
    }
}
