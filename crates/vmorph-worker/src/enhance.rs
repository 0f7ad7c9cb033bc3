//! Frame enhancement pipeline driver.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use vmorph_jobs::{ProgressReporter, ENCODE_AT, EXTRACTION_AT, FRAME_BAND, LOADING_MODEL_AT};
use vmorph_media::EncodeSettings;
use vmorph_models::{EnhanceOutcome, EnhanceRequest, JobId, JobResult, JobStatus};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};

/// Enhance every frame of the video and re-encode it, carrying the
/// original audio over.
///
/// A frame the enhancer rejects passes through unmodified.
pub async fn run_enhance(
    ctx: &WorkerContext,
    job_id: &JobId,
    request: &EnhanceRequest,
) -> WorkerResult<()> {
    let video = Path::new(&request.video_path);
    let quality = request.quality_mode;

    ctx.store
        .update_progress(job_id, 0.0, JobStatus::Starting)
        .await?;

    if !video.is_file() {
        return Err(WorkerError::invalid_input("Video file not found"));
    }

    ctx.store
        .update_progress(job_id, LOADING_MODEL_AT, JobStatus::LoadingModel)
        .await?;
    let enhancer = ctx.enhance_backend.enhancer_for(quality);

    ctx.store
        .update_progress(job_id, EXTRACTION_AT, JobStatus::ProcessingFrames)
        .await?;

    let scratch = ctx.scratch_dir().await?;
    let prepared = ctx.frame_source.prepare(video, scratch.path()).await?;
    let total = prepared.total();

    let reporter = ProgressReporter::new(Arc::clone(&ctx.store), job_id.clone(), FRAME_BAND, total);

    for (idx, frame_path) in prepared.frames.iter().enumerate() {
        match enhancer.enhance(frame_path).await {
            Ok(enhanced) => enhanced.save(frame_path)?,
            Err(e) => {
                warn!("Enhance failed on frame {}, keeping original: {}", idx, e);
            }
        }
        reporter.frame_done(idx as u64 + 1).await?;
    }

    ctx.store
        .update_progress(job_id, ENCODE_AT, JobStatus::Encoding)
        .await?;

    let output = ctx.output_path("enhanced", job_id).await?;
    let settings = EncodeSettings {
        fps: prepared.fps,
        quality: quality.encode_quality(),
        audio_source: Some(video.to_path_buf()),
    };
    ctx.encoder.encode(scratch.path(), &settings, &output).await?;

    info!(job_id = %job_id, "Enhancement complete: {} frames", total);

    ctx.store
        .complete(
            job_id,
            JobResult::Enhance(EnhanceOutcome {
                output_path: output.display().to_string(),
                quality_mode: quality,
                frames_processed: total,
            }),
        )
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vmorph_models::QualityMode;

    use crate::testkit::{test_context, FailingEnhancer, RecordingEncoder};

    use super::*;

    fn enhance_request(root: &Path, quality_mode: QualityMode) -> EnhanceRequest {
        let video = root.join("in.mp4");
        std::fs::write(&video, b"stub").unwrap();
        EnhanceRequest {
            video_path: video.display().to_string(),
            quality_mode,
            job_id: None,
        }
    }

    #[tokio::test]
    async fn test_enhance_happy_path() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let request = enhance_request(root.path(), QualityMode::Balanced);
        let job_id = JobId::from("enh-1");
        ctx.store.create(job_id.clone()).await;

        run_enhance(&ctx, &job_id, &request).await.unwrap();

        let record = ctx.store.get(&job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.progress, 100.0);
        match record.result.unwrap() {
            JobResult::Enhance(outcome) => {
                assert_eq!(outcome.frames_processed, 6);
                assert_eq!(outcome.quality_mode, QualityMode::Balanced);
                assert!(outcome.output_path.ends_with("enhanced_enh-1.mp4"));
                assert!(Path::new(&outcome.output_path).is_file());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_enhance_encode_settings_carry_audio_and_quality() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = test_context(root.path());
        let encoder = Arc::new(RecordingEncoder::default());
        ctx.encoder = encoder.clone();
        let request = enhance_request(root.path(), QualityMode::Best);
        let job_id = JobId::from("enh-2");
        ctx.store.create(job_id.clone()).await;

        run_enhance(&ctx, &job_id, &request).await.unwrap();

        let settings = encoder.settings.lock().unwrap().clone().unwrap();
        assert_eq!(settings.fps, 30.0);
        assert_eq!(settings.quality.crf, 18);
        assert_eq!(settings.quality.preset, "slow");
        assert_eq!(
            settings.audio_source.as_deref(),
            Some(Path::new(&request.video_path))
        );
    }

    #[tokio::test]
    async fn test_enhance_model_failure_keeps_frames() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = test_context(root.path());
        ctx.enhance_backend = crate::EnhanceBackend::Model(Arc::new(FailingEnhancer));
        let request = enhance_request(root.path(), QualityMode::Fast);
        let job_id = JobId::from("enh-3");
        ctx.store.create(job_id.clone()).await;

        run_enhance(&ctx, &job_id, &request).await.unwrap();

        let record = ctx.store.get(&job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.frames_processed, Some(6));
    }

    #[tokio::test]
    async fn test_enhance_missing_video() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let request = EnhanceRequest {
            video_path: "/nonexistent.mp4".to_string(),
            quality_mode: QualityMode::Balanced,
            job_id: None,
        };
        let job_id = JobId::from("enh-4");
        ctx.store.create(job_id.clone()).await;

        let err = run_enhance(&ctx, &job_id, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "Video file not found");
    }
}
