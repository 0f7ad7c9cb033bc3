//! Text-to-video generation pipeline driver.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use vmorph_jobs::{GENERATION_BAND, GENERATION_ENCODE_AT, LOADING_MODEL_AT};
use vmorph_media::EncodeSettings;
use vmorph_models::{
    GenerateOutcome, GenerateRequest, GenerationMode, GenerationSpec, JobId, JobResult, JobStatus,
    QualityMode, GENERATION_FPS,
};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};

/// Generate a clip from a text prompt and encode it.
pub async fn run_generate(
    ctx: &WorkerContext,
    job_id: &JobId,
    request: &GenerateRequest,
) -> WorkerResult<()> {
    ctx.store
        .update_progress(job_id, 0.0, JobStatus::Starting)
        .await?;

    if request.mode == GenerationMode::ImageToVideo {
        return Err(WorkerError::invalid_input(
            "Image-to-Video requires 14B model. Use Text-to-Video for now.",
        ));
    }

    ctx.store
        .update_progress(job_id, LOADING_MODEL_AT, JobStatus::LoadingModel)
        .await?;

    let spec = GenerationSpec::resolve(
        request.prompt.clone(),
        request.negative_prompt.clone(),
        request.duration,
        request.guidance_scale,
    );

    let scratch = ctx.scratch_dir().await?;

    // The generator reports progress from a sync callback; bridge it into
    // the async store through a watch channel. Coalescing is fine here,
    // pollers only ever want the latest value.
    let (tx, mut rx) = watch::channel(0.0f32);
    let store = Arc::clone(&ctx.store);
    let drain_id = job_id.clone();
    let drain = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let fraction = *rx.borrow();
            let progress = GENERATION_BAND.at_fraction(fraction);
            if store
                .update_progress(&drain_id, progress, JobStatus::ProcessingFrames)
                .await
                .is_err()
            {
                break;
            }
        }
    });

    let on_progress = move |fraction: f32| {
        let _ = tx.send(fraction);
    };
    let generated = ctx
        .generator
        .generate(&spec, scratch.path(), &on_progress)
        .await;
    // Dropping the sender ends the drain task before we touch the store
    // again, so a late fraction cannot race the encode milestone.
    drop(on_progress);
    let _ = drain.await;
    let written = generated?;

    if written != spec.num_frames {
        warn!(
            "Generator wrote {} frames, expected {}",
            written, spec.num_frames
        );
    }

    ctx.store
        .update_progress(job_id, GENERATION_ENCODE_AT, JobStatus::Encoding)
        .await?;

    let output = ctx.output_path("generated", job_id).await?;
    let settings = EncodeSettings {
        fps: GENERATION_FPS as f64,
        quality: QualityMode::Balanced.encode_quality(),
        audio_source: None,
    };
    ctx.encoder.encode(scratch.path(), &settings, &output).await?;

    info!(
        job_id = %job_id,
        "Generation complete: {} frames at {} fps", spec.num_frames, GENERATION_FPS
    );

    ctx.store
        .complete(
            job_id,
            JobResult::Generate(GenerateOutcome {
                output_path: output.display().to_string(),
                num_frames: spec.num_frames,
            }),
        )
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use crate::testkit::{test_context, FailingGenerator};

    use super::*;

    fn generate_request() -> GenerateRequest {
        GenerateRequest {
            mode: GenerationMode::TextToVideo,
            prompt: "a red fox running through snow".to_string(),
            negative_prompt: None,
            duration: 5,
            guidance_scale: 6.0,
            job_id: None,
        }
    }

    #[tokio::test]
    async fn test_generate_happy_path() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let job_id = JobId::from("gen-1");
        ctx.store.create(job_id.clone()).await;

        run_generate(&ctx, &job_id, &generate_request()).await.unwrap();

        let record = ctx.store.get(&job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.progress, 100.0);
        match record.result.unwrap() {
            JobResult::Generate(outcome) => {
                assert_eq!(outcome.num_frames, 81);
                assert!(outcome.output_path.ends_with("generated_gen-1.mp4"));
                assert!(Path::new(&outcome.output_path).is_file());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_image_to_video() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let job_id = JobId::from("gen-2");
        ctx.store.create(job_id.clone()).await;

        let mut request = generate_request();
        request.mode = GenerationMode::ImageToVideo;

        let err = run_generate(&ctx, &job_id, &request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Image-to-Video requires 14B model. Use Text-to-Video for now."
        );
    }

    #[tokio::test]
    async fn test_generate_surfaces_model_error() {
        let root = tempfile::tempdir().unwrap();
        let mut ctx = test_context(root.path());
        ctx.generator = Arc::new(FailingGenerator);
        let job_id = JobId::from("gen-3");
        ctx.store.create(job_id.clone()).await;

        let err = run_generate(&ctx, &job_id, &generate_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("CUDA out of memory"));
    }

    #[tokio::test]
    async fn test_generate_cleans_scratch_directories() {
        let root = tempfile::tempdir().unwrap();
        let ctx = test_context(root.path());
        let job_id = JobId::from("gen-4");
        ctx.store.create(job_id.clone()).await;

        run_generate(&ctx, &job_id, &generate_request()).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(&ctx.config.temp_dir)
            .unwrap()
            .collect();
        assert!(leftovers.is_empty(), "scratch directories not cleaned up");
    }
}
