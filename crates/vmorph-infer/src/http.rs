//! HTTP clients for the model sidecars.
//!
//! All sidecars speak the same small JSON dialect: requests carry file
//! paths on the shared filesystem, failures come back as `{"detail": msg}`,
//! and the generation sidecar runs jobs in the background behind a
//! submit-then-poll pair of endpoints.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vmorph_models::{BoundingBox, FaceDetection, GenerationSpec, SourceFace};

use crate::error::{InferError, InferResult};
use crate::traits::{FaceDetector, FaceSwapper, FrameEnhancer, VideoGenerator};

/// Configuration for a sidecar client.
#[derive(Debug, Clone)]
pub struct SidecarConfig {
    /// Base URL of the sidecar service
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Max retries for transport failures
    pub max_retries: u32,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(300),
            max_retries: 2,
        }
    }
}

impl SidecarConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Shared transport: JSON requests with retry and `{"detail"}` error bodies.
#[derive(Clone)]
struct SidecarClient {
    http: Client,
    config: SidecarConfig,
}

impl SidecarClient {
    fn new(config: SidecarConfig) -> InferResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(InferError::Network)?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> InferResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .with_retry(|| async {
                self.http
                    .post(&url)
                    .json(body)
                    .send()
                    .await
                    .map_err(InferError::Network)
            })
            .await?;

        Self::parse_response(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> InferResult<R> {
        let url = self.url(path);
        let response = self
            .with_retry(|| async { self.http.get(&url).send().await.map_err(InferError::Network) })
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response<R: DeserializeOwned>(response: reqwest::Response) -> InferResult<R> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            return Err(InferError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Execute with retry logic for transport-level failures.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> InferResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = InferResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Sidecar request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| InferError::ServiceUnavailable("Unknown error".to_string())))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    image_path: &'a Path,
}

#[derive(Deserialize)]
struct DetectResponse {
    faces: Vec<DetectedFace>,
}

#[derive(Deserialize)]
struct DetectedFace {
    bbox: [f32; 4],
    score: f32,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

#[derive(Serialize)]
struct SwapFrameRequest<'a> {
    frame_path: &'a Path,
    source_image_path: &'a Path,
    target_bbox: [f32; 4],
}

#[derive(Serialize)]
struct EnhanceFrameRequest<'a> {
    frame_path: &'a Path,
}

/// Sidecars write results back to the shared filesystem and answer with the
/// path.
#[derive(Deserialize)]
struct FrameResponse {
    output_path: PathBuf,
}

#[derive(Serialize)]
struct GenerateSubmission<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    num_frames: u32,
    width: u32,
    height: u32,
    guidance_scale: f32,
    num_inference_steps: u32,
    frames_dir: &'a Path,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateAccepted {
    job_id: String,
}

/// Generation sidecar poll response. `progress` is the percentage of
/// denoising steps completed.
#[derive(Deserialize)]
struct SidecarProgress {
    #[serde(default)]
    progress: f32,
    status: String,
    #[serde(default)]
    result: Option<SidecarResult>,
}

#[derive(Deserialize)]
struct SidecarResult {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    num_frames: Option<u32>,
}

fn load_rgb(path: &Path) -> InferResult<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Client for the face analysis sidecar.
pub struct HttpFaceDetector {
    inner: SidecarClient,
}

impl HttpFaceDetector {
    pub fn new(config: SidecarConfig) -> InferResult<Self> {
        Ok(Self {
            inner: SidecarClient::new(config)?,
        })
    }
}

#[async_trait]
impl FaceDetector for HttpFaceDetector {
    async fn detect(&self, image: &Path) -> InferResult<Vec<FaceDetection>> {
        let request = DetectRequest { image_path: image };
        let response: DetectResponse = self.inner.post_json("/detect", &request).await?;

        Ok(response
            .faces
            .into_iter()
            .map(|f| {
                let bbox = BoundingBox::from(f.bbox);
                match f.embedding {
                    Some(e) if !e.is_empty() => FaceDetection::with_embedding(bbox, f.score, e),
                    _ => FaceDetection::new(bbox, f.score),
                }
            })
            .collect())
    }
}

/// Client for the face swap sidecar.
pub struct HttpFaceSwapper {
    inner: SidecarClient,
}

impl HttpFaceSwapper {
    pub fn new(config: SidecarConfig) -> InferResult<Self> {
        Ok(Self {
            inner: SidecarClient::new(config)?,
        })
    }
}

#[async_trait]
impl FaceSwapper for HttpFaceSwapper {
    async fn swap(
        &self,
        frame: &Path,
        target: &FaceDetection,
        source: &SourceFace,
    ) -> InferResult<RgbImage> {
        let request = SwapFrameRequest {
            frame_path: frame,
            source_image_path: &source.image_path,
            target_bbox: target.bbox.into(),
        };
        let response: FrameResponse = self.inner.post_json("/swap-frame", &request).await?;
        load_rgb(&response.output_path)
    }
}

/// Client for the frame restoration sidecar.
pub struct HttpFrameEnhancer {
    inner: SidecarClient,
}

impl HttpFrameEnhancer {
    pub fn new(config: SidecarConfig) -> InferResult<Self> {
        Ok(Self {
            inner: SidecarClient::new(config)?,
        })
    }
}

#[async_trait]
impl FrameEnhancer for HttpFrameEnhancer {
    async fn enhance(&self, frame: &Path) -> InferResult<RgbImage> {
        let request = EnhanceFrameRequest { frame_path: frame };
        let response: FrameResponse = self.inner.post_json("/enhance-frame", &request).await?;
        load_rgb(&response.output_path)
    }
}

/// Client for the video generation sidecar.
///
/// Generation runs for minutes, so the sidecar accepts the job immediately
/// and this client polls its progress endpoint until a terminal status.
pub struct HttpVideoGenerator {
    inner: SidecarClient,
    poll_interval: Duration,
    max_wait: Duration,
}

impl HttpVideoGenerator {
    pub fn new(config: SidecarConfig) -> InferResult<Self> {
        Ok(Self {
            inner: SidecarClient::new(config)?,
            poll_interval: Duration::from_millis(500),
            max_wait: Duration::from_secs(1800),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

#[async_trait]
impl VideoGenerator for HttpVideoGenerator {
    async fn generate(
        &self,
        spec: &GenerationSpec,
        frames_dir: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> InferResult<u32> {
        let submission = GenerateSubmission {
            prompt: &spec.prompt,
            negative_prompt: &spec.negative_prompt,
            num_frames: spec.num_frames,
            width: spec.width,
            height: spec.height,
            guidance_scale: spec.guidance_scale,
            num_inference_steps: spec.num_inference_steps,
            frames_dir,
        };
        let accepted: GenerateAccepted = self.inner.post_json("/generate", &submission).await?;
        debug!("Generation accepted by sidecar as job {}", accepted.job_id);

        let deadline = tokio::time::Instant::now() + self.max_wait;
        let progress_path = format!("/progress/{}", accepted.job_id);

        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(InferError::Timeout(self.max_wait.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;

            let progress: SidecarProgress = self.inner.get_json(&progress_path).await?;
            match progress.status.as_str() {
                "completed" => {
                    on_progress(1.0);
                    let written = match progress.result.and_then(|r| r.num_frames) {
                        Some(n) => n,
                        None => vmorph_media::list_frames(frames_dir)?.len() as u32,
                    };
                    return Ok(written);
                }
                "error" => {
                    let detail = progress
                        .result
                        .and_then(|r| r.error)
                        .unwrap_or_else(|| "generation failed".to_string());
                    return Err(InferError::GenerationFailed(detail));
                }
                _ => on_progress((progress.progress / 100.0).clamp(0.0, 1.0)),
            }
        }
    }
}
