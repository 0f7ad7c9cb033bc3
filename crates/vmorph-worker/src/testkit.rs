//! Scripted collaborators for pipeline tests.
//!
//! The fakes write real PNG files so the frame loop, feathering and
//! re-encode steps run against actual images, without ffmpeg or a model
//! sidecar anywhere near the tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use vmorph_infer::{
    FaceDetector, FaceSwapper, FrameEnhancer, InferError, InferResult, VideoGenerator,
};
use vmorph_jobs::JobStore;
use vmorph_media::{
    frame_file_name, EncodeSettings, FrameEncoder, FrameSource, MediaResult, PreparedFrames,
    SampledFrame, SampledVideo, VideoInfo,
};
use vmorph_models::{BoundingBox, FaceDetection, GenerationSpec, SourceFace};

use crate::context::{EnhanceBackend, WorkerConfig, WorkerContext};

pub(crate) fn test_bbox() -> BoundingBox {
    BoundingBox::new(10.0, 10.0, 30.0, 30.0)
}

pub(crate) fn test_face() -> FaceDetection {
    FaceDetection::with_embedding(test_bbox(), 0.9, vec![1.0, 0.0, 0.0])
}

fn write_gray_png(path: &Path, width: u32, height: u32) -> MediaResult<()> {
    let img = RgbImage::from_pixel(width, height, Rgb([100u8, 100, 100]));
    img.save(path)?;
    Ok(())
}

/// Frame source that fabricates frames instead of decoding a video.
///
/// `prepare` writes `count` flat gray frames; `sample` writes keyframes at
/// indices 0 and 60 of a nominal 6 second, 30 fps clip.
pub(crate) struct SyntheticFrameSource {
    pub count: u64,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
impl FrameSource for SyntheticFrameSource {
    async fn prepare(&self, _video: &Path, dir: &Path) -> MediaResult<PreparedFrames> {
        std::fs::create_dir_all(dir)?;
        let mut frames = Vec::new();
        for i in 0..self.count {
            let path = dir.join(frame_file_name(i));
            write_gray_png(&path, self.width, self.height)?;
            frames.push(path);
        }
        Ok(PreparedFrames {
            frames,
            fps: 30.0,
            width: self.width,
            height: self.height,
        })
    }

    async fn sample(
        &self,
        _video: &Path,
        _interval_secs: f64,
        _max_frames: u32,
        dir: &Path,
    ) -> MediaResult<SampledVideo> {
        std::fs::create_dir_all(dir)?;
        let mut frames = Vec::new();
        for index in [0u64, 60] {
            let path = dir.join(frame_file_name(index));
            write_gray_png(&path, self.width, self.height)?;
            frames.push(SampledFrame { index, path });
        }
        Ok(SampledVideo {
            info: VideoInfo {
                width: self.width,
                height: self.height,
                fps: 30.0,
                total_frames: 180,
                duration_secs: 6.0,
            },
            frames,
        })
    }
}

/// Detector that reports the same faces for every image it is shown.
pub(crate) struct StaticDetector {
    detections: Vec<FaceDetection>,
}

impl StaticDetector {
    pub(crate) fn new(detections: Vec<FaceDetection>) -> Self {
        Self { detections }
    }

    /// Never finds a face.
    pub(crate) fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// One face per frame, but no identity embedding.
    pub(crate) fn without_embedding() -> Self {
        Self::new(vec![FaceDetection::new(test_bbox(), 0.9)])
    }
}

#[async_trait]
impl FaceDetector for StaticDetector {
    async fn detect(&self, _image: &Path) -> InferResult<Vec<FaceDetection>> {
        Ok(self.detections.clone())
    }
}

/// Detector that panics, for exercising the supervisor path.
pub(crate) struct PanickingDetector;

#[async_trait]
impl FaceDetector for PanickingDetector {
    async fn detect(&self, _image: &Path) -> InferResult<Vec<FaceDetection>> {
        panic!("detector exploded");
    }
}

/// Swapper that paints the target box magenta so the blend has an
/// obviously altered region to work with.
pub(crate) struct PaintingSwapper;

#[async_trait]
impl FaceSwapper for PaintingSwapper {
    async fn swap(
        &self,
        frame: &Path,
        target: &FaceDetection,
        _source: &SourceFace,
    ) -> InferResult<RgbImage> {
        let mut img = image::open(frame)?.to_rgb8();
        if let Some(rect) = target.bbox.to_pixel_rect(img.width(), img.height()) {
            for y in rect.y..rect.y + rect.height {
                for x in rect.x..rect.x + rect.width {
                    img.put_pixel(x, y, Rgb([255, 0, 255]));
                }
            }
        }
        Ok(img)
    }
}

pub(crate) struct FailingSwapper;

#[async_trait]
impl FaceSwapper for FailingSwapper {
    async fn swap(
        &self,
        _frame: &Path,
        _target: &FaceDetection,
        _source: &SourceFace,
    ) -> InferResult<RgbImage> {
        Err(InferError::ServiceUnavailable("swap model offline".to_string()))
    }
}

pub(crate) struct FailingEnhancer;

#[async_trait]
impl FrameEnhancer for FailingEnhancer {
    async fn enhance(&self, _frame: &Path) -> InferResult<RgbImage> {
        Err(InferError::ServiceUnavailable("enhance model offline".to_string()))
    }
}

/// Generator that writes a fixed number of frames and reports progress at
/// the half-way and final steps.
pub(crate) struct ScriptedGenerator {
    pub frames: u32,
}

#[async_trait]
impl VideoGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _spec: &GenerationSpec,
        frames_dir: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> InferResult<u32> {
        std::fs::create_dir_all(frames_dir)?;
        on_progress(0.5);
        for i in 0..self.frames {
            write_gray_png(&frames_dir.join(frame_file_name(i as u64)), 64, 64)?;
        }
        on_progress(1.0);
        Ok(self.frames)
    }
}

pub(crate) struct FailingGenerator;

#[async_trait]
impl VideoGenerator for FailingGenerator {
    async fn generate(
        &self,
        _spec: &GenerationSpec,
        _frames_dir: &Path,
        _on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> InferResult<u32> {
        Err(InferError::GenerationFailed("CUDA out of memory".to_string()))
    }
}

/// Encoder that just creates the output file.
pub(crate) struct TouchEncoder;

#[async_trait]
impl FrameEncoder for TouchEncoder {
    async fn encode(
        &self,
        _frames_dir: &Path,
        _settings: &EncodeSettings,
        output: &Path,
    ) -> MediaResult<()> {
        tokio::fs::write(output, b"").await?;
        Ok(())
    }
}

/// Encoder that records the settings it was invoked with.
#[derive(Default)]
pub(crate) struct RecordingEncoder {
    pub settings: Mutex<Option<EncodeSettings>>,
}

#[async_trait]
impl FrameEncoder for RecordingEncoder {
    async fn encode(
        &self,
        _frames_dir: &Path,
        settings: &EncodeSettings,
        output: &Path,
    ) -> MediaResult<()> {
        *self.settings.lock().unwrap() = Some(settings.clone());
        tokio::fs::write(output, b"").await?;
        Ok(())
    }
}

/// Context with every collaborator scripted, rooted under `root`.
pub(crate) fn test_context(root: &Path) -> WorkerContext {
    let config = WorkerConfig {
        temp_dir: root.join("tmp"),
        output_dir: root.join("out"),
        ..WorkerConfig::default()
    };
    WorkerContext {
        store: Arc::new(JobStore::new()),
        detector: Arc::new(StaticDetector::new(vec![test_face()])),
        swapper: Arc::new(PaintingSwapper),
        enhance_backend: EnhanceBackend::Local,
        generator: Arc::new(ScriptedGenerator { frames: 4 }),
        frame_source: Arc::new(SyntheticFrameSource {
            count: 6,
            width: 64,
            height: 64,
        }),
        encoder: Arc::new(TouchEncoder),
        config,
    }
}
