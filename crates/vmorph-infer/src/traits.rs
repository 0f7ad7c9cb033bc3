//! Inference collaborators the pipelines are written against.
//!
//! Each trait covers one model capability, so tests can substitute scripted
//! fakes and deployments can mix real sidecars with local backends.

use std::path::Path;

use async_trait::async_trait;
use image::RgbImage;

use vmorph_models::{FaceDetection, GenerationSpec, SourceFace};

use crate::error::InferResult;

/// Detects faces in a single image.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Returns every detected face with its box, quality score and, when
    /// the model produced one, an identity embedding.
    async fn detect(&self, image: &Path) -> InferResult<Vec<FaceDetection>>;
}

/// Replaces one face in a frame with the source identity.
#[async_trait]
pub trait FaceSwapper: Send + Sync {
    /// Returns the full frame with `target` replaced by `source`.
    async fn swap(
        &self,
        frame: &Path,
        target: &FaceDetection,
        source: &SourceFace,
    ) -> InferResult<RgbImage>;
}

/// Restores or sharpens a single frame.
#[async_trait]
pub trait FrameEnhancer: Send + Sync {
    async fn enhance(&self, frame: &Path) -> InferResult<RgbImage>;
}

/// Generates video frames from a prompt.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Writes numbered PNG frames into `frames_dir`, reporting inference
    /// progress as a 0..=1 fraction, and returns the frame count written.
    async fn generate(
        &self,
        spec: &GenerationSpec,
        frames_dir: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> InferResult<u32>;
}
