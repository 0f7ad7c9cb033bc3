//! Pure-Rust enhancement backend.

use std::path::Path;

use async_trait::async_trait;
use image::RgbImage;

use vmorph_media::unsharp_mask;
use vmorph_models::QualityMode;

use crate::error::InferResult;
use crate::traits::FrameEnhancer;

/// Sharpens frames on the CPU, for deployments without a restoration
/// sidecar.
#[derive(Debug, Clone)]
pub struct LocalUnsharpEnhancer {
    strength: f32,
}

impl LocalUnsharpEnhancer {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }

    pub fn for_mode(mode: QualityMode) -> Self {
        Self::new(mode.unsharp_strength())
    }
}

#[async_trait]
impl FrameEnhancer for LocalUnsharpEnhancer {
    async fn enhance(&self, frame: &Path) -> InferResult<RgbImage> {
        let image = image::open(frame)?.to_rgb8();
        Ok(unsharp_mask(&image, self.strength))
    }
}
