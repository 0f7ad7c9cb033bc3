use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// A detected face in a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Face bounding box in pixel coordinates
    pub bbox: BoundingBox,
    /// Detector confidence in `[0, 1]`
    pub quality: f32,
    /// Identity embedding, when the detector produces one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl FaceDetection {
    /// Detection without an identity embedding.
    pub fn new(bbox: BoundingBox, quality: f32) -> Self {
        Self {
            bbox,
            quality,
            embedding: None,
        }
    }

    /// Detection carrying an identity embedding.
    pub fn with_embedding(bbox: BoundingBox, quality: f32, embedding: Vec<f32>) -> Self {
        Self {
            bbox,
            quality,
            embedding: Some(embedding),
        }
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// The face to paste into target frames, cut from a still image.
#[derive(Debug, Clone)]
pub struct SourceFace {
    /// Path of the still image the face came from
    pub image_path: PathBuf,
    /// The detection within that image (first face wins)
    pub detection: FaceDetection,
}
