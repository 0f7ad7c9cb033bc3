//! Shared data models for the vmorph backend.
//!
//! This crate provides Serde-serializable types for:
//! - Bounding-box geometry used by tracking and compositing
//! - Face detections and source faces
//! - Jobs, statuses and result payloads
//! - Quality modes and their per-mode parameter tables
//! - Text-to-video generation constants
//! - HTTP request/response schemas

pub mod api;
pub mod detection;
pub mod generation;
pub mod geometry;
pub mod job;
pub mod quality;

// Re-export common types
pub use api::{
    DetectFacesRequest, EnhanceRequest, FacePreviewResponse, GenerateRequest, Keyframe,
    KeyframeFace, SubmitResponse, SwapRequest,
};
pub use detection::{FaceDetection, SourceFace};
pub use generation::{frames_for_duration, GenerationMode, GenerationSpec, GENERATION_FPS};
pub use geometry::{BoundingBox, PixelRect};
pub use job::{
    EnhanceOutcome, GenerateOutcome, JobId, JobRecord, JobResult, JobStatus, SwapOutcome,
};
pub use quality::{EncodeQuality, QualityMode};
