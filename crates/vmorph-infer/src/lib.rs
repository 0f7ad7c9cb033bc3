//! Clients for the model sidecars.
//!
//! The GPU models (face analysis, face swapping, frame restoration, video
//! generation) run as separate HTTP services that share a filesystem with
//! this backend, so requests pass file paths rather than pixel payloads.
//! Pipelines depend on the narrow traits in [`traits`]; production wiring
//! uses the [`http`] clients, and a pure-Rust enhancement backend in
//! [`local`] covers deployments without a restoration sidecar.

pub mod error;
pub mod http;
pub mod local;
pub mod traits;

pub use error::{InferError, InferResult};
pub use http::{
    HttpFaceDetector, HttpFaceSwapper, HttpFrameEnhancer, HttpVideoGenerator, SidecarConfig,
};
pub use local::LocalUnsharpEnhancer;
pub use traits::{FaceDetector, FaceSwapper, FrameEnhancer, VideoGenerator};
