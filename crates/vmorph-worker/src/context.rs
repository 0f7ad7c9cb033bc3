//! Shared state and configuration for the pipeline drivers.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use vmorph_infer::{FaceDetector, FaceSwapper, FrameEnhancer, LocalUnsharpEnhancer, VideoGenerator};
use vmorph_jobs::JobStore;
use vmorph_media::{FrameEncoder, FrameSource};
use vmorph_models::{JobId, QualityMode};

use crate::error::WorkerResult;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Parent directory for per-job scratch directories
    pub temp_dir: PathBuf,
    /// Directory final artifacts are written to
    pub output_dir: PathBuf,
    /// Seconds of playback between preview keyframes
    pub preview_interval_secs: f64,
    /// Max keyframes returned by a preview
    pub preview_max_frames: u32,
    /// Feather width as a fraction of the swapped region
    pub feather_fraction: f32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("/tmp/vmorph"),
            output_dir: PathBuf::from("/tmp/vmorph/outputs"),
            preview_interval_secs: 2.0,
            preview_max_frames: 15,
            feather_fraction: vmorph_media::DEFAULT_FEATHER_FRACTION,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            temp_dir: std::env::var("VMORPH_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            output_dir: std::env::var("VMORPH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            preview_interval_secs: std::env::var("VMORPH_PREVIEW_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.preview_interval_secs),
            preview_max_frames: std::env::var("VMORPH_PREVIEW_MAX_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.preview_max_frames),
            feather_fraction: std::env::var("VMORPH_FEATHER_FRACTION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.feather_fraction),
        }
    }
}

/// How enhancement frames are produced.
#[derive(Clone)]
pub enum EnhanceBackend {
    /// Restoration model sidecar
    Model(Arc<dyn FrameEnhancer>),
    /// CPU unsharp mask, strength chosen by the quality mode
    Local,
}

impl EnhanceBackend {
    pub fn enhancer_for(&self, mode: QualityMode) -> Arc<dyn FrameEnhancer> {
        match self {
            EnhanceBackend::Model(enhancer) => Arc::clone(enhancer),
            EnhanceBackend::Local => Arc::new(LocalUnsharpEnhancer::for_mode(mode)),
        }
    }
}

/// Everything a pipeline driver needs.
#[derive(Clone)]
pub struct WorkerContext {
    pub store: Arc<JobStore>,
    pub detector: Arc<dyn FaceDetector>,
    pub swapper: Arc<dyn FaceSwapper>,
    pub enhance_backend: EnhanceBackend,
    pub generator: Arc<dyn VideoGenerator>,
    pub frame_source: Arc<dyn FrameSource>,
    pub encoder: Arc<dyn FrameEncoder>,
    pub config: WorkerConfig,
}

impl WorkerContext {
    /// Fresh scratch directory under the configured temp dir. Dropped
    /// guards delete their directory, whichever way the job ends.
    pub(crate) async fn scratch_dir(&self) -> WorkerResult<TempDir> {
        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        Ok(TempDir::new_in(&self.config.temp_dir)?)
    }

    /// Final artifact path for a job, outside the scratch tree.
    pub(crate) async fn output_path(&self, kind: &str, job_id: &JobId) -> WorkerResult<PathBuf> {
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        Ok(self.config.output_dir.join(format!("{kind}_{job_id}.mp4")))
    }
}
