//! Application state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use vmorph_infer::{
    HttpFaceDetector, HttpFaceSwapper, HttpFrameEnhancer, HttpVideoGenerator, SidecarConfig,
};
use vmorph_jobs::JobStore;
use vmorph_media::{check_ffmpeg, check_ffprobe, FfmpegFrameEncoder, VideoFrameSource};
use vmorph_worker::{EnhanceBackend, WorkerConfig, WorkerContext};

use crate::config::{ApiConfig, EnhanceBackendChoice};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<JobStore>,
    pub worker: Arc<WorkerContext>,
}

impl AppState {
    /// Wire the real collaborators: HTTP sidecar clients, the ffmpeg
    /// frame source and encoder, and a fresh in-memory job store.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        // Jobs fail fast with a clear message when these are missing, but
        // the server itself can still come up.
        match check_ffmpeg() {
            Ok(path) => info!("Found ffmpeg at {}", path.display()),
            Err(e) => warn!("{}; media jobs will fail", e),
        }
        match check_ffprobe() {
            Ok(path) => info!("Found ffprobe at {}", path.display()),
            Err(e) => warn!("{}; media jobs will fail", e),
        }

        let timeout = Duration::from_secs(config.sidecar_timeout_secs);
        let face = SidecarConfig::new(&config.face_sidecar_url).with_timeout(timeout);
        let video = SidecarConfig::new(&config.video_sidecar_url).with_timeout(timeout);

        let enhance_backend = match config.enhance_backend {
            EnhanceBackendChoice::Model => {
                EnhanceBackend::Model(Arc::new(HttpFrameEnhancer::new(face.clone())?))
            }
            EnhanceBackendChoice::Local => EnhanceBackend::Local,
        };

        let generator = HttpVideoGenerator::new(video)?
            .with_max_wait(Duration::from_secs(config.generation_max_wait_secs));

        let store = Arc::new(JobStore::new());
        let worker = Arc::new(WorkerContext {
            store: Arc::clone(&store),
            detector: Arc::new(HttpFaceDetector::new(face.clone())?),
            swapper: Arc::new(HttpFaceSwapper::new(face)?),
            enhance_backend,
            generator: Arc::new(generator),
            frame_source: Arc::new(VideoFrameSource::new()),
            encoder: Arc::new(FfmpegFrameEncoder::new()),
            config: WorkerConfig::from_env(),
        });

        Ok(Self {
            config,
            store,
            worker,
        })
    }
}
