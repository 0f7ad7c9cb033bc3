//! Frame source abstraction for the pipeline drivers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::MediaResult;
use crate::frames::{extract_all_frames, extract_sampled_frames, SampledFrame};
use crate::probe::{probe_video, VideoInfo};

/// A video broken out into per-frame files, with its metadata.
#[derive(Debug, Clone)]
pub struct PreparedFrames {
    /// Frame file paths in playback order
    pub frames: Vec<PathBuf>,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl PreparedFrames {
    /// Total frame count, known up front.
    pub fn total(&self) -> u64 {
        self.frames.len() as u64
    }
}

/// A handful of frames sampled from a video, with its metadata.
#[derive(Debug, Clone)]
pub struct SampledVideo {
    pub info: VideoInfo,
    pub frames: Vec<SampledFrame>,
}

/// Turns an input video into frame files on disk.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Probe `video` and extract all of its frames into `dir`.
    async fn prepare(&self, video: &Path, dir: &Path) -> MediaResult<PreparedFrames>;

    /// Probe `video` and extract one frame per `interval_secs` of playback
    /// into `dir`, up to `max_frames` files.
    async fn sample(
        &self,
        video: &Path,
        interval_secs: f64,
        max_frames: u32,
        dir: &Path,
    ) -> MediaResult<SampledVideo>;
}

/// Frame source backed by ffprobe + ffmpeg extraction.
#[derive(Debug, Clone, Default)]
pub struct VideoFrameSource;

impl VideoFrameSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameSource for VideoFrameSource {
    async fn prepare(&self, video: &Path, dir: &Path) -> MediaResult<PreparedFrames> {
        let info = probe_video(video).await?;
        let frames = extract_all_frames(video, dir).await?;
        Ok(PreparedFrames {
            frames,
            fps: info.fps,
            width: info.width,
            height: info.height,
        })
    }

    async fn sample(
        &self,
        video: &Path,
        interval_secs: f64,
        max_frames: u32,
        dir: &Path,
    ) -> MediaResult<SampledVideo> {
        let info = probe_video(video).await?;
        let every_n = ((info.fps * interval_secs) as u64).max(1);
        let frames = extract_sampled_frames(video, every_n, max_frames, dir).await?;
        Ok(SampledVideo { info, frames })
    }
}
