//! Final video encoding from numbered frame files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use vmorph_models::EncodeQuality;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::frames::FRAME_PATTERN;

/// Settings for a frames-to-video encode.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    pub fps: f64,
    pub quality: EncodeQuality,
    /// When set, the audio stream of this file is mapped into the output
    pub audio_source: Option<PathBuf>,
}

/// Encodes a directory of numbered frames into a video file.
#[async_trait]
pub trait FrameEncoder: Send + Sync {
    async fn encode(
        &self,
        frames_dir: &Path,
        settings: &EncodeSettings,
        output: &Path,
    ) -> MediaResult<()>;
}

/// x264 encoder via the ffmpeg CLI.
#[derive(Debug, Clone, Default)]
pub struct FfmpegFrameEncoder {
    timeout_secs: Option<u64>,
}

impl FfmpegFrameEncoder {
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[async_trait]
impl FrameEncoder for FfmpegFrameEncoder {
    async fn encode(
        &self,
        frames_dir: &Path,
        settings: &EncodeSettings,
        output: &Path,
    ) -> MediaResult<()> {
        info!(
            "Encoding {} -> {} (crf={}, preset={})",
            frames_dir.display(),
            output.display(),
            settings.quality.crf,
            settings.quality.preset
        );

        let cmd = build_encode_command(frames_dir, settings, output);
        let mut runner = FfmpegRunner::new();
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }
        runner.run(&cmd).await
    }
}

fn build_encode_command(
    frames_dir: &Path,
    settings: &EncodeSettings,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output).input_with_args(
        [
            "-framerate".to_string(),
            format!("{}", settings.fps),
            "-start_number".to_string(),
            "0".to_string(),
        ],
        frames_dir.join(FRAME_PATTERN),
    );

    if let Some(audio) = &settings.audio_source {
        cmd = cmd
            .input(audio)
            .output_args(["-map", "0:v", "-map", "1:a?"]);
    }

    cmd = cmd
        .video_codec("libx264")
        .pixel_format("yuv420p")
        .preset(settings.quality.preset)
        .crf(settings.quality.crf);

    if settings.audio_source.is_some() {
        cmd = cmd.audio_codec("aac").output_arg("-shortest");
    }

    cmd
}
