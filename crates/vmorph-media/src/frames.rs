//! Frame file naming and extraction helpers.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// ffmpeg pattern for numbered frame files, zero-based.
pub const FRAME_PATTERN: &str = "frame_%08d.png";

/// File name of the frame at `index` under [`FRAME_PATTERN`].
pub fn frame_file_name(index: u64) -> String {
    format!("frame_{:08}.png", index)
}

/// List extracted frame files in index order.
pub fn list_frames(dir: &Path) -> MediaResult<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "png")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("frame_"))
        })
        .collect();
    frames.sort();
    Ok(frames)
}

/// Extract every frame of `video` into `out_dir` as numbered PNGs.
///
/// Returns the frame paths in order. Uses passthrough frame timing so the
/// file count matches the decoded frame count.
pub async fn extract_all_frames(video: &Path, out_dir: &Path) -> MediaResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let cmd = FfmpegCommand::new(out_dir.join(FRAME_PATTERN))
        .input(video)
        .output_args(["-vsync", "0", "-start_number", "0"]);
    FfmpegRunner::new().run(&cmd).await?;

    let frames = list_frames(out_dir)?;
    if frames.is_empty() {
        return Err(MediaError::invalid_video(format!(
            "no frames decoded from {}",
            video.display()
        )));
    }
    debug!("Extracted {} frames from {}", frames.len(), video.display());
    Ok(frames)
}

/// A preview frame sampled from a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledFrame {
    /// Index of the frame within the source video
    pub index: u64,
    pub path: PathBuf,
}

/// Extract every `every_n`-th frame, up to `max_frames` files.
pub async fn extract_sampled_frames(
    video: &Path,
    every_n: u64,
    max_frames: u32,
    out_dir: &Path,
) -> MediaResult<Vec<SampledFrame>> {
    std::fs::create_dir_all(out_dir)?;
    let every_n = every_n.max(1);

    let cmd = FfmpegCommand::new(out_dir.join("key_%04d.png"))
        .input(video)
        .video_filter(format!("select=not(mod(n\\,{}))", every_n))
        .output_args(["-vsync", "0", "-start_number", "0"])
        .max_frames(max_frames);
    FfmpegRunner::new().run(&cmd).await?;

    let mut files: Vec<PathBuf> = std::fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("key_") && n.ends_with(".png"))
        })
        .collect();
    files.sort();

    Ok(files
        .into_iter()
        .enumerate()
        .map(|(k, path)| SampledFrame {
            index: k as u64 * every_n,
            path,
        })
        .collect())
}
