//! Media layer for the vmorph backend.
//!
//! Wraps the ffmpeg/ffprobe CLIs for probing, frame extraction and final
//! encoding, and implements the pixel-level pieces of the pipelines:
//! identity tracking across frames, seam feathering around swapped faces,
//! and the local unsharp mask.

pub mod command;
pub mod encode;
pub mod error;
pub mod feather;
pub mod frames;
pub mod identity;
pub mod probe;
pub mod source;
pub mod unsharp;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use encode::{EncodeSettings, FfmpegFrameEncoder, FrameEncoder};
pub use error::{MediaError, MediaResult};
pub use feather::{blend_swapped_region, DEFAULT_FEATHER_FRACTION};
pub use frames::{
    extract_all_frames, extract_sampled_frames, frame_file_name, list_frames, SampledFrame,
    FRAME_PATTERN,
};
pub use identity::{cosine_similarity, EmbeddingGallery, TrackManager, TrackerConfig};
pub use probe::{probe_video, VideoInfo};
pub use source::{FrameSource, PreparedFrames, SampledVideo, VideoFrameSource};
pub use unsharp::unsharp_mask;
