//! Text-to-video generation constants and request types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Frame rate the generation model produces.
pub const GENERATION_FPS: u32 = 15;
/// Output width in pixels.
pub const GENERATION_WIDTH: u32 = 832;
/// Output height in pixels.
pub const GENERATION_HEIGHT: u32 = 480;
/// Denoising steps per clip.
pub const GENERATION_STEPS: u32 = 50;
/// Default classifier-free guidance scale.
pub const DEFAULT_GUIDANCE_SCALE: f32 = 6.0;
/// Default clip duration in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 5;

/// Stock negative prompt applied when the caller does not supply one.
pub const DEFAULT_NEGATIVE_PROMPT: &str = "Bright tones, overexposed, static, blurred details, \
subtitles, style, works, paintings, images, static, overall gray, worst quality, low quality, \
JPEG compression residue, ugly, incomplete, extra fingers, poorly drawn hands, poorly drawn \
faces, deformed, disfigured, misshapen limbs, fused fingers, still picture, messy background, \
three legs, many people in the background, walking backwards";

/// Map a requested duration in seconds to the model's frame count.
///
/// The model supports a fixed set of clip lengths at 15 fps; unknown
/// durations fall back to the 5 second clip.
pub fn frames_for_duration(duration_secs: u32) -> u32 {
    match duration_secs {
        3 => 45,
        5 => 81,
        8 => 129,
        _ => 81,
    }
}

/// Generation mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    #[default]
    TextToVideo,
    ImageToVideo,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::TextToVideo => "text-to-video",
            GenerationMode::ImageToVideo => "image-to-video",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fully-resolved parameters handed to the video generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSpec {
    pub prompt: String,
    pub negative_prompt: String,
    pub num_frames: u32,
    pub width: u32,
    pub height: u32,
    pub guidance_scale: f32,
    pub num_inference_steps: u32,
}

impl GenerationSpec {
    /// Build a spec from caller inputs, applying all defaults.
    pub fn resolve(
        prompt: String,
        negative_prompt: Option<String>,
        duration_secs: u32,
        guidance_scale: f32,
    ) -> Self {
        Self {
            prompt,
            negative_prompt: negative_prompt
                .unwrap_or_else(|| DEFAULT_NEGATIVE_PROMPT.to_string()),
            num_frames: frames_for_duration(duration_secs),
            width: GENERATION_WIDTH,
            height: GENERATION_HEIGHT,
            guidance_scale,
            num_inference_steps: GENERATION_STEPS,
        }
    }
}
