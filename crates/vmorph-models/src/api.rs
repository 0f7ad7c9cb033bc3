//! HTTP request and response schemas.
//!
//! Request bodies are snake_case; submit and preview responses use the
//! camelCase keys the polling clients expect.

use serde::{Deserialize, Serialize};

use crate::generation::{GenerationMode, DEFAULT_DURATION_SECS, DEFAULT_GUIDANCE_SCALE};
use crate::job::{JobId, JobStatus};
use crate::quality::QualityMode;

/// Body of `POST /detect-faces`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectFacesRequest {
    pub video_path: String,
}

/// Body of `POST /swap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub source_image_path: String,
    pub video_path: String,
    /// Track id chosen from a `/detect-faces` preview
    #[serde(default)]
    pub target_face_track_id: u32,
    #[serde(default)]
    pub quality_mode: QualityMode,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Body of `POST /enhance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceRequest {
    pub video_path: String,
    #[serde(default)]
    pub quality_mode: QualityMode,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub mode: GenerationMode,
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    /// Clip length in seconds (3, 5 or 8)
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f32,
    #[serde(default)]
    pub job_id: Option<String>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

fn default_guidance_scale() -> f32 {
    DEFAULT_GUIDANCE_SCALE
}

/// Response of the three submit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

impl SubmitResponse {
    /// The submit endpoints always answer with a queued job.
    pub fn queued(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobStatus::Queued,
        }
    }
}

/// One face within a preview keyframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyframeFace {
    pub bbox: [i32; 4],
    #[serde(rename = "trackId")]
    pub track_id: u32,
}

/// A sampled preview frame with its tracked faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyframe {
    #[serde(rename = "frameIndex")]
    pub frame_index: u64,
    /// Timestamp in seconds, rounded to 2 decimals
    pub time: f64,
    pub width: u32,
    pub height: u32,
    pub faces: Vec<KeyframeFace>,
    /// PNG data URI of the frame, for the picker UI
    #[serde(rename = "imageBase64", skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

/// Response of `POST /detect-faces`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacePreviewResponse {
    pub fps: f64,
    #[serde(rename = "totalFrames")]
    pub total_frames: u64,
    pub keyframes: Vec<Keyframe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_request_defaults() {
        let req: SwapRequest = serde_json::from_str(
            r#"{"source_image_path": "/tmp/face.png", "video_path": "/tmp/in.mp4"}"#,
        )
        .unwrap();
        assert_eq!(req.target_face_track_id, 0);
        assert_eq!(req.quality_mode, QualityMode::Balanced);
        assert!(req.job_id.is_none());
    }

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"prompt": "a red fox running"}"#).unwrap();
        assert_eq!(req.mode, GenerationMode::TextToVideo);
        assert_eq!(req.duration, 5);
        assert!((req.guidance_scale - 6.0).abs() < f32::EPSILON);
        assert!(req.negative_prompt.is_none());
    }

    #[test]
    fn test_submit_response_uses_camel_case() {
        let resp = SubmitResponse::queued(JobId::from("abc"));
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["jobId"], "abc");
        assert_eq!(v["status"], "queued");
    }

    #[test]
    fn test_keyframe_wire_keys() {
        let kf = Keyframe {
            frame_index: 60,
            time: 2.0,
            width: 1280,
            height: 720,
            faces: vec![KeyframeFace {
                bbox: [10, 20, 110, 140],
                track_id: 1,
            }],
            image_base64: Some("data:image/png;base64,AAAA".to_string()),
        };
        let v = serde_json::to_value(&kf).unwrap();
        assert_eq!(v["frameIndex"], 60);
        assert_eq!(v["faces"][0]["trackId"], 1);
        assert_eq!(v["imageBase64"], "data:image/png;base64,AAAA");
    }
}
