//! Job identifiers, lifecycle statuses and poll records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::quality::QualityMode;

/// Unique identifier for a pipeline job.
///
/// Callers may supply their own id at submission; otherwise a UUIDv4 is
/// generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a new random job id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of a job.
///
/// The happy path is `queued → starting → loading_model →
/// processing_frames → encoding → completed`. `error` and `failed` can be
/// reached from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, worker not yet running
    #[default]
    Queued,
    /// Worker picked the job up
    Starting,
    /// Model collaborators are being prepared
    LoadingModel,
    /// Frame loop (or denoising steps) in progress
    ProcessingFrames,
    /// Final video encode in progress
    Encoding,
    /// Finished successfully, result attached
    Completed,
    /// Worker reported an error
    Error,
    /// Worker terminated without reporting (panic, abort)
    Failed,
}

impl JobStatus {
    /// Returns the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Starting => "starting",
            JobStatus::LoadingModel => "loading_model",
            JobStatus::ProcessingFrames => "processing_frames",
            JobStatus::Encoding => "encoding",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Failed => "failed",
        }
    }

    /// True for states no further update may leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Error | JobStatus::Failed
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown job status.
#[derive(Debug, Error)]
#[error("unknown job status: {0}")]
pub struct ParseJobStatusError(String);

impl FromStr for JobStatus {
    type Err = ParseJobStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "starting" => Ok(JobStatus::Starting),
            "loading_model" => Ok(JobStatus::LoadingModel),
            "processing_frames" => Ok(JobStatus::ProcessingFrames),
            "encoding" => Ok(JobStatus::Encoding),
            "completed" => Ok(JobStatus::Completed),
            "error" => Ok(JobStatus::Error),
            "failed" => Ok(JobStatus::Failed),
            other => Err(ParseJobStatusError(other.to_string())),
        }
    }
}

/// Result payload of a finished face swap job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub output_path: String,
    pub frames_processed: u64,
    pub frames_swapped: u64,
}

/// Result payload of a finished enhancement job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceOutcome {
    pub output_path: String,
    pub quality_mode: QualityMode,
    pub frames_processed: u64,
}

/// Result payload of a finished generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOutcome {
    pub output_path: String,
    pub num_frames: u32,
}

/// Result payload attached to a completed job.
///
/// Serialized untagged: each variant has a distinguishing field
/// (`frames_swapped`, `quality_mode`, `num_frames`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResult {
    Swap(SwapOutcome),
    Enhance(EnhanceOutcome),
    Generate(GenerateOutcome),
}

/// Poll record for a job, returned by `GET /progress/:job_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Percent complete, 0 to 100, rounded to 2 decimals
    pub progress: f32,
    /// Human-readable failure message on `error`/`failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Frames finished so far, present during and after the frame loop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Fresh queued record at zero progress.
    pub fn new(job_id: JobId) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            status: JobStatus::Queued,
            progress: 0.0,
            message: None,
            frames_processed: None,
            total_frames: None,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::ProcessingFrames.is_terminal());
        assert!(!JobStatus::Encoding.is_terminal());
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::LoadingModel).unwrap(),
            "\"loading_model\""
        );
        let s: JobStatus = serde_json::from_str("\"processing_frames\"").unwrap();
        assert_eq!(s, JobStatus::ProcessingFrames);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for s in [
            JobStatus::Queued,
            JobStatus::Starting,
            JobStatus::LoadingModel,
            JobStatus::ProcessingFrames,
            JobStatus::Encoding,
            JobStatus::Completed,
            JobStatus::Error,
            JobStatus::Failed,
        ] {
            assert_eq!(s.as_str().parse::<JobStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_new_record_is_queued_at_zero() {
        let r = JobRecord::new(JobId::from("j1"));
        assert_eq!(r.status, JobStatus::Queued);
        assert_eq!(r.progress, 0.0);
        assert!(r.result.is_none());
        assert!(r.message.is_none());
    }

    #[test]
    fn test_result_untagged_serialization() {
        let r = JobResult::Generate(GenerateOutcome {
            output_path: "/tmp/out.mp4".to_string(),
            num_frames: 81,
        });
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["output_path"], "/tmp/out.mp4");
        assert_eq!(v["num_frames"], 81);

        let back: JobResult = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_record_omits_empty_fields() {
        let r = JobRecord::new(JobId::new());
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("message").is_none());
        assert!(v.get("result").is_none());
        assert!(v.get("frames_processed").is_none());
    }
}
