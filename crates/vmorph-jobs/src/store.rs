//! In-memory job store.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use vmorph_models::{JobId, JobRecord, JobResult, JobStatus};

use crate::error::{JobError, StoreResult};

/// Round to 2 decimals, which is all pollers ever render.
fn round_progress(progress: f32) -> f32 {
    (progress * 100.0).round() / 100.0
}

/// Concurrency-safe map of job id to record.
///
/// Each job has exactly one writer (its worker task), so updates take the
/// write lock briefly and pollers clone records out under the read lock.
/// Records survive until the process exits.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh queued record, replacing any previous run under the
    /// same id.
    pub async fn create(&self, job_id: JobId) -> JobRecord {
        let record = JobRecord::new(job_id.clone());
        let mut jobs = self.jobs.write().await;
        if jobs.insert(job_id.clone(), record.clone()).is_some() {
            debug!("Job {} resubmitted, record replaced", job_id);
        }
        record
    }

    /// Look up a record. Unknown ids are `None`, never auto-created.
    pub async fn get(&self, job_id: &JobId) -> Option<JobRecord> {
        self.jobs.read().await.get(job_id).cloned()
    }

    pub async fn set_status(&self, job_id: &JobId, status: JobStatus) -> StoreResult<()> {
        self.update(job_id, |record| {
            record.status = status;
        })
        .await
    }

    /// Advance progress and status. Stored progress never decreases.
    pub async fn update_progress(
        &self,
        job_id: &JobId,
        progress: f32,
        status: JobStatus,
    ) -> StoreResult<()> {
        self.update(job_id, |record| {
            let next = round_progress(progress);
            if next > record.progress {
                record.progress = next;
            }
            record.status = status;
        })
        .await
    }

    /// Frame-loop progress: pins the status to `processing_frames` and
    /// records the counters alongside the percentage.
    pub async fn update_frame_progress(
        &self,
        job_id: &JobId,
        progress: f32,
        frames_processed: u64,
        total_frames: u64,
    ) -> StoreResult<()> {
        self.update(job_id, |record| {
            let next = round_progress(progress);
            if next > record.progress {
                record.progress = next;
            }
            record.status = JobStatus::ProcessingFrames;
            record.frames_processed = Some(frames_processed);
            record.total_frames = Some(total_frames);
        })
        .await
    }

    /// Terminal success: progress 100 with the result payload attached.
    pub async fn complete(&self, job_id: &JobId, result: JobResult) -> StoreResult<()> {
        self.update(job_id, |record| {
            record.status = JobStatus::Completed;
            record.progress = 100.0;
            record.result = Some(result);
        })
        .await
    }

    /// Terminal failure reported by the pipeline itself. Progress stays at
    /// its last value so pollers can see how far the job got.
    pub async fn error(&self, job_id: &JobId, message: impl Into<String>) -> StoreResult<()> {
        let message = message.into();
        self.update(job_id, |record| {
            if record.status.is_terminal() {
                warn!(
                    "Job {} already terminal ({}), ignoring error: {}",
                    record.job_id, record.status, message
                );
                return;
            }
            record.status = JobStatus::Error;
            record.message = Some(message);
        })
        .await
    }

    /// Terminal failure observed from outside the pipeline (panic, abort).
    pub async fn fail(&self, job_id: &JobId, message: impl Into<String>) -> StoreResult<()> {
        let message = message.into();
        self.update(job_id, |record| {
            if record.status.is_terminal() {
                warn!(
                    "Job {} already terminal ({}), ignoring failure: {}",
                    record.job_id, record.status, message
                );
                return;
            }
            record.status = JobStatus::Failed;
            record.message = Some(message);
        })
        .await
    }

    async fn update<F>(&self, job_id: &JobId, apply: F) -> StoreResult<()>
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut jobs = self.jobs.write().await;
        let record = jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.clone()))?;
        apply(record);
        record.updated_at = Utc::now();
        Ok(())
    }
}
