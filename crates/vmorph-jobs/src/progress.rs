//! Phase-weighted progress.
//!
//! The 0-100 range is carved into fixed phases so pollers see steady
//! movement: model load and frame extraction get small fixed milestones,
//! the long frame loop (or denoising pass) owns the wide middle band, and
//! the final encode sits just under completion.

use std::sync::Arc;

use vmorph_models::JobId;

use crate::error::StoreResult;
use crate::store::JobStore;

/// Progress milestone once model collaborators are ready.
pub const LOADING_MODEL_AT: f32 = 5.0;
/// Progress milestone once frame extraction starts.
pub const EXTRACTION_AT: f32 = 10.0;
/// Band owned by the per-frame loop of the swap and enhance pipelines.
pub const FRAME_BAND: ProgressBand = ProgressBand {
    start: 15.0,
    span: 75.0,
};
/// Band owned by the denoising steps of the generation pipeline.
pub const GENERATION_BAND: ProgressBand = ProgressBand {
    start: 15.0,
    span: 75.0,
};
/// Progress at which the frame pipelines begin their final encode.
pub const ENCODE_AT: f32 = 95.0;
/// Progress at which the generation pipeline begins its final encode.
pub const GENERATION_ENCODE_AT: f32 = 90.0;

/// Store writes per N finished frames.
const DEFAULT_REPORT_STRIDE: u64 = 10;

/// A sub-range of the 0-100 progress scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBand {
    pub start: f32,
    pub span: f32,
}

impl ProgressBand {
    /// Map a done/total count into this band. Empty totals sit at the
    /// band start.
    pub fn at(&self, done: u64, total: u64) -> f32 {
        if total == 0 {
            return self.start;
        }
        self.start + (done as f32 / total as f32) * self.span
    }

    /// Map a 0..=1 fraction into this band.
    pub fn at_fraction(&self, fraction: f32) -> f32 {
        self.start + fraction.clamp(0.0, 1.0) * self.span
    }

    pub fn end(&self) -> f32 {
        self.start + self.span
    }
}

/// Throttled frame-loop progress writer.
///
/// Writing the store on every frame of a long video is pointless churn;
/// the reporter writes every `stride` frames and always on the final one,
/// carrying the frame counters with each update.
pub struct ProgressReporter {
    store: Arc<JobStore>,
    job_id: JobId,
    band: ProgressBand,
    total: u64,
    stride: u64,
}

impl ProgressReporter {
    pub fn new(store: Arc<JobStore>, job_id: JobId, band: ProgressBand, total: u64) -> Self {
        Self {
            store,
            job_id,
            band,
            total,
            stride: DEFAULT_REPORT_STRIDE,
        }
    }

    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Record a finished frame, writing through on stride multiples and on
    /// the final frame.
    pub async fn frame_done(&self, done: u64) -> StoreResult<()> {
        if done % self.stride != 0 && done != self.total {
            return Ok(());
        }
        let progress = self.band.at(done, self.total);
        self.store
            .update_frame_progress(&self.job_id, progress, done, self.total)
            .await
    }
}

#[cfg(test)]
mod tests {
    use vmorph_models::JobStatus;

    use super::*;

    #[test]
    fn test_band_maps_counts_into_range() {
        assert_eq!(FRAME_BAND.at(0, 100), 15.0);
        assert_eq!(FRAME_BAND.at(50, 100), 52.5);
        assert_eq!(FRAME_BAND.at(100, 100), 90.0);
        assert_eq!(FRAME_BAND.end(), 90.0);
    }

    #[test]
    fn test_band_with_empty_total_stays_at_start() {
        assert_eq!(FRAME_BAND.at(0, 0), 15.0);
    }

    #[test]
    fn test_band_fraction_is_clamped() {
        assert_eq!(GENERATION_BAND.at_fraction(-0.5), 15.0);
        assert_eq!(GENERATION_BAND.at_fraction(0.5), 52.5);
        assert_eq!(GENERATION_BAND.at_fraction(1.5), 90.0);
    }

    #[tokio::test]
    async fn test_reporter_throttles_writes() {
        let store = Arc::new(JobStore::new());
        let id = JobId::new();
        store.create(id.clone()).await;

        let reporter = ProgressReporter::new(Arc::clone(&store), id.clone(), FRAME_BAND, 25);

        reporter.frame_done(5).await.unwrap();
        // off-stride frames are skipped entirely
        assert!(store.get(&id).await.unwrap().frames_processed.is_none());

        reporter.frame_done(10).await.unwrap();
        let record = store.get(&id).await.unwrap();
        assert_eq!(record.frames_processed, Some(10));
        assert_eq!(record.total_frames, Some(25));
        assert_eq!(record.progress, 45.0);
        assert_eq!(record.status, JobStatus::ProcessingFrames);
    }

    #[tokio::test]
    async fn test_reporter_always_writes_final_frame() {
        let store = Arc::new(JobStore::new());
        let id = JobId::new();
        store.create(id.clone()).await;

        let reporter = ProgressReporter::new(Arc::clone(&store), id.clone(), FRAME_BAND, 25);
        let mut last = 0.0f32;
        for done in 1..=25 {
            reporter.frame_done(done).await.unwrap();
            let progress = store.get(&id).await.unwrap().progress;
            assert!(progress >= last, "progress went backwards at frame {done}");
            last = progress;
        }

        let record = store.get(&id).await.unwrap();
        assert_eq!(record.frames_processed, Some(25));
        assert_eq!(record.progress, 90.0);
    }

    #[tokio::test]
    async fn test_reporter_with_short_video() {
        let store = Arc::new(JobStore::new());
        let id = JobId::new();
        store.create(id.clone()).await;

        // fewer frames than the stride: only the final frame writes
        let reporter = ProgressReporter::new(Arc::clone(&store), id.clone(), FRAME_BAND, 3);
        reporter.frame_done(1).await.unwrap();
        reporter.frame_done(2).await.unwrap();
        assert!(store.get(&id).await.unwrap().frames_processed.is_none());

        reporter.frame_done(3).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().progress, 90.0);
    }
}
