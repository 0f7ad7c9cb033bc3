//! Pipeline workers for the vmorph backend.
//!
//! Each submitted job runs as a spawned tokio task that drives one of the
//! pipelines (face swap, enhancement, generation) and writes its progress
//! into the shared job store. A supervisor task watches every worker so a
//! panic or abort still lands in the store as a terminal state instead of
//! leaving the job stuck mid-progress.

pub mod context;
pub mod enhance;
pub mod error;
pub mod generate;
pub mod preview;
pub mod swap;

#[cfg(test)]
pub(crate) mod testkit;

pub use context::{EnhanceBackend, WorkerConfig, WorkerContext};
pub use error::{WorkerError, WorkerResult};
pub use preview::detect_faces;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

use vmorph_models::{EnhanceRequest, GenerateRequest, JobId, SwapRequest};

/// Failure message recorded when a worker dies without reporting.
pub const TERMINATED_MESSAGE: &str = "worker terminated unexpectedly";

/// Run a face swap job in the background.
pub fn spawn_swap(ctx: Arc<WorkerContext>, job_id: JobId, request: SwapRequest) -> JoinHandle<()> {
    let worker = {
        let ctx = Arc::clone(&ctx);
        let job_id = job_id.clone();
        tokio::spawn(async move { swap::run_swap(&ctx, &job_id, &request).await })
    };
    supervise(ctx, job_id, "swap", worker)
}

/// Run an enhancement job in the background.
pub fn spawn_enhance(
    ctx: Arc<WorkerContext>,
    job_id: JobId,
    request: EnhanceRequest,
) -> JoinHandle<()> {
    let worker = {
        let ctx = Arc::clone(&ctx);
        let job_id = job_id.clone();
        tokio::spawn(async move { enhance::run_enhance(&ctx, &job_id, &request).await })
    };
    supervise(ctx, job_id, "enhance", worker)
}

/// Run a generation job in the background.
pub fn spawn_generate(
    ctx: Arc<WorkerContext>,
    job_id: JobId,
    request: GenerateRequest,
) -> JoinHandle<()> {
    let worker = {
        let ctx = Arc::clone(&ctx);
        let job_id = job_id.clone();
        tokio::spawn(async move { generate::run_generate(&ctx, &job_id, &request).await })
    };
    supervise(ctx, job_id, "generate", worker)
}

/// Wait out a worker task and record how it ended.
///
/// Pipeline errors become `error` records with the pipeline's own message;
/// a join failure (panic, abort) becomes a `failed` record, since the
/// worker never got the chance to report anything.
fn supervise(
    ctx: Arc<WorkerContext>,
    job_id: JobId,
    kind: &'static str,
    worker: JoinHandle<WorkerResult<()>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match worker.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("{} job {} failed: {}", kind, job_id, e);
                if let Err(store_err) = ctx.store.error(&job_id, e.to_string()).await {
                    error!("Could not record failure of job {}: {}", job_id, store_err);
                }
            }
            Err(join_err) => {
                error!("{} job {} terminated: {}", kind, job_id, join_err);
                if let Err(store_err) = ctx.store.fail(&job_id, TERMINATED_MESSAGE).await {
                    error!("Could not record termination of job {}: {}", job_id, store_err);
                }
            }
        }
    })
}
