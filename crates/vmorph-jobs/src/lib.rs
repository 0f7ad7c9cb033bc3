//! Job tracking for the vmorph backend.
//!
//! Jobs live in process memory: the API creates a record at submission,
//! worker tasks advance it through the status phases, and pollers read it
//! until a terminal state. Records are never deleted while the process
//! lives, so a poll after completion still sees the result.

pub mod error;
pub mod progress;
pub mod store;

pub use error::{JobError, StoreResult};
pub use progress::{
    ProgressBand, ProgressReporter, ENCODE_AT, EXTRACTION_AT, FRAME_BAND, GENERATION_BAND,
    GENERATION_ENCODE_AT, LOADING_MODEL_AT,
};
pub use store::JobStore;
