//! Request handlers.

pub mod health;
pub mod jobs;
pub mod pipelines;

pub use health::*;
pub use jobs::*;
pub use pipelines::*;
