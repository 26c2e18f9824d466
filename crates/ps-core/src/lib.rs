//! ps-core: stable foundation for pidsim.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers shared by plants and metrics)
//! - error (shared error types)
//! - timing (wall-clock timer for run summaries)

pub mod error;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use timing::Timer;
