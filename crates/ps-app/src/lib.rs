//! Shared application service layer for pidsim.
//!
//! This crate sits between the configuration format and the front ends,
//! centralizing run compilation, simulation execution, metric extraction,
//! result querying and tuning presets.

pub mod error;
pub mod metrics;
pub mod presets;
pub mod progress;
pub mod query;
pub mod run_compile;
pub mod run_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use metrics::{ControlMetrics, StepMetrics, compute_control_metrics, compute_step_metrics};
pub use presets::{apply_preset, tuning_preset};
pub use progress::{RunProgressEvent, RunStage, SimulationProgress};
pub use query::{RunSummary, Signal, extract_series, frame_at, get_run_summary};
pub use run_compile::{CompiledRun, compile_run};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, execute_run, execute_run_with_progress,
};
