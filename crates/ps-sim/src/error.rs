//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while configuring or running a simulation.
///
/// Numerical blow-up is not an error: NaN and infinity are carried into the
/// recorded samples so callers can detect divergence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown plant kind: '{kind}' (expected first_order, mass_spring_damper or dc_motor)")]
    UnknownPlant { kind: String },

    #[error("Controller configuration error: {0}")]
    Controller(#[from] ps_controls::ControlError),

    #[error("Simulation cancelled at step {step}")]
    Cancelled { step: usize },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ps_core::CoreError> for SimError {
    fn from(e: ps_core::CoreError) -> Self {
        match e {
            ps_core::CoreError::NonFinite { what, .. }
            | ps_core::CoreError::InvalidArg { what }
            | ps_core::CoreError::OutOfRange { what, .. } => SimError::InvalidArg { what },
        }
    }
}
