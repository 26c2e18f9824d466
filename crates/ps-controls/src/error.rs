//! Error types for control system operations.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur when configuring a controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Actuator bounds are inverted or NaN.
    #[error("Invalid actuator limits: u_min = {u_min}, u_max = {u_max}")]
    InvalidLimits { u_min: f64, u_max: f64 },
}

impl From<ps_core::CoreError> for ControlError {
    fn from(e: ps_core::CoreError) -> Self {
        match e {
            ps_core::CoreError::NonFinite { what, .. }
            | ps_core::CoreError::InvalidArg { what }
            | ps_core::CoreError::OutOfRange { what, .. } => ControlError::InvalidArg { what },
        }
    }
}
