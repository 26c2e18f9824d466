//! PID control law for pidsim.
//!
//! The controller is split into an immutable configuration ([`PidController`]) and an
//! explicit state record ([`PidState`]). Each update consumes the previous state and
//! returns the next one together with the actuator command, so several controllers can
//! run side by side without sharing anything.
//!
//! # Safeguards
//!
//! - Derivative on measurement, low-pass filtered with bandwidth `N`
//! - Actuator saturation to `[u_min, u_max]` (bounds may be infinite)
//! - Conditional-integration anti-windup

pub mod controller;
pub mod error;

pub use controller::{PidController, PidGains, PidLimits, PidOutput, PidState};
pub use error::{ControlError, ControlResult};
