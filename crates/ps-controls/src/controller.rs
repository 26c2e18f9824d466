//! PID controller with filtered derivative and conditional-integration anti-windup.
//!
//! One update per fixed sample interval `dt`:
//!
//! ```text
//! e      = sp - pv
//! dm     = (pv - pv_last) / dt
//! d_filt = d_filt + dt * N * (dm - d_filt)
//! u_raw  = Kp * e + Ki * integral - Kd * d_filt
//! u      = clamp(u_raw, u_min, u_max)
//! ```
//!
//! The derivative acts on the measurement, so setpoint steps do not kick the output.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Controller gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (per second).
    pub ki: f64,
    /// Derivative gain (seconds).
    pub kd: f64,
    /// Derivative filter bandwidth (rad/s). Larger values filter less.
    pub n: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64, n: f64) -> Self {
        Self { kp, ki, kd, n }
    }

    /// Pure proportional law with the default filter bandwidth.
    pub fn proportional(kp: f64) -> Self {
        Self {
            kp,
            ..Self::new(0.0, 0.0, 0.0, 50.0)
        }
    }
}

impl Default for PidGains {
    fn default() -> Self {
        Self::new(2.0, 0.5, 0.2, 50.0)
    }
}

/// Actuator bounds. Either side may be infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidLimits {
    pub u_min: f64,
    pub u_max: f64,
}

impl PidLimits {
    /// Create limits, rejecting NaN and inverted bounds.
    pub fn new(u_min: f64, u_max: f64) -> ControlResult<Self> {
        if u_min.is_nan() || u_max.is_nan() || u_min > u_max {
            return Err(ControlError::InvalidLimits { u_min, u_max });
        }
        Ok(Self { u_min, u_max })
    }

    /// No saturation.
    pub fn unbounded() -> Self {
        Self {
            u_min: f64::NEG_INFINITY,
            u_max: f64::INFINITY,
        }
    }

    /// Saturate a command. NaN passes through.
    pub fn clamp(&self, u: f64) -> f64 {
        u.clamp(self.u_min, self.u_max)
    }
}

impl Default for PidLimits {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// PID controller configuration.
///
/// Immutable for the lifetime of a run: changing gains means building a new controller
/// and starting again from [`PidState::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidController {
    gains: PidGains,
    limits: PidLimits,
    anti_windup: bool,
    dt: f64,
}

impl PidController {
    /// Create a new PID controller.
    ///
    /// # Arguments
    ///
    /// * `gains` - Kp, Ki, Kd and derivative filter bandwidth N
    /// * `limits` - Actuator bounds
    /// * `anti_windup` - Enable conditional integration
    /// * `dt` - Fixed sample interval (seconds)
    pub fn new(
        gains: PidGains,
        limits: PidLimits,
        anti_windup: bool,
        dt: f64,
    ) -> ControlResult<Self> {
        ps_core::ensure_positive(dt, "dt must be positive and finite")?;
        ps_core::ensure_positive(gains.n, "derivative filter N must be positive and finite")?;
        if !gains.kp.is_finite() || !gains.ki.is_finite() || !gains.kd.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "gains must be finite",
            });
        }
        let limits = PidLimits::new(limits.u_min, limits.u_max)?;
        Ok(Self {
            gains,
            limits,
            anti_windup,
            dt,
        })
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn limits(&self) -> &PidLimits {
        &self.limits
    }

    pub fn anti_windup(&self) -> bool {
        self.anti_windup
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Compute one controller step.
    ///
    /// # Arguments
    ///
    /// * `state` - Controller state from the previous step
    /// * `setpoint` - Desired value
    /// * `measurement` - Measured process variable
    ///
    /// # Returns
    ///
    /// Updated state and output.
    pub fn update(
        &self,
        state: &PidState,
        setpoint: f64,
        measurement: f64,
    ) -> (PidState, PidOutput) {
        let PidGains { kp, ki, kd, n } = self.gains;
        let dt = self.dt;

        let error = setpoint - measurement;

        // Derivative on measurement through a first-order low-pass
        let dm = (measurement - state.last_measurement) / dt;
        let filtered_derivative =
            state.filtered_derivative + dt * n * (dm - state.filtered_derivative);

        let u_unsat = kp * error + ki * state.integral - kd * filtered_derivative;
        let u = self.limits.clamp(u_unsat);

        let integrate = if self.anti_windup {
            // Keep integrating while the error drives the command back into range
            u == u_unsat
                || (u == self.limits.u_max && error < 0.0)
                || (u == self.limits.u_min && error > 0.0)
        } else {
            true
        };

        let integral = if integrate {
            state.integral + error * dt
        } else {
            state.integral
        };

        let next = PidState {
            integral,
            filtered_derivative,
            last_measurement: measurement,
        };

        (next, PidOutput { u, e: error })
    }
}

/// PID controller state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidState {
    integral: f64,
    filtered_derivative: f64,
    last_measurement: f64,
}

impl PidState {
    /// Integral accumulator.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Filtered derivative of the measurement.
    pub fn filtered_derivative(&self) -> f64 {
        self.filtered_derivative
    }

    /// Measurement seen on the previous step.
    pub fn last_measurement(&self) -> f64 {
        self.last_measurement
    }
}

/// Controller output for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidOutput {
    /// Saturated actuator command.
    pub u: f64,
    /// Control error `setpoint - measurement`.
    pub e: f64,
}
