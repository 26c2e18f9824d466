//! Step-response and control-effort metrics.
//!
//! Computes overshoot, rise time, settling time and final value from a completed
//! run, plus actuator usage and error integrals for the control loop.

use ps_controls::PidLimits;
use ps_core::nan_max;
use ps_results::Sample;
use serde::{Deserialize, Serialize};

/// Guard against dividing by a zero setpoint in the overshoot ratio.
const OVERSHOOT_EPS: f64 = 1e-9;
/// Settling band as a fraction of `max(1, |setpoint|)`.
const SETTLING_BAND: f64 = 0.02;

/// Step-response metrics. Every field is `None` for an empty run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StepMetrics {
    /// Peak excursion beyond the setpoint, percent of `|setpoint|`
    pub overshoot_pct: Option<f64>,
    /// Time from 10% to 90% of the setpoint (seconds)
    pub rise_time_s: Option<f64>,
    /// Time after which the output stays within the 2% band (seconds)
    pub settling_time_s: Option<f64>,
    /// Last true output
    pub final_value: Option<f64>,
}

/// Compute step-response metrics of `y_true` against `setpoint`.
pub fn compute_step_metrics(samples: &[Sample], setpoint: f64) -> StepMetrics {
    if samples.is_empty() {
        return StepMetrics::default();
    }

    StepMetrics {
        overshoot_pct: compute_overshoot(samples, setpoint),
        rise_time_s: compute_rise_time(samples, setpoint),
        settling_time_s: compute_settling_time(samples, setpoint),
        final_value: samples.last().map(|s| s.y_true),
    }
}

fn compute_overshoot(samples: &[Sample], setpoint: f64) -> Option<f64> {
    let peak = samples
        .iter()
        .map(|s| s.y_true)
        .fold(f64::NEG_INFINITY, nan_max);
    let overshoot = (peak - setpoint) / OVERSHOOT_EPS.max(setpoint.abs()) * 100.0;
    overshoot.is_finite().then_some(overshoot)
}

/// `t90 - t10`, each taken at the first upward crossing of its threshold.
fn compute_rise_time(samples: &[Sample], setpoint: f64) -> Option<f64> {
    let y10 = 0.1 * setpoint;
    let y90 = 0.9 * setpoint;
    let mut t10 = None;
    let mut t90 = None;

    for pair in samples.windows(2) {
        let (prev, cur) = (pair[0].y_true, pair[1].y_true);
        if t10.is_none() && prev < y10 && cur >= y10 {
            t10 = Some(pair[1].t);
        }
        if prev < y90 && cur >= y90 {
            t90 = Some(pair[1].t);
            break;
        }
    }

    Some(t90? - t10?)
}

/// First sample time from which every later sample stays inside the band.
fn compute_settling_time(samples: &[Sample], setpoint: f64) -> Option<f64> {
    let tol = SETTLING_BAND * setpoint.abs().max(1.0);
    // NaN compares false, so it counts as outside the band
    let inside = |y: f64| (y - setpoint).abs() <= tol;

    let first_settled = match samples.iter().rposition(|s| !inside(s.y_true)) {
        Some(last_outside) => last_outside + 1,
        None => 0,
    };
    samples.get(first_settled).map(|s| s.t)
}

/// Actuator usage and tracking-error summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ControlMetrics {
    /// Largest `|u|` over the run
    pub max_abs_u: Option<f64>,
    /// Percent of samples with the command pinned at a finite bound
    pub saturation_pct: Option<f64>,
    /// Trapezoidal integral of `|e|` over time
    pub integral_abs_error: Option<f64>,
    /// `reference - y_true` at the last sample
    pub steady_state_error: Option<f64>,
}

pub fn compute_control_metrics(samples: &[Sample], limits: &PidLimits) -> ControlMetrics {
    if samples.is_empty() {
        return ControlMetrics::default();
    }

    let max_abs_u = samples
        .iter()
        .map(|s| s.u.abs())
        .fold(f64::NEG_INFINITY, nan_max);

    let saturation_pct = if limits.u_min.is_finite() || limits.u_max.is_finite() {
        let pinned = samples
            .iter()
            .filter(|s| s.u == limits.u_min || s.u == limits.u_max)
            .count();
        Some(pinned as f64 / samples.len() as f64 * 100.0)
    } else {
        None
    };

    let integral_abs_error = samples
        .windows(2)
        .map(|w| 0.5 * (w[0].e.abs() + w[1].e.abs()) * (w[1].t - w[0].t))
        .sum::<f64>();

    let steady_state_error = samples.last().map(|s| s.reference - s.y_true);

    ControlMetrics {
        max_abs_u: Some(max_abs_u),
        saturation_pct,
        integral_abs_error: Some(integral_abs_error),
        steady_state_error,
    }
}
