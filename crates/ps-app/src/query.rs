//! Query helpers for extracting data from completed runs.

use ps_results::{Frame, Sample};

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and data.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub sample_count: usize,
    pub dt: Option<f64>,
}

/// Get run summary from samples.
pub fn get_run_summary(samples: &[Sample]) -> AppResult<RunSummary> {
    if samples.is_empty() {
        return Err(AppError::InvalidInput("No samples in run".to_string()));
    }

    let t_min = samples.first().map(|s| s.t).unwrap_or(0.0);
    let t_max = samples.last().map(|s| s.t).unwrap_or(0.0);
    let dt = samples.get(1).map(|s| s.t - t_min);

    Ok(RunSummary {
        time_range: (t_min, t_max),
        sample_count: samples.len(),
        dt,
    })
}

/// Animation frame at `index`. Out-of-range indices are invalid input.
pub fn frame_at(samples: &[Sample], index: usize) -> AppResult<Frame> {
    Ok(ps_results::frame_at(samples, index)?)
}

/// Signals that can be pulled out of a run as `(t, value)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    TrueOutput,
    MeasuredOutput,
    Reference,
    Command,
    Error,
}

impl Signal {
    pub const ALL: [Signal; 5] = [
        Signal::TrueOutput,
        Signal::MeasuredOutput,
        Signal::Reference,
        Signal::Command,
        Signal::Error,
    ];

    /// Column name as used in exports.
    pub fn column(self) -> &'static str {
        match self {
            Signal::TrueOutput => "y_true",
            Signal::MeasuredOutput => "y_measured",
            Signal::Reference => "reference",
            Signal::Command => "u",
            Signal::Error => "e",
        }
    }

    fn value(self, s: &Sample) -> f64 {
        match self {
            Signal::TrueOutput => s.y_true,
            Signal::MeasuredOutput => s.y_measured,
            Signal::Reference => s.reference,
            Signal::Command => s.u,
            Signal::Error => s.e,
        }
    }
}

impl std::str::FromStr for Signal {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .into_iter()
            .find(|sig| sig.column() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown signal: {s}")))
    }
}

/// Extract one signal as `(time, value)` pairs.
pub fn extract_series(samples: &[Sample], signal: Signal) -> Vec<(f64, f64)> {
    samples.iter().map(|s| (s.t, signal.value(s))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Sample> {
        (0..3)
            .map(|i| {
                let t = i as f64 * 0.5;
                Sample {
                    t,
                    y_true: t,
                    y_measured: t + 0.01,
                    reference: 1.0,
                    u: 2.0 * (1.0 - t),
                    e: 1.0 - t,
                }
            })
            .collect()
    }

    #[test]
    fn summary_reports_range_and_step() {
        let summary = get_run_summary(&samples()).unwrap();
        assert_eq!(summary.time_range, (0.0, 1.0));
        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.dt, Some(0.5));
        assert!(get_run_summary(&[]).is_err());
    }

    #[test]
    fn frame_out_of_range_is_invalid_input() {
        let s = samples();
        let frame = frame_at(&s, 2).unwrap();
        assert_eq!(frame.t, 1.0);
        assert_eq!(frame.y_true, 1.0);
        assert!(matches!(frame_at(&s, 3), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn extracts_named_series() {
        let s = samples();
        let u = extract_series(&s, "u".parse().unwrap());
        assert_eq!(u, vec![(0.0, 2.0), (0.5, 1.0), (1.0, 0.0)]);
        assert!("torque".parse::<Signal>().is_err());
    }
}
