//! Result data types.

use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

/// One time-series record, taken once per integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulation time (seconds)
    pub t: f64,
    /// Plant output before measurement noise
    pub y_true: f64,
    /// Plant output as seen by the controller
    pub y_measured: f64,
    /// Reference signal
    pub reference: f64,
    /// Saturated actuator command
    pub u: f64,
    /// Control error
    pub e: f64,
}

/// Instantaneous view of a sample for animation consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub t: f64,
    pub y_true: f64,
    pub reference: f64,
}

impl From<&Sample> for Frame {
    fn from(sample: &Sample) -> Self {
        Self {
            t: sample.t,
            y_true: sample.y_true,
            reference: sample.reference,
        }
    }
}

/// Frame at `index`, or [`ResultsError::FrameOutOfRange`].
pub fn frame_at(samples: &[Sample], index: usize) -> ResultsResult<Frame> {
    samples
        .get(index)
        .map(Frame::from)
        .ok_or(ResultsError::FrameOutOfRange {
            index,
            len: samples.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_from_sample_keeps_time_output_reference() {
        let sample = Sample {
            t: 0.25,
            y_true: 0.4,
            y_measured: 0.41,
            reference: 1.0,
            u: 1.2,
            e: 0.59,
        };
        let frame = Frame::from(&sample);
        assert_eq!(frame.t, 0.25);
        assert_eq!(frame.y_true, 0.4);
        assert_eq!(frame.reference, 1.0);
    }

    #[test]
    fn frame_at_checks_bounds() {
        let samples = [Sample {
            t: 0.0,
            y_true: 0.0,
            y_measured: 0.0,
            reference: 1.0,
            u: 1.0,
            e: 1.0,
        }];
        assert_eq!(frame_at(&samples, 0).unwrap().reference, 1.0);
        let err = frame_at(&samples, 1).unwrap_err();
        assert!(matches!(err, ResultsError::FrameOutOfRange { index: 1, len: 1 }));
        assert!(frame_at(&[], 0).is_err());
    }
}
