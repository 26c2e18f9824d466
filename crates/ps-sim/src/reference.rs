//! Reference (setpoint) waveforms.

use std::f64::consts::PI;

use ps_core::sign;
use serde::{Deserialize, Serialize};

/// Shape of the reference signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Waveform {
    /// Constant at the amplitude from t = 0
    Step,
    Sine { frequency_hz: f64 },
    /// `sign(sin(2*pi*f*t))`, so zero at the zero crossings
    Square { frequency_hz: f64 },
}

/// Reference generator: an amplitude and a waveform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reference {
    pub amplitude: f64,
    pub waveform: Waveform,
}

impl Reference {
    pub fn step(amplitude: f64) -> Self {
        Self {
            amplitude,
            waveform: Waveform::Step,
        }
    }

    pub fn sine(amplitude: f64, frequency_hz: f64) -> Self {
        Self {
            amplitude,
            waveform: Waveform::Sine { frequency_hz },
        }
    }

    pub fn square(amplitude: f64, frequency_hz: f64) -> Self {
        Self {
            amplitude,
            waveform: Waveform::Square { frequency_hz },
        }
    }

    /// Reference value at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        match self.waveform {
            Waveform::Step => self.amplitude,
            Waveform::Sine { frequency_hz } => self.amplitude * (2.0 * PI * frequency_hz * t).sin(),
            Waveform::Square { frequency_hz } => {
                self.amplitude * sign((2.0 * PI * frequency_hz * t).sin())
            }
        }
    }

    pub fn is_step(&self) -> bool {
        matches!(self.waveform, Waveform::Step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_constant() {
        let r = Reference::step(2.5);
        assert_eq!(r.value_at(0.0), 2.5);
        assert_eq!(r.value_at(123.4), 2.5);
        assert!(r.is_step());
    }

    #[test]
    fn sine_quarter_period() {
        let r = Reference::sine(2.0, 0.5);
        assert_eq!(r.value_at(0.0), 0.0);
        // quarter period of a 0.5 Hz wave is 0.5 s
        assert!((r.value_at(0.5) - 2.0).abs() < 1e-12);
        assert!((r.value_at(1.5) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn square_is_zero_at_origin() {
        let r = Reference::square(3.0, 1.0);
        assert_eq!(r.value_at(0.0), 0.0);
        assert_eq!(r.value_at(0.25), 3.0);
        assert_eq!(r.value_at(0.75), -3.0);
    }
}
