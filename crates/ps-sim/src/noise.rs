//! Measurement noise sources.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of standard-normal deviates, N(0, 1).
pub trait NoiseSource {
    fn next_standard_normal(&mut self) -> f64;
}

/// Gaussian white noise via the Box-Muller transform over a `StdRng`.
///
/// Seeded instances produce the same sequence on every run.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    rng: StdRng,
}

impl GaussianNoise {
    /// Create a source with an optional seed; `None` draws from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Uniform draw on (0, 1), redrawing zeros so `ln` stays finite.
    fn open_unit(&mut self) -> f64 {
        loop {
            let v: f64 = self.rng.random();
            if v > 0.0 {
                return v;
            }
        }
    }
}

impl NoiseSource for GaussianNoise {
    fn next_standard_normal(&mut self) -> f64 {
        let u = self.open_unit();
        let v = self.open_unit();
        (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
    }
}

/// Exact measurement: always zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn next_standard_normal(&mut self) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sequences_repeat() {
        let mut a = GaussianNoise::seeded(42);
        let mut b = GaussianNoise::new(Some(42));
        for _ in 0..50 {
            assert_eq!(a.next_standard_normal(), b.next_standard_normal());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = GaussianNoise::seeded(1);
        let mut b = GaussianNoise::seeded(2);
        let same = (0..20).all(|_| a.next_standard_normal() == b.next_standard_normal());
        assert!(!same);
    }

    #[test]
    fn standard_normal_statistics() {
        let mut noise = GaussianNoise::seeded(12345);
        let n = 20_000;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for _ in 0..n {
            let x = noise.next_standard_normal();
            assert!(x.is_finite());
            sum += x;
            sum_sq += x * x;
        }
        let mean = sum / n as f64;
        let variance = sum_sq / n as f64 - mean * mean;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((variance - 1.0).abs() < 0.1, "variance {variance}");
    }

    #[test]
    fn no_noise_is_zero() {
        let mut n = NoNoise;
        assert_eq!(n.next_standard_normal(), 0.0);
    }
}
