//! Fixed-step explicit time integrators.
//!
//! The input `u` is held constant across all stages of a step (zero-order hold).
//! Integrators never inspect the values they produce: NaN and infinity propagate.

use serde::{Deserialize, Serialize};

use crate::model::{Dynamics, StateVector};

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step.
    fn step<D: Dynamics + ?Sized>(
        &self,
        dynamics: &D,
        x: &StateVector,
        u: f64,
        dt: f64,
    ) -> StateVector;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rk4;

impl Integrator for Rk4 {
    fn step<D: Dynamics + ?Sized>(
        &self,
        dynamics: &D,
        x: &StateVector,
        u: f64,
        dt: f64,
    ) -> StateVector {
        let k1 = dynamics.derivative(x, u);

        let x2 = x + &k1 * (0.5 * dt);
        let k2 = dynamics.derivative(&x2, u);

        let x3 = x + &k2 * (0.5 * dt);
        let k3 = dynamics.derivative(&x3, u);

        let x4 = x + &k3 * dt;
        let k4 = dynamics.derivative(&x4, u);

        // Combine: x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = k1 + k2 * 2.0 + k3 * 2.0 + k4;
        x + k_sum * (dt / 6.0)
    }
}

/// Forward Euler (explicit, 1st order).
/// Calls `derivative()` once per step instead of 4 times (RK4).
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<D: Dynamics + ?Sized>(
        &self,
        dynamics: &D,
        x: &StateVector,
        u: f64,
        dt: f64,
    ) -> StateVector {
        let xdot = dynamics.derivative(x, u);
        x + xdot * dt
    }
}

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// 4th-order Runge-Kutta (default, 4 derivative calls per step).
    #[default]
    Rk4,
    /// Forward Euler (1st-order, 1 derivative call per step).
    ForwardEuler,
}

impl IntegratorKind {
    /// Advance one step with the selected method.
    pub fn step<D: Dynamics + ?Sized>(
        self,
        dynamics: &D,
        x: &StateVector,
        u: f64,
        dt: f64,
    ) -> StateVector {
        match self {
            IntegratorKind::Rk4 => Rk4.step(dynamics, x, u, dt),
            IntegratorKind::ForwardEuler => ForwardEuler.step(dynamics, x, u, dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x_dot = -x + u
    struct Decay;

    impl Dynamics for Decay {
        fn derivative(&self, x: &StateVector, u: f64) -> StateVector {
            x.map(|v| -v + u)
        }
    }

    /// Harmonic oscillator: [x, v]' = [v, -x]
    struct Oscillator;

    impl Dynamics for Oscillator {
        fn derivative(&self, x: &StateVector, _u: f64) -> StateVector {
            StateVector::from_vec(vec![x[1], -x[0]])
        }
    }

    fn integrate<I: Integrator, D: Dynamics>(
        integrator: &I,
        dynamics: &D,
        x0: StateVector,
        dt: f64,
        t_end: f64,
    ) -> StateVector {
        let steps = (t_end / dt).round() as usize;
        let mut x = x0;
        for _ in 0..steps {
            x = integrator.step(dynamics, &x, 0.0, dt);
        }
        x
    }

    fn decay_error<I: Integrator>(integrator: &I, dt: f64) -> f64 {
        let x = integrate(integrator, &Decay, StateVector::from_element(1, 1.0), dt, 1.0);
        (x[0] - (-1.0_f64).exp()).abs()
    }

    #[test]
    fn rk4_single_step_matches_taylor_series() {
        let dt: f64 = 0.1;
        let x = Rk4.step(&Decay, &StateVector::from_element(1, 1.0), 0.0, dt);
        // RK4 reproduces exp(-dt) up to the dt^4 term
        let taylor = 1.0 - dt + dt.powi(2) / 2.0 - dt.powi(3) / 6.0 + dt.powi(4) / 24.0;
        assert!((x[0] - taylor).abs() < 1e-14);
    }

    #[test]
    fn rk4_is_fourth_order() {
        let coarse = decay_error(&Rk4, 0.1);
        let fine = decay_error(&Rk4, 0.05);
        let ratio = coarse / fine;
        assert!(ratio > 14.0 && ratio < 18.0, "error ratio {ratio}");
    }

    #[test]
    fn forward_euler_is_first_order() {
        let coarse = decay_error(&ForwardEuler, 0.01);
        let fine = decay_error(&ForwardEuler, 0.005);
        let ratio = coarse / fine;
        assert!(ratio > 1.8 && ratio < 2.2, "error ratio {ratio}");
    }

    #[test]
    fn input_is_held_across_stages() {
        // With x = 0 and u = 1 the exact answer is 1 - exp(-dt)
        let dt: f64 = 0.01;
        let x = Rk4.step(&Decay, &StateVector::zeros(1), 1.0, dt);
        assert!((x[0] - (1.0 - (-dt).exp())).abs() < 1e-12);
    }

    #[test]
    fn rk4_oscillator_conserves_energy_closely() {
        let x0 = StateVector::from_vec(vec![1.0, 0.0]);
        let period = 2.0 * std::f64::consts::PI;
        let x = integrate(&Rk4, &Oscillator, x0, period / 600.0, period);
        assert!((x[0] - 1.0).abs() < 1e-8);
        assert!(x[1].abs() < 1e-8);
    }

    #[test]
    fn non_finite_state_propagates() {
        let x = Rk4.step(&Decay, &StateVector::from_element(1, f64::NAN), 0.0, 0.01);
        assert!(x[0].is_nan());
        let x = ForwardEuler.step(&Decay, &StateVector::from_element(1, f64::INFINITY), 0.0, 0.01);
        assert!(!x[0].is_finite());
    }

    #[test]
    fn integrator_kind_dispatches() {
        let x0 = StateVector::from_element(1, 1.0);
        let a = IntegratorKind::Rk4.step(&Decay, &x0, 0.0, 0.1);
        let b = Rk4.step(&Decay, &x0, 0.0, 0.1);
        assert_eq!(a, b);
        let c = IntegratorKind::ForwardEuler.step(&Decay, &x0, 0.0, 0.1);
        assert!((c[0] - 0.9).abs() < 1e-15);
        assert_eq!(IntegratorKind::default(), IntegratorKind::Rk4);
    }
}
