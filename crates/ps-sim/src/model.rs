//! Traits for pluggable dynamic systems.

use nalgebra::DVector;

/// Plant state. Length is fixed by the plant for the whole run.
pub type StateVector = DVector<f64>;

/// A continuous-time system `x_dot = f(x, u)` with a scalar input.
pub trait Dynamics {
    /// Compute the state derivative. The result has the same length as `x`.
    fn derivative(&self, x: &StateVector, u: f64) -> StateVector;
}

/// A plant the controller can act on.
///
/// A PlantModel must provide:
/// - State dimension (constant)
/// - Initial state (all zeros by default)
/// - Dynamics (via the [`Dynamics`] supertrait)
/// - Scalar output extraction
pub trait PlantModel: Dynamics {
    /// Number of state variables.
    fn state_dim(&self) -> usize;

    /// Return the initial state at t=0.
    fn initial_state(&self) -> StateVector {
        StateVector::zeros(self.state_dim())
    }

    /// Observable output for the given state.
    fn output(&self, x: &StateVector) -> f64;
}
