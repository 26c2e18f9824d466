//! Closed-loop simulation engine for pidsim.
//!
//! Provides:
//! - Fixed-step RK4 (and forward Euler) integration with zero-order-hold input
//! - Plant models: first-order lag, mass-spring-damper, armature-controlled DC motor
//! - Reference waveforms (step, sine, square)
//! - Injectable measurement noise sources
//! - The simulation driver that ties plant, controller and integrator together

pub mod error;
pub mod integrator;
pub mod model;
pub mod noise;
pub mod plant;
pub mod reference;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, IntegratorKind, Rk4};
pub use model::{Dynamics, PlantModel, StateVector};
pub use noise::{GaussianNoise, NoNoise, NoiseSource};
pub use plant::{DcMotor, FirstOrderLag, MassSpringDamper, Plant, PlantKind, PlantParams};
pub use reference::{Reference, Waveform};
pub use sim::{MAX_STEPS, SimOptions, SimProgress, run_closed_loop, run_closed_loop_with_progress};
