//! Closed-loop simulation driver.

use std::ops::ControlFlow;

use ps_controls::{PidController, PidState};
use ps_core::{Tolerances, ensure_finite, ensure_positive, nearly_equal};
use ps_results::Sample;

use crate::error::{SimError, SimResult};
use crate::integrator::IntegratorKind;
use crate::model::PlantModel;
use crate::noise::NoiseSource;
use crate::reference::Reference;

/// Upper bound on `t_end / dt` accepted for a single run.
pub const MAX_STEPS: f64 = 10_000_000.0;

/// Simulation options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Horizon (seconds)
    pub t_end: f64,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorKind,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.01,
            t_end: 10.0,
            integrator: IntegratorKind::default(),
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.dt, "dt must be positive")?;
        ensure_positive(self.t_end, "t_end must be positive")?;
        // Also bounds the usize cast in `steps`
        if self.t_end / self.dt > MAX_STEPS {
            return Err(SimError::InvalidArg {
                what: "t_end / dt exceeds the step limit",
            });
        }
        Ok(())
    }

    /// Number of integration steps after the initial sample.
    pub fn steps(&self) -> usize {
        (self.t_end / self.dt).floor() as usize
    }
}

/// Progress snapshot handed to the observer after each recorded sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    pub step: usize,
    pub steps: usize,
    pub t: f64,
    pub t_end: f64,
}

impl SimProgress {
    pub fn fraction(&self) -> f64 {
        if self.steps == 0 {
            1.0
        } else {
            self.step as f64 / self.steps as f64
        }
    }
}

/// Run the closed loop over the full horizon.
///
/// Returns `floor(t_end / dt) + 1` samples, the first at `t = 0`.
pub fn run_closed_loop<P: PlantModel + ?Sized>(
    plant: &P,
    controller: &PidController,
    reference: &Reference,
    noise_std: f64,
    noise: &mut dyn NoiseSource,
    opts: &SimOptions,
) -> SimResult<Vec<Sample>> {
    run_closed_loop_with_progress(
        plant,
        controller,
        reference,
        noise_std,
        noise,
        opts,
        &mut |_| ControlFlow::Continue(()),
    )
}

/// Run the closed loop, reporting progress after every sample.
///
/// Returning `ControlFlow::Break` from the observer abandons the run with
/// [`SimError::Cancelled`]; no partial output is returned.
pub fn run_closed_loop_with_progress<P: PlantModel + ?Sized>(
    plant: &P,
    controller: &PidController,
    reference: &Reference,
    noise_std: f64,
    noise: &mut dyn NoiseSource,
    opts: &SimOptions,
    observer: &mut dyn FnMut(&SimProgress) -> ControlFlow<()>,
) -> SimResult<Vec<Sample>> {
    opts.validate()?;
    let noise_std = ensure_finite(noise_std, "noise_std must be finite")?;
    if noise_std < 0.0 {
        return Err(SimError::InvalidArg {
            what: "noise_std must be non-negative",
        });
    }
    if !nearly_equal(controller.dt(), opts.dt, Tolerances::default()) {
        return Err(SimError::InvalidArg {
            what: "controller dt must match simulation dt",
        });
    }

    let steps = opts.steps();
    tracing::debug!(
        steps,
        dt = opts.dt,
        integrator = ?opts.integrator,
        "starting closed-loop run"
    );

    let mut x = plant.initial_state();
    let mut state = PidState::default();
    let mut samples = Vec::with_capacity(steps + 1);

    for k in 0..=steps {
        let t = k as f64 * opts.dt;

        let y_true = plant.output(&x);
        let y_measured = if noise_std > 0.0 {
            y_true + noise_std * noise.next_standard_normal()
        } else {
            y_true
        };
        let r = reference.value_at(t);

        let (next, out) = controller.update(&state, r, y_measured);
        state = next;
        x = opts.integrator.step(plant, &x, out.u, opts.dt);

        samples.push(Sample {
            t,
            y_true,
            y_measured,
            reference: r,
            u: out.u,
            e: out.e,
        });

        let progress = SimProgress {
            step: k,
            steps,
            t,
            t_end: opts.t_end,
        };
        if observer(&progress).is_break() {
            tracing::warn!(step = k, "closed-loop run cancelled");
            return Err(SimError::Cancelled { step: k });
        }
    }

    tracing::debug!(samples = samples.len(), "closed-loop run finished");
    Ok(samples)
}
