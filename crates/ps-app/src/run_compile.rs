//! Run compilation: turns a validated configuration into runnable parts.
//!
//! This module handles:
//! - Resolving the plant tag and parameter map into a [`Plant`]
//! - Building the PID controller with its actuator bounds
//! - Mapping the reference waveform and simulation options

use ps_controls::{PidController, PidGains, PidLimits};
use ps_project::schema::{ReferenceDef, RunConfig};
use ps_project::validate_config;
use ps_sim::{Plant, Reference, SimOptions};

use crate::error::AppResult;

/// Everything the driver needs for one run.
#[derive(Debug, Clone)]
pub struct CompiledRun {
    pub plant: Plant,
    pub controller: PidController,
    pub reference: Reference,
    pub noise_std: f64,
    pub seed: Option<u64>,
    pub options: SimOptions,
}

impl CompiledRun {
    /// Target for step-response metrics: the amplitude for a step reference, `1.0` otherwise.
    pub fn metric_target(&self) -> f64 {
        if self.reference.is_step() {
            self.reference.amplitude
        } else {
            1.0
        }
    }
}

pub fn compile_run(config: &RunConfig) -> AppResult<CompiledRun> {
    validate_config(config)?;

    let plant = Plant::from_params(&config.plant.kind, &config.plant.params)?;

    let c = &config.controller;
    let limits = PidLimits::new(c.u_min_or_unbounded(), c.u_max_or_unbounded())?;
    let dt = config.experiment.dt;
    let controller = PidController::new(
        PidGains::new(c.kp, c.ki, c.kd, c.n),
        limits,
        c.anti_windup,
        dt,
    )?;

    let amplitude = config.experiment.setpoint;
    let reference = match config.experiment.reference {
        ReferenceDef::Step => Reference::step(amplitude),
        ReferenceDef::Sine { frequency_hz } => Reference::sine(amplitude, frequency_hz),
        ReferenceDef::Square { frequency_hz } => Reference::square(amplitude, frequency_hz),
    };

    let options = SimOptions {
        dt,
        t_end: config.experiment.t_end,
        integrator: config.experiment.integrator.unwrap_or_default(),
    };
    options.validate()?;

    tracing::debug!(
        plant = %plant.kind(),
        steps = options.steps(),
        integrator = ?options.integrator,
        "compiled run"
    );

    Ok(CompiledRun {
        plant,
        controller,
        reference,
        noise_std: config.experiment.noise_std,
        seed: config.experiment.seed,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;
    use ps_sim::{MassSpringDamper, PlantKind, Waveform};

    #[test]
    fn compiles_default_config() {
        let run = compile_run(&RunConfig::default()).unwrap();
        assert_eq!(run.plant, Plant::MassSpringDamper(MassSpringDamper::default()));
        assert_eq!(run.controller.limits().u_min, -5.0);
        assert_eq!(run.controller.limits().u_max, 5.0);
        assert_eq!(run.options.steps(), 1000);
        assert_eq!(run.metric_target(), 1.0);
        assert!(run.seed.is_none());
    }

    #[test]
    fn omitted_bounds_are_unbounded() {
        let mut config = RunConfig::default();
        config.controller.u_min = None;
        config.controller.u_max = None;
        let run = compile_run(&config).unwrap();
        assert_eq!(run.controller.limits().u_min, f64::NEG_INFINITY);
        assert_eq!(run.controller.limits().u_max, f64::INFINITY);
    }

    #[test]
    fn non_step_reference_targets_unity() {
        let mut config = RunConfig::with_plant(PlantKind::FirstOrder);
        config.experiment.setpoint = 3.0;
        config.experiment.reference = ReferenceDef::Sine { frequency_hz: 0.2 };
        let run = compile_run(&config).unwrap();
        assert_eq!(run.reference.waveform, Waveform::Sine { frequency_hz: 0.2 });
        assert_eq!(run.metric_target(), 1.0);

        config.experiment.reference = ReferenceDef::Step;
        assert_eq!(compile_run(&config).unwrap().metric_target(), 3.0);
    }

    #[test]
    fn unknown_plant_is_configuration_error() {
        let mut config = RunConfig::default();
        config.plant.kind = "boiler".to_string();
        let err = compile_run(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)), "{err:?}");
    }

    #[test]
    fn inverted_limits_are_configuration_error() {
        let mut config = RunConfig::default();
        config.controller.u_min = Some(1.0);
        config.controller.u_max = Some(-1.0);
        assert!(matches!(
            compile_run(&config),
            Err(AppError::Configuration(_))
        ));
    }
}
