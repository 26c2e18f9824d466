//! Run configuration validation.

use ps_sim::{PlantKind, SimOptions};

use crate::LATEST_VERSION;
use crate::schema::{ControllerDef, ExperimentDef, PlantDef, ReferenceDef, RunConfig};

pub use ps_sim::MAX_STEPS;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    validate_plant(&config.plant)?;
    validate_controller(&config.controller)?;
    validate_experiment(&config.experiment)?;
    Ok(())
}

fn validate_plant(plant: &PlantDef) -> Result<(), ValidationError> {
    if plant.kind.parse::<PlantKind>().is_err() {
        return Err(ValidationError::Unsupported {
            feature: format!("plant kind '{}'", plant.kind),
            reason: "expected first_order, mass_spring_damper or dc_motor".to_string(),
        });
    }

    for (key, value) in &plant.params {
        validate_finite(&format!("plant.params.{key}"), *value)?;
    }
    Ok(())
}

fn validate_controller(controller: &ControllerDef) -> Result<(), ValidationError> {
    validate_finite("controller.kp", controller.kp)?;
    validate_finite("controller.ki", controller.ki)?;
    validate_finite("controller.kd", controller.kd)?;
    validate_positive_finite("controller.n", controller.n)?;

    for (field, bound) in [
        ("controller.u_min", controller.u_min),
        ("controller.u_max", controller.u_max),
    ] {
        if let Some(v) = bound.filter(|v| v.is_nan()) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: v.to_string(),
                reason: "must not be NaN".to_string(),
            });
        }
    }

    let (u_min, u_max) = (
        controller.u_min_or_unbounded(),
        controller.u_max_or_unbounded(),
    );
    if u_min > u_max {
        return Err(ValidationError::InvalidValue {
            field: "controller.u_min".to_string(),
            value: u_min.to_string(),
            reason: format!("must not exceed u_max ({u_max})"),
        });
    }
    Ok(())
}

fn validate_experiment(experiment: &ExperimentDef) -> Result<(), ValidationError> {
    validate_positive_finite("experiment.dt", experiment.dt)?;
    validate_positive_finite("experiment.t_end", experiment.t_end)?;
    validate_finite("experiment.setpoint", experiment.setpoint)?;
    validate_non_negative_finite("experiment.noise_std", experiment.noise_std)?;

    match experiment.reference {
        ReferenceDef::Step => {}
        ReferenceDef::Sine { frequency_hz } | ReferenceDef::Square { frequency_hz } => {
            validate_non_negative_finite("experiment.reference.frequency_hz", frequency_hz)?;
        }
    }

    let options = SimOptions {
        dt: experiment.dt,
        t_end: experiment.t_end,
        integrator: experiment.integrator.unwrap_or_default(),
    };
    if options.validate().is_err() {
        let steps = experiment.t_end / experiment.dt;
        return Err(ValidationError::InvalidValue {
            field: "experiment.t_end".to_string(),
            value: experiment.t_end.to_string(),
            reason: format!("horizon needs {steps:.0} steps, limit is {MAX_STEPS:.0}"),
        });
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}

fn validate_positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn validate_non_negative_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ValidationError) -> String {
        match err {
            ValidationError::InvalidValue { field, .. } => field,
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        validate_config(&RunConfig::default()).unwrap();
        for kind in PlantKind::ALL {
            validate_config(&RunConfig::with_plant(kind)).unwrap();
        }
    }

    #[test]
    fn rejects_non_positive_time_axis() {
        let mut config = RunConfig::default();
        config.experiment.dt = 0.0;
        assert_eq!(field_of(validate_config(&config).unwrap_err()), "experiment.dt");

        let mut config = RunConfig::default();
        config.experiment.t_end = -1.0;
        assert_eq!(field_of(validate_config(&config).unwrap_err()), "experiment.t_end");
    }

    #[test]
    fn rejects_inverted_limits() {
        let mut config = RunConfig::default();
        config.controller.u_min = Some(2.0);
        config.controller.u_max = Some(1.0);
        assert_eq!(field_of(validate_config(&config).unwrap_err()), "controller.u_min");
    }

    #[test]
    fn one_sided_limits_are_fine() {
        let mut config = RunConfig::default();
        config.controller.u_min = None;
        config.controller.u_max = Some(-100.0);
        validate_config(&config).unwrap();
    }

    #[test]
    fn rejects_unknown_plant() {
        let mut config = RunConfig::default();
        config.plant.kind = "pendulum".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::Unsupported { .. })
        ));
    }

    #[test]
    fn accepts_plant_aliases() {
        let mut config = RunConfig::default();
        config.plant.kind = "dcMotor".to_string();
        config.plant.params.clear();
        validate_config(&config).unwrap();
    }

    #[test]
    fn rejects_negative_noise_and_bad_filter() {
        let mut config = RunConfig::default();
        config.experiment.noise_std = -0.1;
        assert_eq!(
            field_of(validate_config(&config).unwrap_err()),
            "experiment.noise_std"
        );

        let mut config = RunConfig::default();
        config.controller.n = 0.0;
        assert_eq!(field_of(validate_config(&config).unwrap_err()), "controller.n");
    }

    #[test]
    fn rejects_non_finite_params() {
        let mut config = RunConfig::default();
        config.plant.params.insert("k".to_string(), f64::NAN);
        assert_eq!(
            field_of(validate_config(&config).unwrap_err()),
            "plant.params.k"
        );
    }

    #[test]
    fn rejects_future_version() {
        let config = RunConfig {
            version: LATEST_VERSION + 1,
            ..RunConfig::default()
        };
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::UnsupportedVersion {
                version: LATEST_VERSION + 1
            })
        );
    }

    #[test]
    fn rejects_runaway_step_count() {
        let mut config = RunConfig::default();
        config.experiment.dt = 1e-6;
        config.experiment.t_end = 1e3;
        assert_eq!(
            field_of(validate_config(&config).unwrap_err()),
            "experiment.t_end"
        );
    }
}
