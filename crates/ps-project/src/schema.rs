//! Run configuration schema.

use std::collections::BTreeMap;

use ps_sim::{IntegratorKind, PlantKind};
use serde::{Deserialize, Serialize};

use crate::LATEST_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plant: PlantDef,
    #[serde(default)]
    pub controller: ControllerDef,
    #[serde(default)]
    pub experiment: ExperimentDef,
}

fn default_version() -> u32 {
    LATEST_VERSION
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            version: LATEST_VERSION,
            name: "Mass-spring-damper step".to_string(),
            plant: PlantDef::default(),
            controller: ControllerDef::default(),
            experiment: ExperimentDef::default(),
        }
    }
}

impl RunConfig {
    /// Default experiment on the given plant with its default parameters.
    pub fn with_plant(kind: PlantKind) -> Self {
        Self {
            name: format!("{} step", kind.label()),
            plant: PlantDef::with_defaults(kind),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantDef {
    /// Plant identifier, e.g. `mass_spring_damper`
    pub kind: String,
    /// Parameter overrides; missing keys take the plant defaults
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl PlantDef {
    pub fn with_defaults(kind: PlantKind) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            params: kind.default_params(),
        }
    }
}

impl Default for PlantDef {
    fn default() -> Self {
        Self::with_defaults(PlantKind::MassSpringDamper)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerDef {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Derivative filter bandwidth
    pub n: f64,
    /// Lower actuator bound; omitted means unbounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_min: Option<f64>,
    /// Upper actuator bound; omitted means unbounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_max: Option<f64>,
    pub anti_windup: bool,
}

impl Default for ControllerDef {
    fn default() -> Self {
        Self {
            kp: 2.0,
            ki: 0.5,
            kd: 0.2,
            n: 50.0,
            u_min: Some(-5.0),
            u_max: Some(5.0),
            anti_windup: true,
        }
    }
}

impl ControllerDef {
    pub fn u_min_or_unbounded(&self) -> f64 {
        self.u_min.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn u_max_or_unbounded(&self) -> f64 {
        self.u_max.unwrap_or(f64::INFINITY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperimentDef {
    /// Time step (seconds)
    pub dt: f64,
    /// Horizon (seconds)
    pub t_end: f64,
    /// Reference amplitude
    pub setpoint: f64,
    pub reference: ReferenceDef,
    /// Measurement noise standard deviation
    pub noise_std: f64,
    /// Noise seed; omitted means OS entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrator: Option<IntegratorKind>,
}

impl Default for ExperimentDef {
    fn default() -> Self {
        Self {
            dt: 0.01,
            t_end: 10.0,
            setpoint: 1.0,
            reference: ReferenceDef::default(),
            noise_std: 0.0,
            seed: None,
            integrator: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReferenceDef {
    #[default]
    Step,
    Sine {
        #[serde(default = "default_frequency")]
        frequency_hz: f64,
    },
    Square {
        #[serde(default = "default_frequency")]
        frequency_hz: f64,
    },
}

fn default_frequency() -> f64 {
    0.5
}
