//! Plant models: first-order lag, mass-spring-damper and DC motor.
//!
//! Capacity-like parameters (time constant, mass, inertia, resistance,
//! inductance) are floored at [`ps_core::MIN_POSITIVE_PARAM`] on construction.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ps_core::floor_positive;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::model::{Dynamics, PlantModel, StateVector};

/// Raw parameter mapping as it arrives from a configuration.
pub type PlantParams = BTreeMap<String, f64>;

/// Plant variant identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    FirstOrder,
    MassSpringDamper,
    DcMotor,
}

impl PlantKind {
    pub const ALL: [PlantKind; 3] = [
        PlantKind::FirstOrder,
        PlantKind::MassSpringDamper,
        PlantKind::DcMotor,
    ];

    /// Canonical identifier used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            PlantKind::FirstOrder => "first_order",
            PlantKind::MassSpringDamper => "mass_spring_damper",
            PlantKind::DcMotor => "dc_motor",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PlantKind::FirstOrder => "First-order lag",
            PlantKind::MassSpringDamper => "Mass-spring-damper",
            PlantKind::DcMotor => "DC motor",
        }
    }

    /// Parameter keys understood by this kind.
    pub fn param_keys(self) -> &'static [&'static str] {
        match self {
            PlantKind::FirstOrder => &["tau"],
            PlantKind::MassSpringDamper => &["m", "c", "k"],
            PlantKind::DcMotor => &["J", "b", "Kt", "Ke", "R", "L", "TL"],
        }
    }

    /// Default parameters for this kind, keyed as in configuration files.
    pub fn default_params(self) -> PlantParams {
        let pairs: Vec<(&str, f64)> = match self {
            PlantKind::FirstOrder => {
                let p = FirstOrderLag::default();
                vec![("tau", p.tau)]
            }
            PlantKind::MassSpringDamper => {
                let p = MassSpringDamper::default();
                vec![("m", p.m), ("c", p.c), ("k", p.k)]
            }
            PlantKind::DcMotor => {
                let p = DcMotor::default();
                vec![
                    ("J", p.j),
                    ("b", p.b),
                    ("Kt", p.kt),
                    ("Ke", p.ke),
                    ("R", p.r),
                    ("L", p.l),
                    ("TL", p.tl),
                ]
            }
        };
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

impl fmt::Display for PlantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlantKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first_order" | "first" | "first-order" => Ok(PlantKind::FirstOrder),
            "mass_spring_damper" | "second" | "msd" => Ok(PlantKind::MassSpringDamper),
            "dc_motor" | "dcMotor" | "dc-motor" => Ok(PlantKind::DcMotor),
            other => Err(SimError::UnknownPlant {
                kind: other.to_string(),
            }),
        }
    }
}

fn param_or(params: &PlantParams, key: &str, default: f64) -> f64 {
    params.get(key).copied().unwrap_or(default)
}

/// First-order lag: `x' = (u - x) / tau`, output `x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FirstOrderLag {
    /// Time constant [s]
    pub tau: f64,
}

impl FirstOrderLag {
    pub fn new(tau: f64) -> Self {
        Self {
            tau: floor_positive(tau),
        }
    }

    pub fn from_params(params: &PlantParams) -> Self {
        let d = Self::default();
        Self::new(param_or(params, "tau", d.tau))
    }
}

impl Default for FirstOrderLag {
    fn default() -> Self {
        Self { tau: 1.0 }
    }
}

impl Dynamics for FirstOrderLag {
    fn derivative(&self, x: &StateVector, u: f64) -> StateVector {
        StateVector::from_element(1, (-x[0] + u) / self.tau)
    }
}

impl PlantModel for FirstOrderLag {
    fn state_dim(&self) -> usize {
        1
    }

    fn output(&self, x: &StateVector) -> f64 {
        x[0]
    }
}

/// Mass-spring-damper with force input. State `[position, velocity]`, output position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassSpringDamper {
    /// Mass [kg]
    pub m: f64,
    /// Damping [N·s/m]
    pub c: f64,
    /// Stiffness [N/m]
    pub k: f64,
}

impl MassSpringDamper {
    pub fn new(m: f64, c: f64, k: f64) -> Self {
        Self {
            m: floor_positive(m),
            c,
            k,
        }
    }

    pub fn from_params(params: &PlantParams) -> Self {
        let d = Self::default();
        Self::new(
            param_or(params, "m", d.m),
            param_or(params, "c", d.c),
            param_or(params, "k", d.k),
        )
    }
}

impl Default for MassSpringDamper {
    fn default() -> Self {
        Self {
            m: 1.0,
            c: 0.8,
            k: 1.0,
        }
    }
}

impl Dynamics for MassSpringDamper {
    fn derivative(&self, x: &StateVector, u: f64) -> StateVector {
        let (p, v) = (x[0], x[1]);
        let a = (u - self.c * v - self.k * p) / self.m;
        StateVector::from_vec(vec![v, a])
    }
}

impl PlantModel for MassSpringDamper {
    fn state_dim(&self) -> usize {
        2
    }

    fn output(&self, x: &StateVector) -> f64 {
        x[0]
    }
}

/// Armature-controlled DC motor with voltage input.
///
/// State `[angle, angular velocity, armature current]`, output angular velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DcMotor {
    /// Rotor inertia [kg·m²]
    pub j: f64,
    /// Viscous friction [N·m·s]
    pub b: f64,
    /// Torque constant [N·m/A]
    pub kt: f64,
    /// Back-EMF constant [V·s]
    pub ke: f64,
    /// Armature resistance [Ω]
    pub r: f64,
    /// Armature inductance [H]
    pub l: f64,
    /// Load torque [N·m]
    pub tl: f64,
}

impl DcMotor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(j: f64, b: f64, kt: f64, ke: f64, r: f64, l: f64, tl: f64) -> Self {
        Self {
            j: floor_positive(j),
            b,
            kt,
            ke,
            r: floor_positive(r),
            l: floor_positive(l),
            tl,
        }
    }

    pub fn from_params(params: &PlantParams) -> Self {
        let d = Self::default();
        Self::new(
            param_or(params, "J", d.j),
            param_or(params, "b", d.b),
            param_or(params, "Kt", d.kt),
            param_or(params, "Ke", d.ke),
            param_or(params, "R", d.r),
            param_or(params, "L", d.l),
            param_or(params, "TL", d.tl),
        )
    }
}

impl Default for DcMotor {
    fn default() -> Self {
        Self {
            j: 0.01,
            b: 0.1,
            kt: 0.02,
            ke: 0.02,
            r: 1.0,
            l: 0.5,
            tl: 0.0,
        }
    }
}

impl Dynamics for DcMotor {
    fn derivative(&self, x: &StateVector, u: f64) -> StateVector {
        let (omega, i) = (x[1], x[2]);
        let domega = (self.kt * i - self.b * omega - self.tl) / self.j;
        let di = (u - self.r * i - self.ke * omega) / self.l;
        StateVector::from_vec(vec![omega, domega, di])
    }
}

impl PlantModel for DcMotor {
    fn state_dim(&self) -> usize {
        3
    }

    fn output(&self, x: &StateVector) -> f64 {
        x[1]
    }
}

/// Closed set of plant variants, built from a kind tag and a parameter map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Plant {
    FirstOrderLag(FirstOrderLag),
    MassSpringDamper(MassSpringDamper),
    DcMotor(DcMotor),
}

impl Plant {
    /// Build a plant from a kind identifier and parameters.
    ///
    /// Missing parameters take their defaults. Unknown keys are ignored with a warning.
    pub fn from_params(kind: &str, params: &PlantParams) -> SimResult<Self> {
        let kind: PlantKind = kind.parse()?;
        Ok(Self::from_kind(kind, params))
    }

    pub fn from_kind(kind: PlantKind, params: &PlantParams) -> Self {
        let known = kind.param_keys();
        for key in params.keys() {
            if !known.contains(&key.as_str()) {
                tracing::warn!(plant = %kind, key = %key, "ignoring unknown plant parameter");
            }
        }

        match kind {
            PlantKind::FirstOrder => Plant::FirstOrderLag(FirstOrderLag::from_params(params)),
            PlantKind::MassSpringDamper => {
                Plant::MassSpringDamper(MassSpringDamper::from_params(params))
            }
            PlantKind::DcMotor => Plant::DcMotor(DcMotor::from_params(params)),
        }
    }

    pub fn kind(&self) -> PlantKind {
        match self {
            Plant::FirstOrderLag(_) => PlantKind::FirstOrder,
            Plant::MassSpringDamper(_) => PlantKind::MassSpringDamper,
            Plant::DcMotor(_) => PlantKind::DcMotor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> PlantParams {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn zero_state_zero_input_is_equilibrium() {
        let plants: [&dyn PlantModel; 3] = [
            &FirstOrderLag::default(),
            &MassSpringDamper::default(),
            &DcMotor::default(),
        ];
        for plant in plants {
            let x = plant.initial_state();
            assert_eq!(x.len(), plant.state_dim());
            let xdot = plant.derivative(&x, 0.0);
            assert!(xdot.iter().all(|v| *v == 0.0));
            assert_eq!(plant.output(&x), 0.0);
        }
    }

    #[test]
    fn first_order_derivative() {
        let p = FirstOrderLag::new(2.0);
        let xdot = p.derivative(&StateVector::from_element(1, 1.0), 3.0);
        assert!((xdot[0] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn mass_spring_damper_derivative() {
        let p = MassSpringDamper::new(2.0, 0.5, 4.0);
        let x = StateVector::from_vec(vec![1.0, 2.0]);
        let xdot = p.derivative(&x, 10.0);
        assert_eq!(xdot[0], 2.0);
        // (10 - 0.5*2 - 4*1) / 2
        assert!((xdot[1] - 2.5).abs() < 1e-15);
        assert_eq!(p.output(&x), 1.0);
    }

    #[test]
    fn dc_motor_derivative() {
        let p = DcMotor::default();
        let x = StateVector::from_vec(vec![0.3, 2.0, 1.5]);
        let xdot = p.derivative(&x, 12.0);
        assert_eq!(xdot[0], 2.0);
        // (0.02*1.5 - 0.1*2 - 0) / 0.01
        assert!((xdot[1] - (-17.0)).abs() < 1e-12);
        // (12 - 1*1.5 - 0.02*2) / 0.5
        assert!((xdot[2] - 20.92).abs() < 1e-12);
        assert_eq!(p.output(&x), 2.0);
    }

    #[test]
    fn load_torque_decelerates_motor_at_rest() {
        let p = DcMotor::new(0.01, 0.1, 0.02, 0.02, 1.0, 0.5, 0.05);
        let xdot = p.derivative(&StateVector::zeros(3), 0.0);
        assert!(xdot[1] < 0.0);
    }

    #[test]
    fn capacities_are_floored() {
        assert_eq!(FirstOrderLag::new(0.0).tau, 1e-6);
        assert_eq!(FirstOrderLag::new(-3.0).tau, 1e-6);
        assert_eq!(MassSpringDamper::new(0.0, 0.0, 1.0).m, 1e-6);
        let motor = DcMotor::new(0.0, 0.1, 0.02, 0.02, 0.0, -1.0, 0.0);
        assert_eq!(motor.j, 1e-6);
        assert_eq!(motor.r, 1e-6);
        assert_eq!(motor.l, 1e-6);
        // damping and load torque are not floored
        assert_eq!(MassSpringDamper::new(1.0, -0.5, 1.0).c, -0.5);
    }

    #[test]
    fn missing_params_take_defaults() {
        let plant = Plant::from_params("dc_motor", &params(&[("R", 2.0)])).unwrap();
        let Plant::DcMotor(motor) = plant else {
            panic!("expected DC motor, got {plant:?}");
        };
        assert_eq!(motor.r, 2.0);
        assert_eq!(motor.j, 0.01);
        assert_eq!(motor.l, 0.5);
    }

    #[test]
    fn unknown_param_keys_are_ignored() {
        let plant = Plant::from_params("first", &params(&[("tau", 0.5), ("zeta", 9.0)])).unwrap();
        assert_eq!(plant, Plant::FirstOrderLag(FirstOrderLag::new(0.5)));
    }

    #[test]
    fn kind_aliases_parse() {
        for (tag, kind) in [
            ("first_order", PlantKind::FirstOrder),
            ("first", PlantKind::FirstOrder),
            ("first-order", PlantKind::FirstOrder),
            ("mass_spring_damper", PlantKind::MassSpringDamper),
            ("second", PlantKind::MassSpringDamper),
            ("msd", PlantKind::MassSpringDamper),
            ("dc_motor", PlantKind::DcMotor),
            ("dcMotor", PlantKind::DcMotor),
            ("dc-motor", PlantKind::DcMotor),
        ] {
            assert_eq!(tag.parse::<PlantKind>().unwrap(), kind);
        }
        for kind in PlantKind::ALL {
            assert_eq!(kind.as_str().parse::<PlantKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Plant::from_params("third", &PlantParams::new()).unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownPlant {
                kind: "third".to_string()
            }
        );
    }

    #[test]
    fn default_params_round_trip() {
        for kind in PlantKind::ALL {
            let plant = Plant::from_kind(kind, &kind.default_params());
            assert_eq!(plant.kind(), kind);
            let expected = match kind {
                PlantKind::FirstOrder => Plant::FirstOrderLag(FirstOrderLag::default()),
                PlantKind::MassSpringDamper => {
                    Plant::MassSpringDamper(MassSpringDamper::default())
                }
                PlantKind::DcMotor => Plant::DcMotor(DcMotor::default()),
            };
            assert_eq!(plant, expected);
        }
    }
}
