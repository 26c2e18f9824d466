//! Quick-start tuning presets per plant kind.
//!
//! Rough Ziegler-Nichols style starting points. Applying one only touches the
//! gains and the derivative filter; bounds and anti-windup are left alone.

use ps_controls::PidGains;
use ps_project::schema::RunConfig;
use ps_sim::PlantKind;

use crate::error::AppResult;

pub fn tuning_preset(kind: PlantKind) -> PidGains {
    match kind {
        PlantKind::FirstOrder => PidGains::new(1.2, 1.0, 0.0, 50.0),
        PlantKind::MassSpringDamper => PidGains::new(3.2, 2.4, 0.4, 60.0),
        PlantKind::DcMotor => PidGains::new(6.0, 3.0, 0.2, 60.0),
    }
}

/// Overwrite the controller gains with the preset for the configured plant.
pub fn apply_preset(config: &mut RunConfig) -> AppResult<PidGains> {
    let kind: PlantKind = config.plant.kind.parse()?;
    let gains = tuning_preset(kind);
    let c = &mut config.controller;
    c.kp = gains.kp;
    c.ki = gains.ki;
    c.kd = gains.kd;
    c.n = gains.n;
    tracing::info!(plant = %kind, kp = gains.kp, ki = gains.ki, kd = gains.kd, n = gains.n, "applied tuning preset");
    Ok(gains)
}
