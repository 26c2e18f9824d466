use crate::{CoreError, CoreResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Floor applied to parameters that denote a physical capacity (time constant,
/// mass, inertia, resistance, inductance) so that dynamics never divide by zero.
pub const MIN_POSITIVE_PARAM: Real = 1e-6;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Require a finite, strictly positive value.
pub fn ensure_positive(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange {
            what,
            value: v,
            reason: "must be positive",
        })
    }
}

/// Clamp a capacity-like parameter to [`MIN_POSITIVE_PARAM`].
///
/// NaN maps to the floor as well.
pub fn floor_positive(v: Real) -> Real {
    v.max(MIN_POSITIVE_PARAM)
}

/// Three-valued sign: `-1`, `0` or `1`. NaN stays NaN.
///
/// Unlike [`f64::signum`], zero maps to zero.
pub fn sign(v: Real) -> Real {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        // 0.0, -0.0 and NaN all return themselves (NaN stays NaN)
        v * 0.0
    }
}

/// Maximum that propagates NaN instead of skipping it.
pub fn nan_max(a: Real, b: Real) -> Real {
    if a.is_nan() || b.is_nan() {
        Real::NAN
    } else {
        a.max(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(0.0, "dt").is_err());
        assert!(ensure_positive(-1.0, "dt").is_err());
        assert!(ensure_positive(Real::INFINITY, "dt").is_err());
        assert_eq!(ensure_positive(0.01, "dt").unwrap(), 0.01);
    }

    #[test]
    fn floor_positive_clamps() {
        assert_eq!(floor_positive(0.0), MIN_POSITIVE_PARAM);
        assert_eq!(floor_positive(-3.0), MIN_POSITIVE_PARAM);
        assert_eq!(floor_positive(Real::NAN), MIN_POSITIVE_PARAM);
        assert_eq!(floor_positive(2.5), 2.5);
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.0), 1.0);
        assert_eq!(sign(-1e-300), -1.0);
        assert!(sign(Real::NAN).is_nan());
    }

    #[test]
    fn nan_max_propagates() {
        assert_eq!(nan_max(1.0, 2.0), 2.0);
        assert!(nan_max(1.0, Real::NAN).is_nan());
        assert!(nan_max(Real::NAN, 1.0).is_nan());
    }
}
