use crate::TpError;

/// Floating point type used for temperatures, gains and signals.
pub type Real = f64;

/// Absolute/relative tolerance pair for float comparisons in tests and reports.
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, TpError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TpError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, TpError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(TpError::InvalidArg { what })
    }
}

/// Finite and inside the half-open interval `[0, 1)`.
pub fn ensure_unit_fraction(v: Real, what: &'static str) -> Result<Real, TpError> {
    let v = ensure_finite(v, what)?;
    if (0.0..1.0).contains(&v) {
        Ok(v)
    } else {
        Err(TpError::InvalidArg { what })
    }
}
