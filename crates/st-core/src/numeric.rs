use num_complex::Complex64;

use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub const TWO_PI: Real = 2.0 * std::f64::consts::PI;

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

impl Tolerances {
    pub const fn new(abs: Real, rel: Real) -> Self {
        Self { abs, rel }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Complex variant of [`nearly_equal`], measured on the modulus of the difference.
pub fn complex_nearly_equal(a: Complex64, b: Complex64, tol: Tolerances) -> bool {
    let diff = (a - b).norm();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.norm().max(b.norm())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Replaces NaN and infinities with zero.
#[inline]
pub fn finite_or_zero(v: Real) -> Real {
    if v.is_finite() { v } else { 0.0 }
}
