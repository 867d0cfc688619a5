//! Frequency grid construction and validation.
//!
//! Grids are plain `&[Real]` slices of angular frequencies (rad/s). Every grid
//! that reaches a response computation must be non-empty, finite, positive and
//! strictly increasing; [`validate`] enforces that once at the boundary so the
//! evaluation paths can assume it.

use crate::{CoreError, CoreResult, Real, ensure_finite};

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace(start: Real, stop: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as Real;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as Real })
                .collect()
        }
    }
}

/// `n` logarithmically spaced points from `start` to `stop` inclusive.
///
/// Both endpoints are values, not exponents.
pub fn logspace(start: Real, stop: Real, n: usize) -> CoreResult<Vec<Real>> {
    if !(start > 0.0 && stop > 0.0) {
        return Err(CoreError::InvalidArg {
            what: "logspace endpoints must be positive",
        });
    }
    let (lo, hi) = (start.log10(), stop.log10());
    Ok(linspace(lo, hi, n)
        .into_iter()
        .enumerate()
        .map(|(i, e)| match i {
            0 => start,
            _ if i == n - 1 => stop,
            _ => 10f64.powf(e),
        })
        .collect())
}

/// Checks that `grid` is usable as an angular-frequency axis.
pub fn validate(grid: &[Real], what: &'static str) -> CoreResult<()> {
    if grid.is_empty() {
        return Err(CoreError::InvalidArg { what });
    }
    for (index, &w) in grid.iter().enumerate() {
        ensure_finite(w, what)?;
        if w <= 0.0 {
            return Err(CoreError::InvalidArg { what });
        }
        if index > 0 && w <= grid[index - 1] {
            return Err(CoreError::NotIncreasing { what, index });
        }
    }
    Ok(())
}

/// Checks ordering only: finite and strictly increasing, any sign.
pub fn validate_increasing(values: &[Real], what: &'static str) -> CoreResult<()> {
    for (index, &v) in values.iter().enumerate() {
        ensure_finite(v, what)?;
        if index > 0 && v <= values[index - 1] {
            return Err(CoreError::NotIncreasing { what, index });
        }
    }
    Ok(())
}
