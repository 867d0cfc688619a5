//! Frequency-grid compatibility.
//!
//! Measured responses are never interpolated onto a model grid that they only
//! roughly cover. Instead the two grids must share a contiguous run of
//! matching points, and the caller narrows its working grid to that run.

use serde::Serialize;
use tracing::trace;

use crate::Real;

/// Base matching tolerance, scaled by the magnitude of the compared value.
pub const FUZZ: Real = 1e-10;

/// Fewest points either grid, and the overlap between them, may have.
pub const MIN_FREQUENCIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compatibility {
    pub is_valid: bool,
    pub is_exact: bool,
    pub has_overlap: bool,
    /// The matched sub-range of the current grid.
    pub overlap: Vec<Real>,
}

impl Compatibility {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            is_exact: false,
            has_overlap: false,
            overlap: Vec::new(),
        }
    }
}

/// Tolerance for comparing against `value`: `FUZZ · 10^d` where `d` is the
/// number of digits before the decimal point.
pub fn tolerance(value: Real) -> Real {
    let magnitude = value.abs();
    let digits = if magnitude >= 1.0 {
        magnitude.log10().floor() + 1.0
    } else {
        0.0
    };
    FUZZ * 10f64.powf(digits)
}

fn matches(a: Real, b: Real) -> bool {
    (a - b).abs() <= tolerance(a.abs().max(b.abs()))
}

#[derive(Clone, Copy)]
struct Run {
    current_start: usize,
    len: usize,
}

/// Compares `new` against `current` and reports the longest contiguous run of
/// points present in both (consecutive in both grids).
///
/// Both grids must be strictly increasing.
pub fn check(current: &[Real], new: &[Real]) -> Compatibility {
    if new.len() < MIN_FREQUENCIES || current.len() < MIN_FREQUENCIES {
        return Compatibility::invalid();
    }

    let mut best: Option<(Run, usize)> = None;
    let mut run: Option<(Run, usize)> = None;
    let mut j = 0;

    for (i, &f) in new.iter().enumerate() {
        while j < current.len() && current[j] < f && !matches(current[j], f) {
            j += 1;
        }
        let hit = j < current.len() && matches(current[j], f);

        run = match (hit, run) {
            (true, Some((r, new_start)))
                if r.current_start + r.len == j && new_start + r.len == i =>
            {
                Some((
                    Run {
                        current_start: r.current_start,
                        len: r.len + 1,
                    },
                    new_start,
                ))
            }
            (true, _) => Some((
                Run {
                    current_start: j,
                    len: 1,
                },
                i,
            )),
            (false, _) => None,
        };
        if let Some(candidate) = run
            && best.is_none_or(|(b, _)| candidate.0.len > b.len)
        {
            best = Some(candidate);
        }
        if hit {
            j += 1;
        }
    }

    let Some((run, new_start)) = best else {
        return Compatibility::invalid();
    };
    if run.len < MIN_FREQUENCIES {
        trace!(matched = run.len, "matching run shorter than the minimum");
        return Compatibility::invalid();
    }

    let is_exact = current.len() == new.len()
        && run.current_start == 0
        && new_start == 0
        && run.len == current.len();

    Compatibility {
        is_valid: true,
        is_exact,
        has_overlap: true,
        overlap: current[run.current_start..run.current_start + run.len].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{linspace, logspace};

    #[test]
    fn identical_grids_are_exact() {
        let g = logspace(10.0, 1e5, 200).unwrap();
        let c = check(&g, &g);
        assert!(c.is_valid && c.is_exact && c.has_overlap);
        assert_eq!(c.overlap, g);
    }

    #[test]
    fn subgrid_narrows_to_subgrid() {
        let g = linspace(100.0, 10_000.0, 100);
        let sub = g[20..60].to_vec();
        let c = check(&g, &sub);
        assert!(c.is_valid);
        assert!(!c.is_exact);
        assert_eq!(c.overlap, sub);
    }

    #[test]
    fn supergrid_narrows_to_current() {
        let wide = linspace(1.0, 200.0, 200);
        let current = wide[50..120].to_vec();
        let c = check(&current, &wide);
        assert!(c.is_valid && !c.is_exact);
        assert_eq!(c.overlap, current);
    }

    #[test]
    fn disjoint_grids_are_invalid() {
        let a = linspace(1.0, 10.0, 50);
        let b = linspace(20.0, 30.0, 50);
        assert_eq!(check(&a, &b), Compatibility::invalid());
    }

    #[test]
    fn interleaved_grids_are_invalid() {
        let a = linspace(1.0, 10.0, 50);
        let b: Vec<Real> = a.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
        assert!(!check(&a, &b).is_valid);
    }

    #[test]
    fn too_few_points_rejected() {
        let g = linspace(1.0, 10.0, 50);
        assert!(!check(&g, &g[..MIN_FREQUENCIES - 1]).is_valid);
        assert!(check(&g, &g[..MIN_FREQUENCIES]).is_valid);
    }

    #[test]
    fn short_overlap_rejected() {
        let g = linspace(1.0, 100.0, 100);
        // five shared points, then off-grid values
        let mut new: Vec<Real> = g[..5].to_vec();
        new.extend((0..20).map(|i| 200.0 + i as Real));
        assert!(!check(&g, &new).is_valid);
    }

    #[test]
    fn relative_tolerance_absorbs_rounding() {
        let g = logspace(62.8, 62_800.0, 100).unwrap();
        let perturbed: Vec<Real> = g.iter().map(|w| w * (1.0 + 1e-14)).collect();
        let c = check(&g, &perturbed);
        assert!(c.is_valid && c.is_exact);
    }

    #[test]
    fn longest_run_wins() {
        let g = linspace(1.0, 100.0, 100);
        let mut new: Vec<Real> = g[0..12].to_vec();
        new.push(12.5);
        new.extend_from_slice(&g[20..50]);
        let c = check(&g, &new);
        assert!(c.is_valid);
        assert_eq!(c.overlap, g[20..50].to_vec());
    }
}
