//! Classical stability margins of a sampled open loop.
//!
//! Crossovers are located between grid points by linear interpolation, so
//! the accuracy follows the grid density.

use serde::Serialize;
use st_core::{Complex64, Frd, Real};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainMargin {
    pub ratio: Real,
    pub db: Real,
    /// Phase crossover, rad/s.
    pub frequency: Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseMargin {
    pub degrees: Real,
    /// Gain crossover, rad/s.
    pub frequency: Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakSensitivity {
    pub ratio: Real,
    pub db: Real,
    pub frequency: Real,
}

/// Margins of an open loop `L(jω)`. A margin is `None` when its crossover
/// does not occur on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StabilityMargins {
    pub gain: Option<GainMargin>,
    pub phase: Option<PhaseMargin>,
    pub peak_sensitivity: Option<PeakSensitivity>,
}

fn to_db(ratio: Real) -> Real {
    20.0 * ratio.log10()
}

fn lerp(a: Real, b: Real, t: Real) -> Real {
    a + (b - a) * t
}

/// Wraps to (-180, 180].
fn wrap_degrees(deg: Real) -> Real {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

pub fn stability_margins(open_loop: &Frd) -> StabilityMargins {
    let w = open_loop.frequency();
    let l = open_loop.response();
    StabilityMargins {
        gain: gain_margin(w, l),
        phase: phase_margin(w, l),
        peak_sensitivity: peak_sensitivity(w, l),
    }
}

/// Smallest gain margin over every crossing of the negative real axis.
fn gain_margin(w: &[Real], l: &[Complex64]) -> Option<GainMargin> {
    let mut best: Option<GainMargin> = None;
    let mut consider = |re: Real, frequency: Real| {
        if re >= 0.0 {
            return;
        }
        let ratio = 1.0 / re.abs();
        if best.is_none_or(|b| ratio < b.ratio) {
            best = Some(GainMargin {
                ratio,
                db: to_db(ratio),
                frequency,
            });
        }
    };

    for i in 0..l.len() {
        if l[i].im == 0.0 {
            consider(l[i].re, w[i]);
            continue;
        }
        if let Some(next) = l.get(i + 1)
            && next.im != 0.0
            && l[i].im.signum() != next.im.signum()
        {
            let t = l[i].im / (l[i].im - next.im);
            consider(lerp(l[i].re, next.re, t), lerp(w[i], w[i + 1], t));
        }
    }
    best
}

/// Smallest phase margin over every unity-gain crossing.
fn phase_margin(w: &[Real], l: &[Complex64]) -> Option<PhaseMargin> {
    let mut best: Option<PhaseMargin> = None;
    for i in 0..l.len().saturating_sub(1) {
        let (a, b) = (l[i].norm() - 1.0, l[i + 1].norm() - 1.0);
        let crossing = if a == 0.0 {
            Some((l[i], w[i]))
        } else if a.signum() != b.signum() && b != 0.0 {
            let t = a / (a - b);
            let re = lerp(l[i].re, l[i + 1].re, t);
            let im = lerp(l[i].im, l[i + 1].im, t);
            Some((Complex64::new(re, im), lerp(w[i], w[i + 1], t)))
        } else {
            None
        };
        if let Some((value, frequency)) = crossing {
            let degrees = wrap_degrees(value.arg().to_degrees() + 180.0);
            if best.is_none_or(|b| degrees < b.degrees) {
                best = Some(PhaseMargin { degrees, frequency });
            }
        }
    }
    // Last point lands exactly on unity gain.
    if let (Some(last), Some(&frequency)) = (l.last(), w.last())
        && l.len() > 1
        && last.norm() == 1.0
    {
        let degrees = wrap_degrees(last.arg().to_degrees() + 180.0);
        if best.is_none_or(|b| degrees < b.degrees) {
            best = Some(PhaseMargin { degrees, frequency });
        }
    }
    best
}

/// Peak of `|1/(1 + L)|`.
fn peak_sensitivity(w: &[Real], l: &[Complex64]) -> Option<PeakSensitivity> {
    l.iter()
        .zip(w)
        .map(|(l, &frequency)| ((1.0 + *l).inv().norm(), frequency))
        .filter(|(ratio, _)| ratio.is_finite())
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(ratio, frequency)| PeakSensitivity {
            ratio,
            db: to_db(ratio),
            frequency,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_core::grid::logspace;

    fn open_loop(f: impl Fn(Complex64) -> Complex64) -> Frd {
        let w = logspace(0.01, 100.0, 4000).unwrap();
        Frd::from_fn(&w, |w| f(Complex64::new(0.0, w)))
    }

    #[test]
    fn integrator_with_lag_has_phase_margin_only() {
        let l = open_loop(|s| 1.0 / (s * (s + 1.0)));
        let m = stability_margins(&l);
        assert!(m.gain.is_none());
        let pm = m.phase.unwrap();
        assert!((pm.degrees - 51.827).abs() < 0.05, "{}", pm.degrees);
        assert!((pm.frequency - 0.786).abs() < 1e-3, "{}", pm.frequency);
    }

    #[test]
    fn third_order_gain_margin() {
        let l = open_loop(|s| 2.0 / (s * (s + 1.0) * (s + 2.0)));
        let m = stability_margins(&l);
        let gm = m.gain.unwrap();
        assert!((gm.ratio - 3.0).abs() < 1e-2, "{}", gm.ratio);
        assert!((gm.db - 20.0 * 3f64.log10()).abs() < 0.05);
        assert!((gm.frequency - 2f64.sqrt()).abs() < 1e-2);
        assert!(m.phase.unwrap().degrees > 0.0);
    }

    #[test]
    fn peak_sensitivity_is_at_least_one_for_integrating_loop() {
        let l = open_loop(|s| 2.0 / (s * (s + 1.0) * (s + 2.0)));
        let ms = stability_margins(&l).peak_sensitivity.unwrap();
        assert!(ms.ratio > 1.0);
        // Ms bounds GM from below: GM >= Ms/(Ms - 1).
        assert!(3.0 >= ms.ratio / (ms.ratio - 1.0) - 1e-6);
    }

    #[test]
    fn wrap_is_half_open() {
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert!((wrap_degrees(270.0) + 90.0).abs() < 1e-12);
        assert!((wrap_degrees(-200.0) - 160.0).abs() < 1e-12);
    }
}
