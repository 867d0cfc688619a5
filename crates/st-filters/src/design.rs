//! Parameter ↔ coefficient design formulas.
//!
//! [`StandardDesign`] carries the drive vendor's formulas: a second-order
//! Butterworth-style low-pass (and its high-pass mirror), a notch whose width
//! and depth map onto a damping ratio, a resonant section that reuses the
//! notch with positive gain, and a first-order lead/lag discretised with a
//! bilinear transform prewarped at the centre frequency.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use st_core::Real;

use crate::error::{FilterError, FilterResult};
use crate::filter::{Coefficients, FilterType};

/// Converts between user parameters and biquad coefficients.
pub trait FilterDesign {
    /// Parameters → coefficients at sampling frequency `fs` (Hz).
    fn forward(&self, t: FilterType, parameters: &[Real], fs: Real) -> FilterResult<Coefficients>;

    /// Coefficients → parameters at sampling frequency `fs` (Hz).
    fn backward(&self, t: FilterType, c: &Coefficients, fs: Real) -> FilterResult<Vec<Real>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDesign;

impl FilterDesign for StandardDesign {
    fn forward(&self, t: FilterType, p: &[Real], fs: Real) -> FilterResult<Coefficients> {
        if p.len() != t.arity() {
            return Err(FilterError::ParameterCount {
                filter_type: t,
                expected: t.arity(),
                got: p.len(),
            });
        }
        match t {
            FilterType::Empty => Ok(Coefficients::UNITY),
            FilterType::LowPass => low_pass(p[0], fs),
            FilterType::HighPass => high_pass(p[0], fs),
            FilterType::LeadLag => lead_lag(p[0], p[1], fs),
            FilterType::Notch => second_order_section(t, p[0], p[1], 10f64.powf(-p[2] / 20.0), fs),
            FilterType::Resonant => second_order_section(t, p[0], p[1], 10f64.powf(p[2] / 20.0), fs),
            FilterType::Custom => Ok(Coefficients::from_slice(p).unwrap_or(Coefficients::UNITY)),
        }
    }

    fn backward(&self, t: FilterType, c: &Coefficients, fs: Real) -> FilterResult<Vec<Real>> {
        match t {
            FilterType::Empty => Ok(Vec::new()),
            FilterType::LowPass | FilterType::HighPass => Ok(vec![butterworth_cutoff(t, c, fs)?]),
            FilterType::LeadLag => lead_lag_parameters(c, fs),
            FilterType::Notch => {
                let (f, width, delta) = section_parameters(t, c, fs)?;
                Ok(vec![f, width, -20.0 * delta.log10()])
            }
            FilterType::Resonant => {
                let (f, width, delta) = section_parameters(t, c, fs)?;
                Ok(vec![f, width, 20.0 * delta.log10()])
            }
            FilterType::Custom => Ok(c.to_vec()),
        }
    }
}

fn degenerate(filter_type: FilterType, what: &'static str) -> FilterError {
    FilterError::Degenerate { filter_type, what }
}

fn check_frequency(t: FilterType, f: Real, fs: Real) -> FilterResult<()> {
    if !(f.is_finite() && f > 0.0) {
        return Err(degenerate(t, "frequency must be positive"));
    }
    if !(fs.is_finite() && fs > 0.0) {
        return Err(degenerate(t, "sampling frequency must be positive"));
    }
    Ok(())
}

/// Shared denominator of the low- and high-pass sections.
fn butterworth_denominator(t: FilterType, fc: Real, fs: Real) -> FilterResult<(Real, Real)> {
    check_frequency(t, fc, fs)?;
    let dc = 2.0 * (PI * fc / fs).atan();
    let k = FRAC_1_SQRT_2 * dc.sin();
    let dd = (1.0 - k) / (1.0 + k);
    Ok((-(1.0 + dd) * dc.cos(), dd))
}

fn low_pass(fc: Real, fs: Real) -> FilterResult<Coefficients> {
    let (d1, d2) = butterworth_denominator(FilterType::LowPass, fc, fs)?;
    let n = (1.0 + d1 + d2) / 4.0;
    Ok(Coefficients {
        n0: n,
        n1: 2.0 * n,
        n2: n,
        d1,
        d2,
    })
}

fn high_pass(fc: Real, fs: Real) -> FilterResult<Coefficients> {
    let (d1, d2) = butterworth_denominator(FilterType::HighPass, fc, fs)?;
    let n = (1.0 - d1 + d2) / 4.0;
    Ok(Coefficients {
        n0: n,
        n1: -2.0 * n,
        n2: n,
        d1,
        d2,
    })
}

fn butterworth_cutoff(t: FilterType, c: &Coefficients, fs: Real) -> FilterResult<Real> {
    if 1.0 + c.d2 == 0.0 {
        return Err(degenerate(t, "D2 = -1"));
    }
    let cos_dc = -c.d1 / (1.0 + c.d2);
    if !(-1.0..=1.0).contains(&cos_dc) {
        return Err(degenerate(t, "coefficients are not a Butterworth section"));
    }
    Ok((cos_dc.acos() / 2.0).tan() * fs / PI)
}

/// Notch/resonant section. `delta` is the linear gain at the centre
/// frequency: below one for a notch, above one for a resonance.
fn second_order_section(
    t: FilterType,
    f: Real,
    width: Real,
    delta: Real,
    fs: Real,
) -> FilterResult<Coefficients> {
    check_frequency(t, f, fs)?;
    if !(width.is_finite() && width > 0.0) {
        return Err(degenerate(t, "width must be positive"));
    }
    if f >= fs / 2.0 {
        return Err(degenerate(t, "centre frequency at or above Nyquist"));
    }
    let ts = 1.0 / fs;
    let w = 2.0 * PI * width;
    let wc = 2.0 / ts * (PI * f * ts).tan();
    let ratio = w / wc;
    let alpha = ratio + (ratio * ratio + 1.0).sqrt();
    let zeta = ((alpha + 1.0 / alpha - 2.0) / (4.0 * (1.0 - 2.0 * delta * delta).abs())).sqrt();
    if !zeta.is_finite() {
        return Err(degenerate(t, "depth of 3 dB has no damping solution"));
    }

    let u = wc * ts;
    let a0 = 4.0 + u * u + 4.0 * zeta * u;
    let d1 = (-8.0 + 2.0 * u * u) / a0;
    Ok(Coefficients {
        n0: (4.0 + u * u + 4.0 * delta * zeta * u) / a0,
        n1: d1,
        n2: (4.0 - 4.0 * delta * zeta * u + u * u) / a0,
        d1,
        d2: (4.0 - 4.0 * zeta * u + u * u) / a0,
    })
}

/// Inverse of [`second_order_section`]: (centre Hz, width Hz, delta).
fn section_parameters(t: FilterType, c: &Coefficients, fs: Real) -> FilterResult<(Real, Real, Real)> {
    let ts = 1.0 / fs;
    if 1.0 + c.d2 == 0.0 || 1.0 - c.d2 == 0.0 {
        return Err(degenerate(t, "D2 = ±1"));
    }
    let r = c.d1 / (1.0 + c.d2);
    if r >= 1.0 {
        return Err(degenerate(t, "centre frequency undefined"));
    }
    let u2 = 4.0 * (1.0 + r) / (1.0 - r);
    if u2 <= 0.0 {
        return Err(degenerate(t, "centre frequency undefined"));
    }
    let u = u2.sqrt();
    let f = (u / 2.0).atan() / (PI * ts);
    let wc = u / ts;

    let zeta = (1.0 - c.d2) / (1.0 + c.d2) * (4.0 + u2) / (4.0 * u);
    let delta = (c.n0 - c.n2) / (1.0 - c.d2);
    if !(zeta > 0.0 && delta > 0.0) {
        return Err(degenerate(t, "damping or depth undefined"));
    }
    let s = 1.0 + 2.0 * zeta * zeta * (1.0 - 2.0 * delta * delta).abs();
    let width = (s * s - 1.0).sqrt() * wc / (2.0 * PI);
    Ok((f, width, delta))
}

/// Unity-DC-gain lead/lag with maximum phase `phase_deg` at `f` Hz.
fn lead_lag(f: Real, phase_deg: Real, fs: Real) -> FilterResult<Coefficients> {
    let t = FilterType::LeadLag;
    check_frequency(t, f, fs)?;
    if f >= fs / 2.0 {
        return Err(degenerate(t, "frequency at or above Nyquist"));
    }
    if !(phase_deg.is_finite() && phase_deg.abs() < 90.0) {
        return Err(degenerate(t, "phase must lie strictly between -90 and 90 degrees"));
    }
    let sin_phi = phase_deg.to_radians().sin();
    let wm = 2.0 * PI * f;
    let wz = wm * ((1.0 - sin_phi) / (1.0 + sin_phi)).sqrt();
    let wp = wm * ((1.0 + sin_phi) / (1.0 - sin_phi)).sqrt();
    let c = wm / (wm / (2.0 * fs)).tan();
    let k = wp / wz;
    Ok(Coefficients {
        n0: k * (c + wz) / (c + wp),
        n1: k * (wz - c) / (c + wp),
        n2: 0.0,
        d1: (wp - c) / (c + wp),
        d2: 0.0,
    })
}

fn lead_lag_parameters(c: &Coefficients, fs: Real) -> FilterResult<Vec<Real>> {
    let t = FilterType::LeadLag;
    if c.n0 == 0.0 || c.d1.abs() >= 1.0 {
        return Err(degenerate(t, "coefficients are not a first-order lead/lag"));
    }
    let r = c.n1 / c.n0;
    if r.abs() >= 1.0 {
        return Err(degenerate(t, "zero outside the unit circle"));
    }
    let wp_c = (1.0 + c.d1) / (1.0 - c.d1);
    let wz_c = (1.0 + r) / (1.0 - r);
    let wm = 2.0 * fs * (wz_c * wp_c).sqrt().atan();
    let sin_phi = (wp_c - wz_c) / (wp_c + wz_c);
    Ok(vec![wm / (2.0 * PI), sin_phi.asin().to_degrees()])
}
