//! Transfer-function evaluation on a frequency grid.
//!
//! Continuous systems are evaluated at `s = jω`; discrete systems at
//! `z = exp(jωTs)`. Polynomials in [`TransferFunction`] are in descending
//! powers, while [`freqz`] takes coefficients in ascending powers of `z⁻¹`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{Frd, Real};

const J: Complex64 = Complex64::new(0.0, 1.0);

/// Evaluates a polynomial given in descending powers at `x` (Horner).
pub fn polyval(coeffs: &[Real], x: Complex64) -> Complex64 {
    coeffs
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * x + c)
}

/// `gain · ∏(s − z) / ∏(s − p)` at `s = jω` for every grid point.
pub fn zpk_response(zeros: &[Complex64], poles: &[Complex64], gain: Real, omega: &[Real]) -> Frd {
    Frd::from_fn(omega, |w| {
        let s = J * w;
        let num: Complex64 = zeros.iter().map(|z| s - z).product();
        let den: Complex64 = poles.iter().map(|p| s - p).product();
        num / den * gain
    })
}

/// Digital filter response with coefficients in powers of `z⁻¹`:
/// `Σ b[k] z⁻ᵏ / Σ a[k] z⁻ᵏ` at `z = exp(jω/fs)`.
pub fn freqz(b: &[Real], a: &[Real], omega: &[Real], fs: Real) -> Frd {
    Frd::from_fn(omega, |w| {
        let z_inv = (-J * (w / fs)).exp();
        let eval = |c: &[Real]| {
            c.iter()
                .rev()
                .fold(Complex64::new(0.0, 0.0), |acc, &k| acc * z_inv + k)
        };
        eval(b) / eval(a)
    })
}

/// One-sample delay `z⁻¹` at sample rate `fs`.
pub fn unit_delay(omega: &[Real], fs: Real) -> Frd {
    Frd::from_fn(omega, |w| (-J * (w / fs)).exp())
}

/// Rational transfer function in descending powers of `s` or `z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    pub num: Vec<Real>,
    pub den: Vec<Real>,
    /// `None` for continuous time, otherwise the sample period in seconds.
    pub sample_time: Option<Real>,
}

impl TransferFunction {
    pub fn continuous(num: Vec<Real>, den: Vec<Real>) -> Self {
        Self {
            num,
            den,
            sample_time: None,
        }
    }

    pub fn discrete(num: Vec<Real>, den: Vec<Real>, sample_time: Real) -> Self {
        Self {
            num,
            den,
            sample_time: Some(sample_time),
        }
    }

    pub fn is_discrete(&self) -> bool {
        self.sample_time.is_some()
    }

    pub fn eval(&self, w: Real) -> Complex64 {
        let x = match self.sample_time {
            Some(ts) => (J * (w * ts)).exp(),
            None => J * w,
        };
        polyval(&self.num, x) / polyval(&self.den, x)
    }

    pub fn response(&self, omega: &[Real]) -> Frd {
        Frd::from_fn(omega, |w| self.eval(w))
    }
}

/// Roots of `a·x² + b·x + c`, falling back to the linear root when `a == 0`
/// and to no roots when both `a` and `b` vanish.
pub fn quadratic_roots(a: Real, b: Real, c: Real) -> Vec<Complex64> {
    if a != 0.0 {
        let disc = Complex64::new(b * b - 4.0 * a * c, 0.0).sqrt();
        vec![(-b + disc) / (2.0 * a), (-b - disc) / (2.0 * a)]
    } else if b != 0.0 {
        vec![Complex64::new(-c / b, 0.0)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TWO_PI;

    const TOL: Real = 1e-12;

    #[test]
    fn polyval_descending() {
        // 2x² + 3x + 4 at x = 2
        let v = polyval(&[2.0, 3.0, 4.0], Complex64::new(2.0, 0.0));
        assert!((v.re - 18.0).abs() < TOL);
    }

    #[test]
    fn first_order_zpk() {
        // 1/(s+1) at ω = 1 → (1 − j)/2
        let f = zpk_response(&[], &[Complex64::new(-1.0, 0.0)], 1.0, &[1.0]);
        let v = f.response()[0];
        assert!((v.re - 0.5).abs() < TOL);
        assert!((v.im + 0.5).abs() < TOL);
    }

    #[test]
    fn zpk_matches_polynomial_form() {
        let omega = [1.0, 10.0, 100.0];
        let a = zpk_response(
            &[Complex64::new(-2.0, 0.0)],
            &[Complex64::new(-1.0, 0.0), Complex64::new(-3.0, 0.0)],
            5.0,
            &omega,
        );
        let b = TransferFunction::continuous(vec![5.0, 10.0], vec![1.0, 4.0, 3.0]).response(&omega);
        for (x, y) in a.response().iter().zip(b.response()) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[test]
    fn freqz_matches_discrete_tf() {
        let fs = 1000.0;
        let omega = [10.0, 500.0, 3000.0];
        let b = [0.2, 0.3, 0.1];
        let a = [1.0, -0.5, 0.25];
        let f1 = freqz(&b, &a, &omega, fs);
        let f2 = TransferFunction::discrete(b.to_vec(), a.to_vec(), 1.0 / fs).response(&omega);
        for (x, y) in f1.response().iter().zip(f2.response()) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[test]
    fn unit_delay_has_linear_phase() {
        let fs = 20_000.0;
        let w = TWO_PI * 1000.0;
        let d = unit_delay(&[w], fs).response()[0];
        assert!((d.norm() - 1.0).abs() < TOL);
        assert!((d.arg() + w / fs).abs() < TOL);
    }

    #[test]
    fn quadratic_roots_cases() {
        let r = quadratic_roots(1.0, 3.0, 2.0);
        assert!(r.iter().any(|z| (z.re + 1.0).abs() < TOL));
        assert!(r.iter().any(|z| (z.re + 2.0).abs() < TOL));
        let c = quadratic_roots(1.0, 0.0, 4.0);
        assert!(c.iter().all(|z| z.re.abs() < TOL && (z.im.abs() - 2.0).abs() < TOL));
        assert_eq!(quadratic_roots(0.0, 2.0, 4.0), vec![Complex64::new(-2.0, 0.0)]);
        assert!(quadratic_roots(0.0, 0.0, 1.0).is_empty());
    }
}
