//! Natural cubic spline interpolation.
//!
//! Measured curves are resampled onto the working grid by splining the real
//! and imaginary parts independently. Queries outside the sampled range hold
//! the nearest endpoint value rather than extrapolating.

use num_complex::Complex64;

use crate::grid::validate_increasing;
use crate::{CoreError, CoreResult, Real};

/// Natural cubic spline through `(x[i], y[i])`.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<Real>,
    y: Vec<Real>,
    /// Second derivatives at the knots; zero at both ends.
    m: Vec<Real>,
}

impl CubicSpline {
    pub fn natural(x: &[Real], y: &[Real]) -> CoreResult<Self> {
        if x.len() != y.len() {
            return Err(CoreError::LengthMismatch {
                what: "spline knots",
                left: x.len(),
                right: y.len(),
            });
        }
        if x.is_empty() {
            return Err(CoreError::InvalidArg {
                what: "spline needs at least one knot",
            });
        }
        validate_increasing(x, "spline knots")?;

        let n = x.len();
        let mut m = vec![0.0; n];
        if n > 2 {
            // Thomas algorithm over the interior knots.
            let inner = n - 2;
            let mut diag = vec![0.0; inner];
            let mut upper = vec![0.0; inner];
            let mut rhs = vec![0.0; inner];
            for k in 0..inner {
                let i = k + 1;
                let h0 = x[i] - x[i - 1];
                let h1 = x[i + 1] - x[i];
                diag[k] = 2.0 * (h0 + h1);
                upper[k] = h1;
                rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
                if k > 0 {
                    let w = h0 / diag[k - 1];
                    diag[k] -= w * upper[k - 1];
                    rhs[k] -= w * rhs[k - 1];
                }
            }
            for k in (0..inner).rev() {
                let next = if k + 1 < inner { m[k + 2] } else { 0.0 };
                m[k + 1] = (rhs[k] - upper[k] * next) / diag[k];
            }
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    pub fn eval(&self, xq: Real) -> Real {
        let n = self.x.len();
        if n == 1 || xq <= self.x[0] {
            return self.y[0];
        }
        if xq >= self.x[n - 1] {
            return self.y[n - 1];
        }
        // First knot strictly greater than xq; guaranteed in 1..n here.
        let hi = self.x.partition_point(|&v| v <= xq);
        let lo = hi - 1;
        let h = self.x[hi] - self.x[lo];
        let a = (self.x[hi] - xq) / h;
        let b = (xq - self.x[lo]) / h;
        a * self.y[lo]
            + b * self.y[hi]
            + ((a * a * a - a) * self.m[lo] + (b * b * b - b) * self.m[hi]) * h * h / 6.0
    }
}

/// Pair of splines over the real and imaginary parts of a complex curve.
#[derive(Debug, Clone)]
pub struct ComplexSpline {
    re: CubicSpline,
    im: CubicSpline,
}

impl ComplexSpline {
    pub fn natural(x: &[Real], y: &[Complex64]) -> CoreResult<Self> {
        let re: Vec<Real> = y.iter().map(|c| c.re).collect();
        let im: Vec<Real> = y.iter().map(|c| c.im).collect();
        Ok(Self {
            re: CubicSpline::natural(x, &re)?,
            im: CubicSpline::natural(x, &im)?,
        })
    }

    pub fn eval(&self, xq: Real) -> Complex64 {
        Complex64::new(self.re.eval(xq), self.im.eval(xq))
    }

    pub fn eval_many(&self, xq: &[Real]) -> Vec<Complex64> {
        xq.iter().map(|&v| self.eval(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_knots() {
        let x = [0.0, 1.0, 2.5, 4.0, 5.0];
        let y = [1.0, -2.0, 0.5, 3.0, 2.0];
        let s = CubicSpline::natural(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y) {
            assert!((s.eval(*xi) - yi).abs() < 1e-12);
        }
    }

    #[test]
    fn reproduces_linear_data() {
        let x: Vec<Real> = (0..8).map(|i| i as Real * 0.7).collect();
        let y: Vec<Real> = x.iter().map(|v| 3.0 * v - 1.0).collect();
        let s = CubicSpline::natural(&x, &y).unwrap();
        for q in [0.1, 1.3, 2.2, 4.9] {
            assert!((s.eval(q) - (3.0 * q - 1.0)).abs() < 1e-10);
        }
    }

    #[test]
    fn two_points_is_linear() {
        let s = CubicSpline::natural(&[0.0, 2.0], &[0.0, 4.0]).unwrap();
        assert!((s.eval(0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn holds_endpoints_outside_range() {
        let s = CubicSpline::natural(&[1.0, 2.0, 3.0], &[5.0, 6.0, 9.0]).unwrap();
        assert_eq!(s.eval(0.0), 5.0);
        assert_eq!(s.eval(10.0), 9.0);
    }

    #[test]
    fn smooth_curve_is_close() {
        let x: Vec<Real> = (0..50).map(|i| i as Real * 0.1).collect();
        let y: Vec<Complex64> = x.iter().map(|v| Complex64::new(v.sin(), v.cos())).collect();
        let s = ComplexSpline::natural(&x, &y).unwrap();
        let q = 2.345;
        let got = s.eval(q);
        assert!((got.re - q.sin()).abs() < 1e-4);
        assert!((got.im - q.cos()).abs() < 1e-4);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert!(CubicSpline::natural(&[0.0, 1.0], &[0.0]).is_err());
        assert!(CubicSpline::natural(&[1.0, 0.0], &[0.0, 1.0]).is_err());
    }
}
