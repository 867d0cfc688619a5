//! Frequency-response data.
//!
//! An [`Frd`] is an angular-frequency axis (rad/s) paired with one complex
//! response per point. Binary arithmetic between two FRDs is only defined on
//! identical axes: the frequency vectors must compare equal element for
//! element. Overlapping ranges are not enough; callers resample first.
//!
//! The `std::ops` impls panic on an axis mismatch, the same way slice
//! indexing panics out of bounds. The `checked_*` methods return
//! [`CoreError::GridMismatch`] instead.

use std::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::grid::validate_increasing;
use crate::interp::ComplexSpline;
use crate::{CoreError, CoreResult, Real, Tolerances, complex_nearly_equal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrd")]
pub struct Frd {
    frequency: Vec<Real>,
    response: Vec<Complex64>,
}

#[derive(Deserialize)]
struct RawFrd {
    frequency: Vec<Real>,
    response: Vec<Complex64>,
}

impl TryFrom<RawFrd> for Frd {
    type Error = CoreError;

    fn try_from(raw: RawFrd) -> CoreResult<Self> {
        Frd::new(raw.frequency, raw.response)
    }
}

impl Frd {
    /// Builds an FRD, checking lengths and that frequencies strictly increase.
    pub fn new(frequency: Vec<Real>, response: Vec<Complex64>) -> CoreResult<Self> {
        if frequency.len() != response.len() {
            return Err(CoreError::LengthMismatch {
                what: "frd frequency/response",
                left: frequency.len(),
                right: response.len(),
            });
        }
        validate_increasing(&frequency, "frd frequency")?;
        Ok(Self {
            frequency,
            response,
        })
    }

    /// Samples `f` at every point of an already validated grid.
    pub fn from_fn(frequency: &[Real], f: impl FnMut(Real) -> Complex64) -> Self {
        Self {
            frequency: frequency.to_vec(),
            response: frequency.iter().copied().map(f).collect(),
        }
    }

    pub fn constant(frequency: &[Real], value: Complex64) -> Self {
        Self::from_fn(frequency, |_| value)
    }

    pub fn unity(frequency: &[Real]) -> Self {
        Self::constant(frequency, Complex64::new(1.0, 0.0))
    }

    /// Builds an FRD from magnitude (dB) and phase (degrees) arrays.
    pub fn from_magnitude_phase(
        frequency: Vec<Real>,
        magnitude_db: &[Real],
        phase_deg: &[Real],
    ) -> CoreResult<Self> {
        if magnitude_db.len() != phase_deg.len() {
            return Err(CoreError::LengthMismatch {
                what: "magnitude/phase",
                left: magnitude_db.len(),
                right: phase_deg.len(),
            });
        }
        let response = magnitude_db
            .iter()
            .zip(phase_deg)
            .map(|(db, deg)| Complex64::from_polar(10f64.powf(db / 20.0), deg.to_radians()))
            .collect();
        Self::new(frequency, response)
    }

    pub fn frequency(&self) -> &[Real] {
        &self.frequency
    }

    pub fn response(&self) -> &[Complex64] {
        &self.response
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Real>, Vec<Complex64>) {
        (self.frequency, self.response)
    }

    pub fn same_grid(&self, other: &Frd) -> bool {
        self.frequency == other.frequency
    }

    /// Same axis and every response within `tol`.
    pub fn approx_eq(&self, other: &Frd, tol: Tolerances) -> bool {
        self.same_grid(other)
            && self
                .response
                .iter()
                .zip(&other.response)
                .all(|(&a, &b)| complex_nearly_equal(a, b, tol))
    }

    pub fn magnitude(&self) -> Vec<Real> {
        self.response.iter().map(|c| c.norm()).collect()
    }

    pub fn magnitude_db(&self) -> Vec<Real> {
        self.response
            .iter()
            .map(|c| 20.0 * c.norm().log10())
            .collect()
    }

    /// Wrapped phase in degrees, (-180, 180].
    pub fn phase_deg(&self) -> Vec<Real> {
        self.response.iter().map(|c| c.arg().to_degrees()).collect()
    }

    /// Interpolates this curve onto `frequency` with a natural cubic spline
    /// on the real and imaginary parts.
    pub fn resample(&self, frequency: &[Real]) -> CoreResult<Frd> {
        if self.frequency == frequency {
            return Ok(self.clone());
        }
        let spline = ComplexSpline::natural(&self.frequency, &self.response)?;
        Ok(Frd {
            frequency: frequency.to_vec(),
            response: spline.eval_many(frequency),
        })
    }

    /// Applies `f` to every response value.
    pub fn map(&self, mut f: impl FnMut(Complex64) -> Complex64) -> Frd {
        Frd {
            frequency: self.frequency.clone(),
            response: self.response.iter().map(|&c| f(c)).collect(),
        }
    }

    pub fn recip(&self) -> Frd {
        self.map(|c| c.inv())
    }

    fn zip_with(
        &self,
        rhs: &Frd,
        what: &'static str,
        f: impl Fn(Complex64, Complex64) -> Complex64,
    ) -> CoreResult<Frd> {
        if !self.same_grid(rhs) {
            return Err(CoreError::GridMismatch { what });
        }
        Ok(Frd {
            frequency: self.frequency.clone(),
            response: self
                .response
                .iter()
                .zip(&rhs.response)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    pub fn checked_mul(&self, rhs: &Frd) -> CoreResult<Frd> {
        self.zip_with(rhs, "frd multiply", |a, b| a * b)
    }

    pub fn checked_add(&self, rhs: &Frd) -> CoreResult<Frd> {
        self.zip_with(rhs, "frd add", |a, b| a + b)
    }

    pub fn checked_sub(&self, rhs: &Frd) -> CoreResult<Frd> {
        self.zip_with(rhs, "frd subtract", |a, b| a - b)
    }

    pub fn checked_div(&self, rhs: &Frd) -> CoreResult<Frd> {
        self.zip_with(rhs, "frd divide", |a, b| a / b)
    }

    /// Product of several FRDs on one grid; unity if `items` is empty.
    pub fn product<'a>(
        frequency: &[Real],
        items: impl IntoIterator<Item = &'a Frd>,
    ) -> CoreResult<Frd> {
        items
            .into_iter()
            .try_fold(Frd::unity(frequency), |acc, item| acc.checked_mul(item))
    }
}

fn expect_same_grid(result: CoreResult<Frd>) -> Frd {
    match result {
        Ok(frd) => frd,
        Err(e) => panic!("{e}"),
    }
}

macro_rules! impl_frd_binop {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl $trait<&Frd> for &Frd {
            type Output = Frd;
            fn $method(self, rhs: &Frd) -> Frd {
                expect_same_grid(self.$checked(rhs))
            }
        }

        impl $trait<Frd> for Frd {
            type Output = Frd;
            fn $method(self, rhs: Frd) -> Frd {
                expect_same_grid(self.$checked(&rhs))
            }
        }

        impl $trait<&Frd> for Frd {
            type Output = Frd;
            fn $method(self, rhs: &Frd) -> Frd {
                expect_same_grid(self.$checked(rhs))
            }
        }

        impl $trait<Frd> for &Frd {
            type Output = Frd;
            fn $method(self, rhs: Frd) -> Frd {
                expect_same_grid(self.$checked(&rhs))
            }
        }
    };
}

impl_frd_binop!(Mul, mul, checked_mul);
impl_frd_binop!(Add, add, checked_add);
impl_frd_binop!(Sub, sub, checked_sub);
impl_frd_binop!(Div, div, checked_div);

macro_rules! impl_frd_scalar {
    ($scalar:ty) => {
        impl Mul<$scalar> for &Frd {
            type Output = Frd;
            fn mul(self, k: $scalar) -> Frd {
                self.map(|c| c * k)
            }
        }

        impl Mul<$scalar> for Frd {
            type Output = Frd;
            fn mul(self, k: $scalar) -> Frd {
                (&self) * k
            }
        }

        impl Mul<&Frd> for $scalar {
            type Output = Frd;
            fn mul(self, frd: &Frd) -> Frd {
                frd * self
            }
        }

        impl Add<$scalar> for &Frd {
            type Output = Frd;
            fn add(self, k: $scalar) -> Frd {
                self.map(|c| c + k)
            }
        }

        impl Add<$scalar> for Frd {
            type Output = Frd;
            fn add(self, k: $scalar) -> Frd {
                (&self) + k
            }
        }

        impl Add<&Frd> for $scalar {
            type Output = Frd;
            fn add(self, frd: &Frd) -> Frd {
                frd + self
            }
        }

        impl Div<&Frd> for $scalar {
            type Output = Frd;
            fn div(self, frd: &Frd) -> Frd {
                frd.map(|c| self / c)
            }
        }
    };
}

impl_frd_scalar!(Real);
impl_frd_scalar!(Complex64);

impl Neg for &Frd {
    type Output = Frd;
    fn neg(self) -> Frd {
        self.map(|c| -c)
    }
}

impl Neg for Frd {
    type Output = Frd;
    fn neg(self) -> Frd {
        -(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::linspace;

    fn ramp(grid: &[Real], k: Real) -> Frd {
        Frd::from_fn(grid, |w| Complex64::new(k * w, 1.0))
    }

    #[test]
    fn approx_eq_respects_axis_and_tolerance() {
        let g = linspace(1.0, 10.0, 10);
        let a = ramp(&g, 2.0);
        let nudged = a.map(|c| c * (1.0 + 1e-12));
        assert!(a.approx_eq(&nudged, Tolerances::default()));
        assert!(!a.approx_eq(&ramp(&g, 2.1), Tolerances::default()));
        let shifted = ramp(&linspace(1.0, 11.0, 10), 2.0);
        assert!(!a.approx_eq(&shifted, Tolerances::default()));
    }

    #[test]
    fn new_rejects_bad_input() {
        assert!(Frd::new(vec![1.0, 2.0], vec![Complex64::new(1.0, 0.0)]).is_err());
        assert!(Frd::new(vec![2.0, 1.0], vec![Complex64::new(1.0, 0.0); 2]).is_err());
    }

    #[test]
    fn pointwise_product_on_same_grid() {
        let g = linspace(1.0, 10.0, 10);
        let a = ramp(&g, 1.0);
        let b = ramp(&g, -2.0);
        let p = &a * &b;
        assert_eq!(p.frequency(), a.frequency());
        for i in 0..g.len() {
            assert_eq!(p.response()[i], a.response()[i] * b.response()[i]);
        }
    }

    #[test]
    fn checked_ops_reject_different_grids() {
        let a = ramp(&linspace(1.0, 10.0, 10), 1.0);
        let b = ramp(&linspace(1.0, 10.0, 11), 1.0);
        assert!(matches!(
            a.checked_mul(&b),
            Err(CoreError::GridMismatch { .. })
        ));
        assert!(a.checked_add(&b).is_err());
        assert!(a.checked_div(&b).is_err());
    }

    #[test]
    #[should_panic(expected = "Frequency grids differ")]
    fn operator_panics_on_different_grids() {
        let a = ramp(&linspace(1.0, 10.0, 10), 1.0);
        let b = ramp(&linspace(2.0, 10.0, 10), 1.0);
        let _ = &a + &b;
    }

    #[test]
    fn scalar_ops() {
        let g = linspace(1.0, 3.0, 3);
        let a = ramp(&g, 1.0);
        let s = 1.0 + &a;
        assert_eq!(s.response()[0], Complex64::new(2.0, 1.0));
        let r = 1.0 / &a;
        assert_eq!(r.response()[2], Complex64::new(3.0, 1.0).inv());
        let n = -(&a * 2.0);
        assert_eq!(n.response()[1], Complex64::new(-4.0, -2.0));
    }

    #[test]
    fn magnitude_phase_conversion() {
        let f = Frd::from_magnitude_phase(vec![1.0, 2.0], &[20.0, 0.0], &[90.0, -45.0]).unwrap();
        let mag = f.magnitude_db();
        let ph = f.phase_deg();
        assert!((mag[0] - 20.0).abs() < 1e-12);
        assert!((ph[0] - 90.0).abs() < 1e-12);
        assert!((mag[1]).abs() < 1e-12);
        assert!((ph[1] + 45.0).abs() < 1e-12);
        assert!((f.response()[0].im - 10.0).abs() < 1e-12);
    }

    #[test]
    fn resample_same_grid_is_identity() {
        let g = linspace(1.0, 10.0, 10);
        let a = ramp(&g, 1.5);
        assert_eq!(a.resample(&g).unwrap(), a);
    }

    #[test]
    fn resample_linear_curve_exactly() {
        let a = ramp(&linspace(1.0, 10.0, 10), 2.0);
        let g = linspace(2.0, 8.0, 25);
        let r = a.resample(&g).unwrap();
        for (w, c) in r.frequency().iter().zip(r.response()) {
            assert!((c.re - 2.0 * w).abs() < 1e-9);
            assert!((c.im - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn product_of_nothing_is_unity() {
        let g = linspace(1.0, 2.0, 4);
        let p = Frd::product(&g, []).unwrap();
        assert_eq!(p, Frd::unity(&g));
    }

    #[test]
    fn deserialize_revalidates() {
        let ok: Frd =
            serde_json::from_str(r#"{"frequency":[1.0,2.0],"response":[[1.0,0.0],[0.0,1.0]]}"#)
                .unwrap();
        assert_eq!(ok.len(), 2);
        let bad = serde_json::from_str::<Frd>(
            r#"{"frequency":[2.0,1.0],"response":[[1.0,0.0],[0.0,1.0]]}"#,
        );
        assert!(bad.is_err());
    }
}
