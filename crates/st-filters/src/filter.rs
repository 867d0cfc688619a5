//! Filter model: type, parameters, coefficients and sampling frequency.

use std::fmt;

use serde::{Deserialize, Serialize};
use st_core::tf::{freqz, quadratic_roots};
use st_core::{Complex64, Frd, Real, finite_or_zero};
use tracing::warn;

use crate::design::{FilterDesign, StandardDesign};
use crate::error::{FilterError, FilterResult};

/// Sampling frequency a filter starts with: the default drive frequency.
pub const DEFAULT_SAMPLING_FREQUENCY: Real = 20_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterType {
    #[default]
    Empty,
    LowPass,
    HighPass,
    LeadLag,
    Notch,
    Resonant,
    Custom,
}

impl FilterType {
    pub const ALL: [FilterType; 7] = [
        FilterType::Empty,
        FilterType::LowPass,
        FilterType::HighPass,
        FilterType::LeadLag,
        FilterType::Notch,
        FilterType::Resonant,
        FilterType::Custom,
    ];

    /// Names of the user-facing parameters, in order.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            FilterType::Empty => &[],
            FilterType::LowPass | FilterType::HighPass => &["Cutoff Frequency"],
            FilterType::LeadLag => &["Frequency", "Phase"],
            FilterType::Notch => &["Center Frequency", "Width", "Depth"],
            FilterType::Resonant => &["Center Frequency", "Width", "Gain"],
            FilterType::Custom => &["N0", "N1", "N2", "D1", "D2"],
        }
    }

    /// Units of the user-facing parameters, in order.
    pub fn parameter_units(self) -> &'static [Option<&'static str>] {
        match self {
            FilterType::Empty => &[],
            FilterType::LowPass | FilterType::HighPass => &[Some("Hz")],
            FilterType::LeadLag => &[Some("Hz"), Some("deg")],
            FilterType::Notch | FilterType::Resonant => &[Some("Hz"), Some("Hz"), Some("dB")],
            FilterType::Custom => &[None; 5],
        }
    }

    pub fn arity(self) -> usize {
        self.parameter_names().len()
    }

    pub fn default_parameters(self) -> Vec<Real> {
        match self {
            FilterType::Empty => vec![],
            FilterType::LowPass | FilterType::HighPass => vec![1000.0],
            FilterType::LeadLag => vec![1000.0, 50.0],
            FilterType::Notch | FilterType::Resonant => vec![1000.0, 50.0, 20.0],
            FilterType::Custom => Coefficients::UNITY.to_vec(),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterType::Empty => "Empty",
            FilterType::LowPass => "Low Pass",
            FilterType::HighPass => "High Pass",
            FilterType::LeadLag => "Lead Lag",
            FilterType::Notch => "Notch",
            FilterType::Resonant => "Resonant",
            FilterType::Custom => "Custom",
        };
        f.write_str(name)
    }
}

/// Biquad coefficients of `(N0 + N1 z⁻¹ + N2 z⁻²) / (1 + D1 z⁻¹ + D2 z⁻²)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub n0: Real,
    pub n1: Real,
    pub n2: Real,
    pub d1: Real,
    pub d2: Real,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::UNITY
    }
}

impl Coefficients {
    /// Pass-through section.
    pub const UNITY: Coefficients = Coefficients {
        n0: 1.0,
        n1: 0.0,
        n2: 0.0,
        d1: 0.0,
        d2: 0.0,
    };

    pub fn from_slice(c: &[Real]) -> Option<Self> {
        match *c {
            [n0, n1, n2, d1, d2] => Some(Self { n0, n1, n2, d1, d2 }),
            _ => None,
        }
    }

    pub fn to_vec(self) -> Vec<Real> {
        vec![self.n0, self.n1, self.n2, self.d1, self.d2]
    }

    pub fn numerator(&self) -> [Real; 3] {
        [self.n0, self.n1, self.n2]
    }

    pub fn denominator(&self) -> [Real; 3] {
        [1.0, self.d1, self.d2]
    }

    fn sanitized(self) -> Self {
        Self {
            n0: finite_or_zero(self.n0),
            n1: finite_or_zero(self.n1),
            n2: finite_or_zero(self.n2),
            d1: finite_or_zero(self.d1),
            d2: finite_or_zero(self.d2),
        }
    }
}

/// Second-order digital filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FilterConfig", into = "FilterConfig")]
pub struct Filter {
    filter_type: FilterType,
    parameters: Vec<Real>,
    coefficients: Coefficients,
    sampling_frequency: Real,
}

/// Serialized form of a [`Filter`]; coefficients are re-derived on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(rename = "type", default)]
    pub filter_type: FilterType,
    #[serde(default)]
    pub parameters: Option<Vec<Real>>,
    #[serde(default = "default_sampling_frequency")]
    pub sampling_frequency: Real,
}

fn default_sampling_frequency() -> Real {
    DEFAULT_SAMPLING_FREQUENCY
}

impl TryFrom<FilterConfig> for Filter {
    type Error = FilterError;

    fn try_from(cfg: FilterConfig) -> FilterResult<Self> {
        let mut filter = Filter::new(cfg.filter_type);
        filter.set_sampling_frequency(cfg.sampling_frequency)?;
        if let Some(p) = cfg.parameters {
            filter.set_parameters(p)?;
        }
        Ok(filter)
    }
}

impl From<Filter> for FilterConfig {
    fn from(f: Filter) -> Self {
        Self {
            filter_type: f.filter_type,
            parameters: Some(f.parameters),
            sampling_frequency: f.sampling_frequency,
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::empty()
    }
}

impl Filter {
    pub fn empty() -> Self {
        Self {
            filter_type: FilterType::Empty,
            parameters: Vec::new(),
            coefficients: Coefficients::UNITY,
            sampling_frequency: DEFAULT_SAMPLING_FREQUENCY,
        }
    }

    /// A filter of type `t` with that type's default parameters.
    pub fn new(t: FilterType) -> Self {
        let mut filter = Self::empty();
        filter.set_filter_type(t);
        filter
    }

    pub fn with_parameters(t: FilterType, parameters: Vec<Real>) -> FilterResult<Self> {
        let mut filter = Self::new(t);
        filter.set_parameters(parameters)?;
        Ok(filter)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn parameters(&self) -> &[Real] {
        &self.parameters
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn sampling_frequency(&self) -> Real {
        self.sampling_frequency
    }

    pub fn is_empty(&self) -> bool {
        self.filter_type == FilterType::Empty
    }

    pub fn set_filter_type(&mut self, t: FilterType) {
        self.set_filter_type_with(t, &StandardDesign);
    }

    /// Switches type and resets the parameters to that type's defaults.
    pub fn set_filter_type_with(&mut self, t: FilterType, design: &impl FilterDesign) {
        self.filter_type = t;
        self.parameters = t.default_parameters();
        self.forward(design);
    }

    pub fn set_parameters(&mut self, parameters: Vec<Real>) -> FilterResult<()> {
        self.set_parameters_with(parameters, &StandardDesign)
    }

    /// Replaces the parameters and forward-calculates coefficients. On an
    /// arity mismatch nothing changes.
    pub fn set_parameters_with(
        &mut self,
        parameters: Vec<Real>,
        design: &impl FilterDesign,
    ) -> FilterResult<()> {
        let expected = self.filter_type.arity();
        if parameters.len() != expected {
            return Err(FilterError::ParameterCount {
                filter_type: self.filter_type,
                expected,
                got: parameters.len(),
            });
        }
        self.parameters = parameters;
        self.forward(design);
        Ok(())
    }

    pub fn set_sampling_frequency(&mut self, fs: Real) -> FilterResult<()> {
        self.set_sampling_frequency_with(fs, &StandardDesign)
    }

    /// Changes the sample rate while keeping the physical design: parameters
    /// are re-derived from the current coefficients at the old rate, then the
    /// coefficients are re-derived from those parameters at the new rate.
    pub fn set_sampling_frequency_with(
        &mut self,
        fs: Real,
        design: &impl FilterDesign,
    ) -> FilterResult<()> {
        if !(fs.is_finite() && fs > 0.0) {
            return Err(FilterError::InvalidSamplingFrequency { value: fs });
        }
        self.backward(design);
        self.sampling_frequency = fs;
        self.forward(design);
        Ok(())
    }

    pub fn set_coefficients(&mut self, coefficients: Coefficients) {
        self.set_coefficients_with(coefficients, &StandardDesign);
    }

    /// Import path: takes raw coefficients and backward-calculates the
    /// parameters for the current type.
    pub fn set_coefficients_with(&mut self, coefficients: Coefficients, design: &impl FilterDesign) {
        self.coefficients = coefficients.sanitized();
        self.backward(design);
    }

    /// Roots of the numerator in the z-plane.
    pub fn zeros(&self) -> Vec<Complex64> {
        let [a, b, c] = self.coefficients.numerator();
        quadratic_roots(a, b, c)
    }

    /// Roots of the denominator in the z-plane.
    pub fn poles(&self) -> Vec<Complex64> {
        let [a, b, c] = self.coefficients.denominator();
        quadratic_roots(a, b, c)
    }

    pub fn gain(&self) -> Real {
        1.0
    }

    pub fn evaluate(&self, omega: &[Real]) -> Frd {
        freqz(
            &self.coefficients.numerator(),
            &self.coefficients.denominator(),
            omega,
            self.sampling_frequency,
        )
    }

    fn forward(&mut self, design: &impl FilterDesign) {
        match design.forward(self.filter_type, &self.parameters, self.sampling_frequency) {
            Ok(c) => self.coefficients = c.sanitized(),
            Err(e) => {
                warn!(error = %e, parameters = ?self.parameters, "filter design failed, using pass-through");
                self.coefficients = Coefficients::UNITY;
            }
        }
    }

    fn backward(&mut self, design: &impl FilterDesign) {
        match design.backward(self.filter_type, &self.coefficients, self.sampling_frequency) {
            Ok(p) => self.parameters = p.into_iter().map(finite_or_zero).collect(),
            Err(e) => {
                warn!(error = %e, "filter parameters could not be recovered, resetting");
                self.parameters = vec![0.0; self.filter_type.arity()];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_filter_is_empty_pass_through() {
        let f = Filter::default();
        assert!(f.is_empty());
        assert!(f.parameters().is_empty());
        assert_eq!(f.coefficients(), Coefficients::UNITY);
        let r = f.evaluate(&[10.0, 1000.0]);
        assert!(r.response().iter().all(|c| (c - Complex64::new(1.0, 0.0)).norm() < 1e-15));
    }

    #[test]
    fn set_type_loads_defaults() {
        let mut f = Filter::empty();
        f.set_filter_type(FilterType::LowPass);
        assert_eq!(f.parameters(), &[1000.0]);
        f.set_filter_type(FilterType::Notch);
        assert_eq!(f.parameters(), &[1000.0, 50.0, 20.0]);
        assert_ne!(f.coefficients(), Coefficients::UNITY);
    }

    #[test]
    fn wrong_arity_keeps_previous_state() {
        let mut f = Filter::new(FilterType::Notch);
        let before = f.clone();
        let err = f.set_parameters(vec![500.0]).unwrap_err();
        assert_eq!(
            err,
            FilterError::ParameterCount {
                filter_type: FilterType::Notch,
                expected: 3,
                got: 1
            }
        );
        assert_eq!(f, before);
    }

    #[test]
    fn zero_sampling_frequency_rejected() {
        let mut f = Filter::new(FilterType::LowPass);
        let before = f.clone();
        assert!(matches!(
            f.set_sampling_frequency(0.0),
            Err(FilterError::InvalidSamplingFrequency { .. })
        ));
        assert_eq!(f, before);
    }

    #[test]
    fn sampling_change_keeps_physical_design() {
        let mut f = Filter::with_parameters(FilterType::Notch, vec![800.0, 40.0, 25.0]).unwrap();
        f.set_sampling_frequency(8000.0).unwrap();
        let p = f.parameters();
        assert!((p[0] - 800.0).abs() < 1e-6);
        assert!((p[1] - 40.0).abs() < 1e-6);
        assert!((p[2] - 25.0).abs() < 1e-6);
        assert_eq!(f.sampling_frequency(), 8000.0);
    }

    #[test]
    fn notch_attenuates_at_center() {
        let f = Filter::with_parameters(FilterType::Notch, vec![1000.0, 50.0, 20.0]).unwrap();
        let w = 2.0 * std::f64::consts::PI * 1000.0;
        let mag = f.evaluate(&[w]).magnitude_db()[0];
        assert!((mag + 20.0).abs() < 0.5, "depth {mag}");
    }

    #[test]
    fn low_pass_has_unity_dc_gain() {
        let f = Filter::new(FilterType::LowPass);
        let r = f.evaluate(&[1e-3]).response()[0];
        assert!((r.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_design_falls_back_to_unity() {
        let mut f = Filter::new(FilterType::LowPass);
        f.set_parameters(vec![-5.0]).unwrap();
        assert_eq!(f.coefficients(), Coefficients::UNITY);
    }

    #[test]
    fn custom_parameters_are_coefficients() {
        let f = Filter::with_parameters(FilterType::Custom, vec![0.5, 0.25, 0.0, -0.2, 0.0]).unwrap();
        assert_eq!(
            f.coefficients(),
            Coefficients {
                n0: 0.5,
                n1: 0.25,
                n2: 0.0,
                d1: -0.2,
                d2: 0.0
            }
        );
        // 0.5 z² + 0.25 z has roots at 0 and -0.5
        let zeros = f.zeros();
        assert_eq!(zeros.len(), 2);
        assert!(zeros.iter().any(|z| z.norm() < 1e-12));
        assert!(zeros.iter().any(|z| (z.re + 0.5).abs() < 1e-12));
    }

    #[test]
    fn imported_coefficients_recover_parameters() {
        let reference = Filter::with_parameters(FilterType::LowPass, vec![1500.0]).unwrap();
        let mut f = Filter::new(FilterType::LowPass);
        f.set_coefficients(reference.coefficients());
        assert!((f.parameters()[0] - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn poles_of_low_pass_inside_unit_circle() {
        let f = Filter::new(FilterType::LowPass);
        assert_eq!(f.poles().len(), 2);
        assert!(f.poles().iter().all(|p| p.norm() < 1.0));
        assert_eq!(f.gain(), 1.0);
    }
}
