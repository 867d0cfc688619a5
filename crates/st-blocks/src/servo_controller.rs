//! Servo (position/velocity) controller.
//!
//! The controller response is composed of several parts:
//!
//! - two parallel position-feedback paths ("input 0" and "input 1") whose
//!   sum, delayed by one sample, is the PID response;
//! - a bank of servo filters applied in series;
//! - optional Enhanced Tracking Control (ETC), which adds a feedback/forward
//!   path pair either before or after the servo filters.
//!
//! The feedforward path (position through snap terms plus an advance) is
//! computed separately because it enters the closed loop on its own.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use st_core::tf::{TransferFunction, freqz, quadratic_roots, unit_delay, zpk_response};
use st_core::{Complex64, Frd, Real, TWO_PI};
use st_filters::Filter;
use tracing::warn;

use crate::error::{BlockError, BlockResult};
use crate::kind::BlockKind;
use crate::node::{ControlBlock, EvalContext, finite_or_unity};
use crate::property::{PropertyDescriptor, PropertyKind, PropertyValue, non_zero, positive, resolve};

pub const SERVO_FILTER_COUNT: usize = 16;
pub const FEEDFORWARD_FILTER_COUNT: usize = 4;

/// Longest feedforward advance modelled, in drive samples.
pub const MAX_ADVANCE_SAMPLES: Real = 4096.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DriveType {
    #[default]
    Servo,
    Piezo,
    Galvo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EtcSetup {
    #[default]
    Disabled,
    EnabledBeforeFilters,
    EnabledAfterFilters,
}

impl EtcSetup {
    /// Value of the drive's ETC setup register.
    pub fn register_value(self) -> u32 {
        match self {
            EtcSetup::Disabled => 0x0,
            EtcSetup::EnabledBeforeFilters => 0x3,
            EtcSetup::EnabledAfterFilters => 0x1,
        }
    }

    pub fn from_register_value(v: u32) -> Option<Self> {
        match v {
            0x0 => Some(EtcSetup::Disabled),
            0x3 => Some(EtcSetup::EnabledBeforeFilters),
            0x1 => Some(EtcSetup::EnabledAfterFilters),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EtcSetup::Disabled => "Disabled",
            EtcSetup::EnabledBeforeFilters => "Enabled (Before Servo Filters)",
            EtcSetup::EnabledAfterFilters => "Enabled (After Servo Filters)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedTrackingControl {
    pub setup: EtcSetup,
    pub bandwidth: Real,
    pub scale: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoProperties {
    pub drive_type: DriveType,

    pub k: Real,
    pub kip: Real,
    pub kip2: Real,
    pub kiv: Real,
    pub kpv: Real,
    pub kv: Real,
    pub ksi1: Real,
    pub ksi2: Real,

    pub servo_filters: Vec<Filter>,
    /// Must not be zero.
    pub servo_gain_normalization: Real,

    pub etc: EnhancedTrackingControl,

    pub pff: Real,
    pub vff: Real,
    pub aff: Real,
    pub jff: Real,
    pub sff: Real,
    pub feedforward_advance_ms: Real,
    pub feedforward_filters: Vec<Filter>,
    /// Must not be zero.
    pub feedforward_gain_normalization: Real,

    /// Stored for the drive configuration only.
    pub is_dual_loop: bool,
    /// Blend between the two position-feedback inputs, 0..=1.
    pub alpha: Real,

    pub drive_frequency_hz: Real,
    pub counts_per_unit: Real,
}

impl Default for ServoProperties {
    fn default() -> Self {
        Self {
            drive_type: DriveType::Servo,
            k: 1.0,
            kip: 1.0,
            kip2: 0.0,
            kiv: 1.0,
            kpv: 0.0,
            kv: 1.0,
            ksi1: 0.0,
            ksi2: 0.0,
            servo_filters: vec![Filter::empty(); SERVO_FILTER_COUNT],
            servo_gain_normalization: 1.0,
            etc: EnhancedTrackingControl::default(),
            pff: 0.0,
            vff: 0.0,
            aff: 53.5,
            jff: 0.0,
            sff: 0.0,
            feedforward_advance_ms: 0.25,
            feedforward_filters: vec![Filter::empty(); FEEDFORWARD_FILTER_COUNT],
            feedforward_gain_normalization: 1.0,
            is_dual_loop: false,
            alpha: 0.0,
            drive_frequency_hz: 20_000.0,
            counts_per_unit: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServoController {
    pub properties: ServoProperties,
    #[serde(skip)]
    last: Option<Frd>,
}

/// Zero/pole/gain triple of one position-feedback path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathZpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: Real,
}

impl PathZpk {
    fn response(&self, omega: &[Real]) -> Frd {
        zpk_response(&self.zeros, &self.poles, self.gain, omega)
    }
}

impl ServoController {
    const DESCRIPTORS: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("Drive Type", PropertyKind::Enum),
        PropertyDescriptor::new("K", PropertyKind::Float),
        PropertyDescriptor::new("Kip", PropertyKind::Float),
        PropertyDescriptor::new("Kip2", PropertyKind::Float),
        PropertyDescriptor::new("Kiv", PropertyKind::Float),
        PropertyDescriptor::new("Kpv", PropertyKind::Float),
        PropertyDescriptor::new("Kv", PropertyKind::Float),
        PropertyDescriptor::new("Ksi1", PropertyKind::Float),
        PropertyDescriptor::new("Ksi2", PropertyKind::Float),
        PropertyDescriptor::new("Servo Filters", PropertyKind::Filters),
        PropertyDescriptor::new("Servo Loop Gain Normalization Factor", PropertyKind::Float),
        PropertyDescriptor::new("Enhanced Tracking Control", PropertyKind::Etc),
        PropertyDescriptor::new("Pff", PropertyKind::Float),
        PropertyDescriptor::new("Vff", PropertyKind::Float),
        PropertyDescriptor::new("Aff", PropertyKind::Float),
        PropertyDescriptor::new("Jff", PropertyKind::Float),
        PropertyDescriptor::new("Sff", PropertyKind::Float),
        PropertyDescriptor::float("Feedforward Advance", "ms"),
        PropertyDescriptor::new("Feedforward Filters", PropertyKind::Filters),
        PropertyDescriptor::new("Feedforward Gain Normalization Factor", PropertyKind::Float),
        PropertyDescriptor::new("Is Dual Loop", PropertyKind::Bool),
        PropertyDescriptor::new("Alpha", PropertyKind::Float),
        PropertyDescriptor::float("Drive Frequency", "Hz"),
        PropertyDescriptor::new("Counts Per Unit", PropertyKind::Float),
    ];

    pub fn drive_frequency_hz(&self) -> Real {
        self.properties.drive_frequency_hz
    }

    fn servo_normalization(&self) -> Real {
        match self.properties.servo_gain_normalization {
            n if n != 0.0 && n.is_finite() => n,
            n => {
                warn!(value = n, "servo gain normalization factor is zero, using 1");
                1.0
            }
        }
    }

    fn feedforward_normalization(&self) -> Real {
        match self.properties.feedforward_gain_normalization {
            n if n != 0.0 && n.is_finite() => n,
            n => {
                warn!(value = n, "feedforward gain normalization factor is zero, using 1");
                1.0
            }
        }
    }

    /// Servo over feedforward normalization.
    fn scale_ratio(&self) -> Real {
        self.servo_normalization() / self.feedforward_normalization()
    }

    fn ksi_zeros_and_poles(&self, zeros: &mut Vec<Complex64>, poles: &mut Vec<Complex64>) {
        for ksi in [self.properties.ksi1, self.properties.ksi2] {
            if ksi != 0.0 {
                zeros.push(Complex64::new(-TWO_PI * ksi, 0.0));
                poles.push(Complex64::new(0.0, 0.0));
            }
        }
    }

    /// Position feedback input 0: the PI/PID path weighted by `alpha`.
    pub fn input0(&self) -> PathZpk {
        let p = &self.properties;
        let norm = self.servo_normalization();
        let a = p.kpv * p.alpha / norm;
        let b = TWO_PI * (p.kiv * p.alpha + p.kip * p.kpv) / norm;
        let c = (1000.0 * p.kip2 + TWO_PI * TWO_PI * p.kip * p.kiv) / norm;

        let mut zeros = quadratic_roots(a, b, c);
        let mut poles = vec![Complex64::new(0.0, 0.0)];
        self.ksi_zeros_and_poles(&mut zeros, &mut poles);

        let gain = if p.kpv != 0.0 && p.alpha != 0.0 {
            p.kpv * p.alpha
        } else if (p.kiv != 0.0 && p.alpha != 0.0) || (p.kip != 0.0 && p.kpv != 0.0) {
            TWO_PI * (p.kiv * p.alpha + p.kip * p.kpv)
        } else if p.kip2 != 0.0 || (p.kip != 0.0 && p.kiv != 0.0) {
            1000.0 * p.kip2 + 4.0 * PI * PI * p.kip * p.kiv
        } else {
            0.0
        };

        PathZpk {
            zeros,
            poles,
            gain: gain * p.k,
        }
    }

    /// Position feedback input 1: the velocity path weighted by `1 - alpha`.
    pub fn input1(&self) -> PathZpk {
        let p = &self.properties;
        let mut zeros = quadratic_roots(0.0, p.kpv, TWO_PI * p.kiv);
        let mut poles = Vec::new();
        self.ksi_zeros_and_poles(&mut zeros, &mut poles);

        let mut gain = if p.kpv != 0.0 {
            p.kpv
        } else if p.kiv != 0.0 {
            TWO_PI * p.kiv
        } else {
            0.0
        };
        gain *= p.k * (1.0 - p.alpha);
        if p.kv != 0.0 {
            gain /= p.kv;
        }

        PathZpk { zeros, poles, gain }
    }

    /// Sum of both position-feedback paths, delayed one sample.
    pub fn pid_response(&self, omega: &[Real]) -> Frd {
        let fs = self.properties.drive_frequency_hz;
        let paths = &self.input0().response(omega) + &self.input1().response(omega);
        paths * unit_delay(omega, fs)
    }

    /// Keeps every non-empty filter in `bank` at the drive rate.
    fn sync_filter_rates(bank: &mut [Filter], fs: Real) {
        for filter in bank.iter_mut().filter(|f| !f.is_empty()) {
            if filter.sampling_frequency() != fs
                && let Err(e) = filter.set_sampling_frequency(fs)
            {
                warn!(error = %e, "filter kept its previous sampling frequency");
            }
        }
    }

    fn bank_response(bank: &[Filter], omega: &[Real]) -> Frd {
        bank.iter()
            .filter(|f| !f.is_empty())
            .fold(Frd::unity(omega), |acc, f| acc * f.evaluate(omega))
    }

    /// Product of the non-empty servo filters.
    pub fn servo_filters_response(&mut self, omega: &[Real]) -> Frd {
        let fs = self.properties.drive_frequency_hz;
        Self::sync_filter_rates(&mut self.properties.servo_filters, fs);
        Self::bank_response(&self.properties.servo_filters, omega)
    }

    /// Pure advance of `samples` (possibly fractional) drive samples:
    /// `z^n · ((1 − f) + f·z⁻¹)` with `n = ⌈samples⌉`, `f = n − samples`.
    fn advance_response(omega: &[Real], samples: Real, fs: Real) -> Frd {
        if !samples.is_finite() || samples > MAX_ADVANCE_SAMPLES {
            warn!(samples, "feedforward advance out of range, using none");
            return Frd::unity(omega);
        }
        let samples = if samples >= 0.0 {
            samples
        } else {
            warn!(samples, "negative feedforward advance, using none");
            0.0
        };
        let n = samples.ceil();
        let fraction = n - samples;
        let len = n as usize + 1;
        let mut num = vec![0.0; len];
        let mut den = vec![0.0; len];
        num[0] = 1.0;
        den[len - 1] = 1.0;
        freqz(&num, &den, omega, fs) * freqz(&[1.0 - fraction, fraction], &[1.0, 0.0], omega, fs)
    }

    /// Feedforward path including its filter bank.
    pub fn feedforward_response(&mut self, omega: &[Real]) -> Frd {
        let p = &self.properties;
        let fs = p.drive_frequency_hz;
        let ratio = self.scale_ratio();
        let pff = p.pff * ratio;
        let vff = p.vff * fs * ratio;
        let aff = p.aff * fs.powi(2) * ratio;
        let jff = p.jff * fs.powi(3) * ratio;
        let sff = p.sff * fs.powi(4) * ratio;
        let centred = [0.0, 0.0, 1.0, 0.0, 0.0];
        let advance_samples = p.feedforward_advance_ms / 1000.0 * fs;

        let derivative_terms = match p.drive_type {
            DriveType::Galvo => {
                let kernels = [
                    [-1.0 / 12.0, 2.0 / 3.0, 0.0, -2.0 / 3.0, 1.0 / 12.0].map(|c| c * vff),
                    [-1.0 / 12.0, 4.0 / 3.0, -5.0 / 2.0, 4.0 / 3.0, -1.0 / 12.0].map(|c| c * aff),
                    [0.5, -1.0, 0.0, 1.0, -0.5].map(|c| c * jff),
                    [1.0, -4.0, 6.0, -4.0, 1.0].map(|c| c * sff),
                ];
                let sum = kernels
                    .iter()
                    .map(|b| freqz(b, &centred, omega, fs))
                    .fold(Frd::constant(omega, Complex64::new(0.0, 0.0)), |acc, f| acc + f);
                let smoothing = freqz(&[0.25, 0.5, 0.25], &[0.0, 1.0, 0.0], omega, fs);
                sum * smoothing * Self::advance_response(omega, advance_samples, fs)
            }
            DriveType::Servo | DriveType::Piezo => {
                let velocity = freqz(&[vff, -vff, 0.0], &centred, omega, fs);
                let acceleration = freqz(&[aff, -2.0 * aff, aff], &centred, omega, fs);
                let sum = (velocity + acceleration) + pff;
                sum * Self::advance_response(omega, advance_samples + 0.5, fs)
            }
        };

        Self::sync_filter_rates(&mut self.properties.feedforward_filters, fs);
        let response =
            derivative_terms * Self::bank_response(&self.properties.feedforward_filters, omega);
        finite_or_unity(self.kind(), response, "non-finite feedforward response")
    }

    /// ETC (feedback path, forward path).
    pub fn etc_responses(&self, omega: &[Real]) -> (Frd, Frd) {
        let p = &self.properties;
        let fs = p.drive_frequency_hz;
        let ts = 1.0 / fs;
        let g = TWO_PI * ts * p.etc.bandwidth;
        let tf = |num: Vec<Real>, den: Vec<Real>| TransferFunction::discrete(num, den, ts).response(omega);

        let accumulator = tf(vec![g, 0.0, 0.0], vec![1.0, -1.0, 0.0]);
        let (feedback, delay) = match p.drive_type {
            DriveType::Piezo => {
                let fg = p.etc.scale / p.counts_per_unit * g;
                let filter = tf(vec![fg, -fg, 0.0], vec![1.0, -(2.0 - g), 1.0 - g]);
                (filter, tf(vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 0.0]))
            }
            DriveType::Servo | DriveType::Galvo => {
                let fg = g * p.etc.scale * fs * fs * self.scale_ratio();
                let filter = tf(vec![fg, -fg, 0.0], vec![1.0, -1.0, g]);
                let backward_difference = tf(vec![1.0, -1.0, 0.0], vec![1.0, 0.0, 0.0]);
                (filter * backward_difference, tf(vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 0.0]))
            }
        };
        let forward = delay * accumulator + 1.0;
        (feedback, forward)
    }

    /// Full controller: PID, servo filters and ETC composed per the setup.
    pub fn controller_response(&mut self, omega: &[Real]) -> Frd {
        let pid = self.pid_response(omega);
        let filters = self.servo_filters_response(omega);
        match self.properties.etc.setup {
            EtcSetup::Disabled => pid * filters,
            EtcSetup::EnabledBeforeFilters => {
                let (feedback, forward) = self.etc_responses(omega);
                (pid + feedback) * forward * filters
            }
            EtcSetup::EnabledAfterFilters => {
                let (feedback, forward) = self.etc_responses(omega);
                (pid * filters + feedback) * forward
            }
        }
    }

    fn set_bank(
        bank: &mut Vec<Filter>,
        name: &'static str,
        capacity: usize,
        mut filters: Vec<Filter>,
    ) -> BlockResult<()> {
        if filters.len() > capacity {
            return Err(BlockError::InvalidValue {
                name,
                what: "more filters than the bank holds",
            });
        }
        filters.resize(capacity, Filter::empty());
        *bank = filters;
        Ok(())
    }
}

impl ControlBlock for ServoController {
    fn kind(&self) -> BlockKind {
        BlockKind::ServoController
    }

    /// Input-0 zeros, meaningful only when `alpha == 1`.
    fn zeros(&self) -> Option<Vec<Complex64>> {
        (self.properties.alpha == 1.0).then(|| self.input0().zeros)
    }

    /// Input-0 poles, meaningful only when `alpha == 1`.
    fn poles(&self) -> Option<Vec<Complex64>> {
        (self.properties.alpha == 1.0).then(|| self.input0().poles)
    }

    /// Input-0 gain when `alpha == 1`, otherwise 1.
    fn gain(&self) -> Real {
        if self.properties.alpha == 1.0 {
            self.input0().gain
        } else {
            1.0
        }
    }

    fn compute(&mut self, ctx: &EvalContext<'_>) -> Frd {
        let response = self.controller_response(ctx.omega);
        finite_or_unity(self.kind(), response, "non-finite controller response")
    }

    fn cache_mut(&mut self) -> &mut Option<Frd> {
        &mut self.last
    }

    fn last_response(&self) -> Option<&Frd> {
        self.last.as_ref()
    }

    fn descriptors(&self) -> &'static [PropertyDescriptor] {
        Self::DESCRIPTORS
    }

    fn property(&self, name: &str) -> BlockResult<PropertyValue> {
        let p = &self.properties;
        Ok(match resolve(Self::DESCRIPTORS, self.name(), name)? {
            "Drive Type" => PropertyValue::Drive(p.drive_type),
            "Servo Filters" => PropertyValue::Filters(p.servo_filters.clone()),
            "Feedforward Filters" => PropertyValue::Filters(p.feedforward_filters.clone()),
            "Enhanced Tracking Control" => PropertyValue::Etc(p.etc.clone()),
            "Is Dual Loop" => PropertyValue::Bool(p.is_dual_loop),
            other => PropertyValue::Float(match other {
                "K" => p.k,
                "Kip" => p.kip,
                "Kip2" => p.kip2,
                "Kiv" => p.kiv,
                "Kpv" => p.kpv,
                "Kv" => p.kv,
                "Ksi1" => p.ksi1,
                "Ksi2" => p.ksi2,
                "Servo Loop Gain Normalization Factor" => p.servo_gain_normalization,
                "Pff" => p.pff,
                "Vff" => p.vff,
                "Aff" => p.aff,
                "Jff" => p.jff,
                "Sff" => p.sff,
                "Feedforward Advance" => p.feedforward_advance_ms,
                "Feedforward Gain Normalization Factor" => p.feedforward_gain_normalization,
                "Alpha" => p.alpha,
                "Drive Frequency" => p.drive_frequency_hz,
                _ => p.counts_per_unit,
            }),
        })
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
        let p = &mut self.properties;
        let name = resolve(Self::DESCRIPTORS, BlockKind::ServoController.name(), name)?;
        match name {
            "Drive Type" => p.drive_type = value.into_drive(name)?,
            "Servo Filters" => Self::set_bank(
                &mut p.servo_filters,
                name,
                SERVO_FILTER_COUNT,
                value.into_filters(name)?,
            )?,
            "Feedforward Filters" => Self::set_bank(
                &mut p.feedforward_filters,
                name,
                FEEDFORWARD_FILTER_COUNT,
                value.into_filters(name)?,
            )?,
            "Enhanced Tracking Control" => p.etc = value.into_etc(name)?,
            "Is Dual Loop" => p.is_dual_loop = value.into_bool(name)?,
            _ => {
                let v = value.into_float(name)?;
                match name {
                    "K" => p.k = v,
                    "Kip" => p.kip = v,
                    "Kip2" => p.kip2 = v,
                    "Kiv" => p.kiv = v,
                    "Kpv" => p.kpv = v,
                    "Kv" => p.kv = v,
                    "Ksi1" => p.ksi1 = v,
                    "Ksi2" => p.ksi2 = v,
                    "Servo Loop Gain Normalization Factor" => {
                        p.servo_gain_normalization = non_zero(name, v)?
                    }
                    "Pff" => p.pff = v,
                    "Vff" => p.vff = v,
                    "Aff" => p.aff = v,
                    "Jff" => p.jff = v,
                    "Sff" => p.sff = v,
                    "Feedforward Advance" => p.feedforward_advance_ms = v,
                    "Feedforward Gain Normalization Factor" => {
                        p.feedforward_gain_normalization = non_zero(name, v)?
                    }
                    "Alpha" => {
                        if !(0.0..=1.0).contains(&v) {
                            return Err(BlockError::InvalidValue {
                                name,
                                what: "must lie in [0, 1]",
                            });
                        }
                        p.alpha = v;
                    }
                    "Drive Frequency" => p.drive_frequency_hz = positive(name, v)?,
                    _ => p.counts_per_unit = non_zero(name, v)?,
                }
            }
        }
        Ok(())
    }
}
