//! Digital current-loop controller.
//!
//! A discrete PI running at the servo drive rate, with the drive's fixed
//! 1/32768 output scaling, plus an R/L voltage feedforward normalised by the
//! bus voltage.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use st_core::tf::TransferFunction;
use st_core::{Complex64, Frd, Real, TWO_PI};

use crate::error::BlockResult;
use crate::kind::BlockKind;
use crate::node::{ControlBlock, EvalContext, unity_fallback};
use crate::property::{PropertyDescriptor, PropertyKind, PropertyValue, resolve};

/// Fixed-point scaling applied by the drive to the current-loop output.
pub const CURRENT_LOOP_SCALE: Real = 32768.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentLoopProperties {
    pub k: Real,
    pub ki: Real,
    pub bus_voltage_v: Real,
    pub lff_mh: Real,
    pub rff_ohm: Real,
}

impl Default for CurrentLoopProperties {
    fn default() -> Self {
        Self {
            k: 1.0,
            ki: 1.0,
            bus_voltage_v: 39.9,
            lff_mh: 1.0,
            rff_ohm: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigitalCurrentLoop {
    pub properties: CurrentLoopProperties,
    #[serde(skip)]
    last: Option<Frd>,
}

impl DigitalCurrentLoop {
    const DESCRIPTORS: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new("K", PropertyKind::Float),
        PropertyDescriptor::new("Ki", PropertyKind::Float),
        PropertyDescriptor::float("Bus Voltage", "V"),
        PropertyDescriptor::float("Lff", "mH"),
        PropertyDescriptor::float("Rff", "ohm"),
    ];

    /// `(1 + Ki·2π/(2fs) · (z+1)/(z−1)) · K/32768` at drive rate `fs`.
    pub fn controller_response(&self, omega: &[Real], fs: Real) -> Frd {
        if !(fs.is_finite() && fs > 0.0) {
            return unity_fallback(self.kind(), omega, "drive frequency must be positive");
        }
        let p = &self.properties;
        let g = PI * p.ki / fs;
        let k = p.k / CURRENT_LOOP_SCALE;
        TransferFunction::discrete(vec![(1.0 + g) * k, (g - 1.0) * k], vec![1.0, -1.0], 1.0 / fs)
            .response(omega)
    }

    /// `((z−1)/z · fs·Lff + Rff) / 2 / (Vbus/2)`.
    pub fn feedforward_response(&self, omega: &[Real], fs: Real) -> Frd {
        let p = &self.properties;
        if p.bus_voltage_v == 0.0 || !p.bus_voltage_v.is_finite() {
            return unity_fallback(self.kind(), omega, "zero bus voltage");
        }
        if !(fs.is_finite() && fs > 0.0) {
            return unity_fallback(self.kind(), omega, "drive frequency must be positive");
        }
        let a = fs * p.lff_mh / 1e3;
        let v = p.bus_voltage_v;
        TransferFunction::discrete(vec![(a + p.rff_ohm) / v, -a / v], vec![1.0, 0.0], 1.0 / fs)
            .response(omega)
    }
}

impl ControlBlock for DigitalCurrentLoop {
    fn kind(&self) -> BlockKind {
        BlockKind::DigitalCurrentLoop
    }

    fn zeros(&self) -> Option<Vec<Complex64>> {
        Some(vec![Complex64::new(-TWO_PI * self.properties.ki, 0.0)])
    }

    fn poles(&self) -> Option<Vec<Complex64>> {
        Some(vec![Complex64::new(0.0, 0.0)])
    }

    fn gain(&self) -> Real {
        self.properties.k / CURRENT_LOOP_SCALE
    }

    fn compute(&mut self, ctx: &EvalContext<'_>) -> Frd {
        self.controller_response(ctx.omega, ctx.drive_frequency_hz)
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
        Ok(PropertyValue::Float(
            match resolve(Self::DESCRIPTORS, self.name(), name)? {
                "K" => p.k,
                "Ki" => p.ki,
                "Bus Voltage" => p.bus_voltage_v,
                "Lff" => p.lff_mh,
                _ => p.rff_ohm,
            },
        ))
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
        let p = &mut self.properties;
        match resolve(Self::DESCRIPTORS, BlockKind::DigitalCurrentLoop.name(), name)? {
            "K" => p.k = value.into_float("K")?,
            "Ki" => p.ki = value.into_float("Ki")?,
            "Bus Voltage" => p.bus_voltage_v = value.into_float("Bus Voltage")?,
            "Lff" => p.lff_mh = value.into_float("Lff")?,
            _ => p.rff_ohm = value.into_float("Rff")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: Real = 20_000.0;

    #[test]
    fn controller_matches_direct_formula() {
        let dcl = DigitalCurrentLoop::default();
        let w = TWO_PI * 500.0;
        let got = dcl.controller_response(&[w], FS).response()[0];
        let z = Complex64::new(0.0, w / FS).exp();
        let want = (1.0 + (z + 1.0) / (z - 1.0) / (2.0 * FS) * TWO_PI) / CURRENT_LOOP_SCALE;
        assert!((got - want).norm() < 1e-15);
    }

    #[test]
    fn feedforward_matches_direct_formula() {
        let dcl = DigitalCurrentLoop::default();
        let w = TWO_PI * 2000.0;
        let got = dcl.feedforward_response(&[w], FS).response()[0];
        let z = Complex64::new(0.0, w / FS).exp();
        let want = ((z - 1.0) / z * FS * 1e-3 + 1.0) / 2.0 / (39.9 / 2.0);
        assert!((got - want).norm() < 1e-12);
    }

    #[test]
    fn zero_bus_voltage_falls_back() {
        let mut dcl = DigitalCurrentLoop::default();
        dcl.set_property("Bus_Voltage", PropertyValue::Float(0.0)).unwrap();
        assert_eq!(dcl.feedforward_response(&[1.0, 2.0], FS), Frd::unity(&[1.0, 2.0]));
    }

    #[test]
    fn introspection() {
        let dcl = DigitalCurrentLoop::default();
        assert_eq!(dcl.zeros().unwrap(), vec![Complex64::new(-TWO_PI, 0.0)]);
        assert_eq!(dcl.poles().unwrap(), vec![Complex64::new(0.0, 0.0)]);
        assert_eq!(dcl.gain(), 1.0 / 32768.0);
    }
}
