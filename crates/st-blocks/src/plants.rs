//! Electrical and mechanical plant blocks.
//!
//! All plants are continuous-time models evaluated at `s = jω`. The
//! amplifier and mechanical plants can alternatively be driven by an imported
//! measurement (see [`BlockRepresentation`]).

use serde::{Deserialize, Serialize};
use st_core::tf::{TransferFunction, quadratic_roots, zpk_response};
use st_core::{Complex64, Frd, Real};
use tracing::warn;

use crate::error::BlockResult;
use crate::imported::ImportedResponse;
use crate::kind::{BlockKind, BlockRepresentation};
use crate::node::{ControlBlock, EvalContext, unity_fallback};
use crate::property::{PropertyDescriptor, PropertyKind, PropertyValue, resolve};

const REPRESENTATION: &str = "Block Representation";
const FREQUENCY_RESPONSE: &str = "Frequency Response";

/// Resamples an imported curve, falling back to `model` when unavailable.
fn imported_or(
    kind: BlockKind,
    imported: &ImportedResponse,
    omega: &[Real],
    model: impl FnOnce() -> Frd,
) -> Frd {
    match imported.evaluate_at(omega) {
        Ok(frd) => frd,
        Err(e) => {
            warn!(block = %kind, error = %e, "imported response unavailable, using parameters");
            model()
        }
    }
}

// ---------------------------------------------------------------------------
// Amplifier plant

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmplifierProperties {
    pub representation: BlockRepresentation,
    pub frequency_response: ImportedResponse,
    pub k: Real,
    /// Carried for the drive configuration; the response model ignores it.
    pub delay_us: Real,
}

impl Default for AmplifierProperties {
    fn default() -> Self {
        Self {
            representation: BlockRepresentation::Parameters,
            frequency_response: ImportedResponse::default(),
            k: 39.9,
            delay_us: 25.4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmplifierPlant {
    pub properties: AmplifierProperties,
    #[serde(skip)]
    last: Option<Frd>,
}

impl AmplifierPlant {
    const DESCRIPTORS: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new(REPRESENTATION, PropertyKind::Enum),
        PropertyDescriptor::new(FREQUENCY_RESPONSE, PropertyKind::FrequencyResponse),
        PropertyDescriptor::new("K", PropertyKind::Float),
        PropertyDescriptor::float("Delay", "us"),
    ];

    pub fn is_frequency_response(&self) -> bool {
        self.properties.representation == BlockRepresentation::FrequencyResponse
    }

    fn model(&self, omega: &[Real]) -> Frd {
        zpk_response(&[], &[], self.properties.k, omega)
    }
}

impl ControlBlock for AmplifierPlant {
    fn kind(&self) -> BlockKind {
        BlockKind::AmplifierPlant
    }

    fn zeros(&self) -> Option<Vec<Complex64>> {
        Some(Vec::new())
    }

    fn poles(&self) -> Option<Vec<Complex64>> {
        Some(Vec::new())
    }

    fn gain(&self) -> Real {
        self.properties.k
    }

    fn compute(&mut self, ctx: &EvalContext<'_>) -> Frd {
        match self.properties.representation {
            BlockRepresentation::Parameters => self.model(ctx.omega),
            BlockRepresentation::FrequencyResponse => imported_or(
                self.kind(),
                &self.properties.frequency_response,
                ctx.omega,
                || self.model(ctx.omega),
            ),
        }
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
            REPRESENTATION => PropertyValue::Representation(p.representation),
            FREQUENCY_RESPONSE => PropertyValue::FrequencyResponse(p.frequency_response.clone()),
            "K" => PropertyValue::Float(p.k),
            _ => PropertyValue::Float(p.delay_us),
        })
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
        let p = &mut self.properties;
        match resolve(Self::DESCRIPTORS, BlockKind::AmplifierPlant.name(), name)? {
            REPRESENTATION => p.representation = value.into_representation(REPRESENTATION)?,
            FREQUENCY_RESPONSE => p.frequency_response = value.into_response(FREQUENCY_RESPONSE)?,
            "K" => p.k = value.into_float("K")?,
            _ => p.delay_us = value.into_float("Delay")?,
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Motor plant

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorProperties {
    pub resistance_ohm: Real,
    pub inductance_mh: Real,
    /// Torque (force) constant, N/A. Applied by the engine, also when the
    /// current plant is an imported response.
    pub kt_n_per_a: Real,
}

impl Default for MotorProperties {
    fn default() -> Self {
        Self {
            resistance_ohm: 1.0,
            inductance_mh: 1.0,
            kt_n_per_a: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MotorPlant {
    pub properties: MotorProperties,
    #[serde(skip)]
    last: Option<Frd>,
}

impl MotorPlant {
    const DESCRIPTORS: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::float("R", "ohm"),
        PropertyDescriptor::float("L", "mH"),
        PropertyDescriptor::float("Kt", "N/A"),
    ];

    pub fn torque_constant(&self) -> Real {
        self.properties.kt_n_per_a
    }

    fn inductance_h(&self) -> Option<Real> {
        let l = self.properties.inductance_mh / 1e3;
        (l != 0.0 && l.is_finite()).then_some(l)
    }
}

impl ControlBlock for MotorPlant {
    fn kind(&self) -> BlockKind {
        BlockKind::MotorPlant
    }

    fn zeros(&self) -> Option<Vec<Complex64>> {
        Some(Vec::new())
    }

    fn poles(&self) -> Option<Vec<Complex64>> {
        Some(
            self.inductance_h()
                .map(|l| vec![Complex64::new(-self.properties.resistance_ohm / l, 0.0)])
                .unwrap_or_default(),
        )
    }

    /// `2/L`: line-to-line R/L converted to phase.
    fn gain(&self) -> Real {
        self.inductance_h().map_or(1.0, |l| 2.0 / l)
    }

    fn compute(&mut self, ctx: &EvalContext<'_>) -> Frd {
        match self.inductance_h() {
            Some(l) => {
                let pole = Complex64::new(-self.properties.resistance_ohm / l, 0.0);
                zpk_response(&[], &[pole], 2.0 / l, ctx.omega)
            }
            None => unity_fallback(self.kind(), ctx.omega, "zero inductance"),
        }
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
                "R" => p.resistance_ohm,
                "L" => p.inductance_mh,
                _ => p.kt_n_per_a,
            },
        ))
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
        let p = &mut self.properties;
        match resolve(Self::DESCRIPTORS, BlockKind::MotorPlant.name(), name)? {
            "R" => p.resistance_ohm = value.into_float("R")?,
            "L" => p.inductance_mh = value.into_float("L")?,
            _ => p.kt_n_per_a = value.into_float("Kt")?,
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Single-pole RC stages

/// Resistor/capacitor values of a first-order RC low-pass stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcProperties {
    pub resistance_ohm: Real,
    pub capacitance_uf: Real,
}

impl Default for RcProperties {
    fn default() -> Self {
        Self {
            resistance_ohm: 1.0,
            capacitance_uf: 1.0,
        }
    }
}

impl RcProperties {
    const DESCRIPTORS: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::float("R", "ohm"),
        PropertyDescriptor::float("C", "uF"),
    ];

    /// Corner frequency `1/RC` in rad/s, if defined.
    fn corner(&self) -> Option<Real> {
        let rc = self.resistance_ohm * self.capacitance_uf / 1e6;
        (rc != 0.0 && rc.is_finite()).then(|| 1.0 / rc)
    }
}

macro_rules! rc_block {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            pub properties: RcProperties,
            #[serde(skip)]
            last: Option<Frd>,
        }

        impl ControlBlock for $name {
            fn kind(&self) -> BlockKind {
                $kind
            }

            fn zeros(&self) -> Option<Vec<Complex64>> {
                Some(Vec::new())
            }

            fn poles(&self) -> Option<Vec<Complex64>> {
                Some(
                    self.properties
                        .corner()
                        .map(|wc| vec![Complex64::new(-wc, 0.0)])
                        .unwrap_or_default(),
                )
            }

            fn gain(&self) -> Real {
                self.properties.corner().unwrap_or(1.0)
            }

            fn compute(&mut self, ctx: &EvalContext<'_>) -> Frd {
                match self.properties.corner() {
                    Some(wc) => zpk_response(&[], &[Complex64::new(-wc, 0.0)], wc, ctx.omega),
                    None => unity_fallback(self.kind(), ctx.omega, "zero RC product"),
                }
            }

            fn cache_mut(&mut self) -> &mut Option<Frd> {
                &mut self.last
            }

            fn last_response(&self) -> Option<&Frd> {
                self.last.as_ref()
            }

            fn descriptors(&self) -> &'static [PropertyDescriptor] {
                RcProperties::DESCRIPTORS
            }

            fn property(&self, name: &str) -> BlockResult<PropertyValue> {
                let p = &self.properties;
                Ok(PropertyValue::Float(
                    match resolve(RcProperties::DESCRIPTORS, self.name(), name)? {
                        "R" => p.resistance_ohm,
                        _ => p.capacitance_uf,
                    },
                ))
            }

            fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
                let p = &mut self.properties;
                match resolve(RcProperties::DESCRIPTORS, $kind.name(), name)? {
                    "R" => p.resistance_ohm = value.into_float("R")?,
                    _ => p.capacitance_uf = value.into_float("C")?,
                }
                Ok(())
            }
        }
    };
}

rc_block!(
    /// RC roll-off at the amplifier output.
    AmplifierRolloffFilter,
    BlockKind::AmplifierRolloffFilter
);
rc_block!(
    /// RC low-pass on the current feedback signal.
    CurrentFeedbackLowPassFilter,
    BlockKind::CurrentFeedbackLowPassFilter
);

// ---------------------------------------------------------------------------
// Mechanical plant

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicalProperties {
    pub representation: BlockRepresentation,
    pub frequency_response: ImportedResponse,
    pub mass_kg: Real,
    pub damping_n_s_per_m: Real,
    pub stiffness_n_per_mm: Real,
}

impl Default for MechanicalProperties {
    fn default() -> Self {
        Self {
            representation: BlockRepresentation::Parameters,
            frequency_response: ImportedResponse::default(),
            mass_kg: 10.0,
            damping_n_s_per_m: 0.5,
            stiffness_n_per_mm: 1.0,
        }
    }
}

/// Mass-damper-spring: `ωn² / (s² + 2ζωn·s + ωn²)` with `ωn = √(k/m)` and
/// `ζ = c/(2mωn)`. Zero stiffness collapses to `1/(m·s²)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MechanicalPlant {
    pub properties: MechanicalProperties,
    #[serde(skip)]
    last: Option<Frd>,
}

/// Analytic form of the mechanical model for the current parameters.
enum Mechanics {
    DoubleIntegrator { mass: Real },
    SecondOrder { wn: Real, zeta: Real },
    Degenerate(&'static str),
}

impl MechanicalPlant {
    const DESCRIPTORS: &'static [PropertyDescriptor] = &[
        PropertyDescriptor::new(REPRESENTATION, PropertyKind::Enum),
        PropertyDescriptor::new(FREQUENCY_RESPONSE, PropertyKind::FrequencyResponse),
        PropertyDescriptor::float("Mass", "kg"),
        PropertyDescriptor::float("Damping", "N*s/m"),
        PropertyDescriptor::float("Stiffness", "N/mm"),
    ];

    pub fn is_frequency_response(&self) -> bool {
        self.properties.representation == BlockRepresentation::FrequencyResponse
    }

    fn mechanics(&self) -> Mechanics {
        let p = &self.properties;
        let mass = p.mass_kg;
        if mass == 0.0 || !mass.is_finite() {
            return Mechanics::Degenerate("zero mass");
        }
        if p.stiffness_n_per_mm == 0.0 {
            return Mechanics::DoubleIntegrator { mass };
        }
        let wn = (p.stiffness_n_per_mm * 1e3 / mass).sqrt();
        let zeta = p.damping_n_s_per_m / (2.0 * mass * wn);
        if wn.is_finite() && zeta.is_finite() && wn > 0.0 {
            Mechanics::SecondOrder { wn, zeta }
        } else {
            Mechanics::Degenerate("stiffness and mass give no natural frequency")
        }
    }

    fn model(&self, omega: &[Real]) -> Frd {
        match self.mechanics() {
            Mechanics::DoubleIntegrator { mass } => {
                TransferFunction::continuous(vec![1.0], vec![mass, 0.0, 0.0]).response(omega)
            }
            Mechanics::SecondOrder { wn, zeta } => {
                TransferFunction::continuous(vec![wn * wn], vec![1.0, 2.0 * zeta * wn, wn * wn])
                    .response(omega)
            }
            Mechanics::Degenerate(reason) => unity_fallback(self.kind(), omega, reason),
        }
    }
}

impl ControlBlock for MechanicalPlant {
    fn kind(&self) -> BlockKind {
        BlockKind::MechanicalPlant
    }

    fn zeros(&self) -> Option<Vec<Complex64>> {
        Some(Vec::new())
    }

    fn poles(&self) -> Option<Vec<Complex64>> {
        Some(match self.mechanics() {
            Mechanics::DoubleIntegrator { .. } => vec![Complex64::new(0.0, 0.0); 2],
            Mechanics::SecondOrder { wn, zeta } => quadratic_roots(1.0, 2.0 * zeta * wn, wn * wn),
            Mechanics::Degenerate(_) => Vec::new(),
        })
    }

    fn gain(&self) -> Real {
        match self.mechanics() {
            Mechanics::DoubleIntegrator { mass } => 1.0 / mass,
            Mechanics::SecondOrder { wn, .. } => wn * wn,
            Mechanics::Degenerate(_) => 1.0,
        }
    }

    fn compute(&mut self, ctx: &EvalContext<'_>) -> Frd {
        match self.properties.representation {
            BlockRepresentation::Parameters => self.model(ctx.omega),
            BlockRepresentation::FrequencyResponse => imported_or(
                self.kind(),
                &self.properties.frequency_response,
                ctx.omega,
                || self.model(ctx.omega),
            ),
        }
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
            REPRESENTATION => PropertyValue::Representation(p.representation),
            FREQUENCY_RESPONSE => PropertyValue::FrequencyResponse(p.frequency_response.clone()),
            "Mass" => PropertyValue::Float(p.mass_kg),
            "Damping" => PropertyValue::Float(p.damping_n_s_per_m),
            _ => PropertyValue::Float(p.stiffness_n_per_mm),
        })
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
        let p = &mut self.properties;
        match resolve(Self::DESCRIPTORS, BlockKind::MechanicalPlant.name(), name)? {
            REPRESENTATION => p.representation = value.into_representation(REPRESENTATION)?,
            FREQUENCY_RESPONSE => p.frequency_response = value.into_response(FREQUENCY_RESPONSE)?,
            "Mass" => p.mass_kg = value.into_float("Mass")?,
            "Damping" => p.damping_n_s_per_m = value.into_float("Damping")?,
            _ => p.stiffness_n_per_mm = value.into_float("Stiffness")?,
        }
        Ok(())
    }
}
