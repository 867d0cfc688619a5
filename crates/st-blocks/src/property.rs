//! Typed property descriptors and values for the property editor.
//!
//! Every block and plant loop declares its editable properties statically as
//! a slice of [`PropertyDescriptor`]s. Setters receive a [`PropertyValue`] and
//! reject values of the wrong kind instead of coercing them.

use std::fmt;

use st_core::Real;
use st_filters::Filter;

use crate::error::{BlockError, BlockResult};
use crate::imported::ImportedResponse;
use crate::kind::{BlockRepresentation, normalize_name};
use crate::servo_controller::{DriveType, EnhancedTrackingControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    Float,
    Enum,
    Filters,
    Etc,
    FrequencyResponse,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Float => "float",
            PropertyKind::Enum => "enum",
            PropertyKind::Filters => "filter list",
            PropertyKind::Etc => "ETC settings",
            PropertyKind::FrequencyResponse => "frequency response",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    pub const fn new(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            unit: None,
            kind,
        }
    }

    pub const fn float(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit: Some(unit),
            kind: PropertyKind::Float,
        }
    }

    /// User-facing label, e.g. `Damping (N*s/m)`.
    pub fn label(&self) -> String {
        match self.unit {
            Some(unit) => format!("{} ({unit})", self.name),
            None => self.name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Float(Real),
    Drive(DriveType),
    Representation(BlockRepresentation),
    Filters(Vec<Filter>),
    Etc(EnhancedTrackingControl),
    FrequencyResponse(ImportedResponse),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Drive(_) | PropertyValue::Representation(_) => PropertyKind::Enum,
            PropertyValue::Filters(_) => PropertyKind::Filters,
            PropertyValue::Etc(_) => PropertyKind::Etc,
            PropertyValue::FrequencyResponse(_) => PropertyKind::FrequencyResponse,
        }
    }

    fn mismatch(&self, name: &'static str, expected: PropertyKind) -> BlockError {
        BlockError::PropertyType {
            name,
            expected,
            got: self.kind(),
        }
    }

    pub(crate) fn into_float(self, name: &'static str) -> BlockResult<Real> {
        match self {
            PropertyValue::Float(v) if v.is_finite() => Ok(v),
            PropertyValue::Float(_) => Err(BlockError::InvalidValue {
                name,
                what: "must be finite",
            }),
            other => Err(other.mismatch(name, PropertyKind::Float)),
        }
    }

    pub(crate) fn into_bool(self, name: &'static str) -> BlockResult<bool> {
        match self {
            PropertyValue::Bool(v) => Ok(v),
            other => Err(other.mismatch(name, PropertyKind::Bool)),
        }
    }

    pub(crate) fn into_drive(self, name: &'static str) -> BlockResult<DriveType> {
        match self {
            PropertyValue::Drive(v) => Ok(v),
            other => Err(other.mismatch(name, PropertyKind::Enum)),
        }
    }

    pub(crate) fn into_representation(self, name: &'static str) -> BlockResult<BlockRepresentation> {
        match self {
            PropertyValue::Representation(v) => Ok(v),
            other => Err(other.mismatch(name, PropertyKind::Enum)),
        }
    }

    pub(crate) fn into_filters(self, name: &'static str) -> BlockResult<Vec<Filter>> {
        match self {
            PropertyValue::Filters(v) => Ok(v),
            other => Err(other.mismatch(name, PropertyKind::Filters)),
        }
    }

    pub(crate) fn into_etc(self, name: &'static str) -> BlockResult<EnhancedTrackingControl> {
        match self {
            PropertyValue::Etc(v) => Ok(v),
            other => Err(other.mismatch(name, PropertyKind::Etc)),
        }
    }

    pub(crate) fn into_response(self, name: &'static str) -> BlockResult<ImportedResponse> {
        match self {
            PropertyValue::FrequencyResponse(v) => Ok(v),
            other => Err(other.mismatch(name, PropertyKind::FrequencyResponse)),
        }
    }
}

/// Finds the descriptor whose name matches `name` in any spelling.
pub(crate) fn resolve(
    descriptors: &'static [PropertyDescriptor],
    node: &'static str,
    name: &str,
) -> BlockResult<&'static str> {
    let wanted = normalize_name(name);
    descriptors
        .iter()
        .find(|d| normalize_name(d.name) == wanted || normalize_name(&d.label()) == wanted)
        .map(|d| d.name)
        .ok_or_else(|| BlockError::UnknownProperty {
            node,
            name: name.to_string(),
        })
}

pub(crate) fn positive(name: &'static str, v: Real) -> BlockResult<Real> {
    if v > 0.0 {
        Ok(v)
    } else {
        Err(BlockError::InvalidValue {
            name,
            what: "must be positive",
        })
    }
}

pub(crate) fn non_zero(name: &'static str, v: Real) -> BlockResult<Real> {
    if v != 0.0 {
        Ok(v)
    } else {
        Err(BlockError::InvalidValue {
            name,
            what: "must not be zero",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_unit() {
        let d = PropertyDescriptor::float("Damping", "N*s/m");
        assert_eq!(d.label(), "Damping (N*s/m)");
        let k = PropertyDescriptor::new("K", PropertyKind::Float);
        assert_eq!(k.label(), "K");
    }

    #[test]
    fn resolve_accepts_label_and_underscores() {
        static DESCRIPTORS: [PropertyDescriptor; 1] =
            [PropertyDescriptor::float("Bus Voltage", "V")];
        assert_eq!(resolve(&DESCRIPTORS, "x", "bus_voltage").unwrap(), "Bus Voltage");
        assert_eq!(resolve(&DESCRIPTORS, "x", "Bus Voltage (V)").unwrap(), "Bus Voltage");
        assert!(matches!(
            resolve(&DESCRIPTORS, "x", "Bus Current"),
            Err(BlockError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let err = PropertyValue::Bool(true).into_float("K").unwrap_err();
        assert_eq!(
            err,
            BlockError::PropertyType {
                name: "K",
                expected: PropertyKind::Float,
                got: PropertyKind::Bool
            }
        );
        assert!(PropertyValue::Float(f64::NAN).into_float("K").is_err());
    }
}
