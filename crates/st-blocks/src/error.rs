//! Error types for block and loop operations.

use st_core::CoreError;
use thiserror::Error;

use crate::property::PropertyKind;

/// Result type for block operations.
pub type BlockResult<T> = Result<T, BlockError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlockError {
    /// No property of that name on the node.
    #[error("{node} has no property named {name:?}")]
    UnknownProperty { node: &'static str, name: String },

    /// Value kind does not match the property.
    #[error("Property {name:?} expects {expected}, got {got}")]
    PropertyType {
        name: &'static str,
        expected: PropertyKind,
        got: PropertyKind,
    },

    /// Value has the right kind but is out of range.
    #[error("Invalid value for {name:?}: {what}")]
    InvalidValue {
        name: &'static str,
        what: &'static str,
    },

    /// A measured response was requested but none is attached.
    #[error("No frequency response imported for {what}")]
    MissingCurve { what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}
