//! Error types for filter operations.

use thiserror::Error;

use crate::FilterType;

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while configuring or designing a filter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// Parameter vector has the wrong length for the filter type.
    #[error("{filter_type} filter takes {expected} parameters, got {got}")]
    ParameterCount {
        filter_type: FilterType,
        expected: usize,
        got: usize,
    },

    /// Sampling frequency is zero, negative or not finite.
    #[error("Invalid sampling frequency: {value} Hz")]
    InvalidSamplingFrequency { value: f64 },

    /// Design formula has no solution for the given inputs.
    #[error("Degenerate {filter_type} design: {what}")]
    Degenerate {
        filter_type: FilterType,
        what: &'static str,
    },
}
