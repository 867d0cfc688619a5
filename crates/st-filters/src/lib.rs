//! Biquad digital filters for servo and feedforward filter banks.
//!
//! A [`Filter`] holds a user-facing parameter vector (cutoff, width, depth,
//! ...) together with the second-order-section coefficients the drive
//! actually runs. The two are kept in sync through a [`FilterDesign`]:
//! parameters are forward-calculated into coefficients, and coefficients can
//! be backward-calculated into parameters (used on import and whenever the
//! sampling frequency changes).

pub mod design;
pub mod error;
pub mod filter;

pub use design::{FilterDesign, StandardDesign};
pub use error::{FilterError, FilterResult};
pub use filter::{Coefficients, DEFAULT_SAMPLING_FREQUENCY, Filter, FilterType};
