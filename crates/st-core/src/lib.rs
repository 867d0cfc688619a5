//! st-core: numeric foundation for servotune.
//!
//! Contains:
//! - frd (frequency-response data and its algebra)
//! - interp (natural cubic spline used to resample measured curves)
//! - tf (zero/pole/gain and polynomial transfer-function evaluation)
//! - compat (frequency-grid compatibility checking)
//! - grid (frequency grid construction and validation)
//! - units (uom frequency types + Hz/rad conversions)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod compat;
pub mod error;
pub mod frd;
pub mod grid;
pub mod interp;
pub mod numeric;
pub mod tf;
pub mod units;

pub use num_complex::Complex64;

pub use compat::{Compatibility, FUZZ, MIN_FREQUENCIES};
pub use error::{CoreError, CoreResult};
pub use frd::Frd;
pub use numeric::*;
pub use tf::TransferFunction;
pub use units::*;
