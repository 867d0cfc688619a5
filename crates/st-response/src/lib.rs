//! st-response: derived frequency responses of a block layout.
//!
//! Contains:
//! - types (loop and response enumerations, shaped/original pairs)
//! - store (the response table)
//! - engine (recompute, grid reconciliation, snapshots)
//! - margins (gain/phase margins and peak sensitivity)
//! - tuning (optimizer hand-off)

pub mod engine;
pub mod error;
pub mod margins;
pub mod store;
pub mod tuning;
pub mod types;

pub use engine::{
    BlockLayoutWithData, CopySelection, DEFAULT_GRID_POINTS, DEFAULT_GRID_START_HZ,
    DEFAULT_GRID_STOP_HZ, RecomputeOptions, RecomputeOutcome, default_frequency_grid,
};
pub use error::{ResponseError, ResponseResult};
pub use margins::{GainMargin, PeakSensitivity, PhaseMargin, StabilityMargins, stability_margins};
pub use store::ResponseStore;
pub use tuning::{TuningOptimizer, TuningOutcome, TuningSnapshot};
pub use types::{FrdPair, LoopType, ResponseType};
