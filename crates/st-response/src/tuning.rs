//! Hand-off types for an external tuning optimizer.
//!
//! The optimizer receives a [`TuningSnapshot`], searches off-core, and returns
//! a [`TuningOutcome`]. The engine then evaluates the returned controller
//! against the existing plant chain.

use serde::{Deserialize, Serialize};
use st_blocks::ServoController;
use st_core::{Frd, Real};
use tracing::info;

use crate::engine::{BlockLayoutWithData, RecomputeOptions, RecomputeOutcome};
use crate::error::ResponseResult;

/// Read-only inputs for one tuning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningSnapshot {
    pub frequency_radians: Vec<Real>,
    pub servo_plant: Frd,
    pub servo_open_loop: Frd,
    pub controller: ServoController,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningOutcome {
    pub converged: bool,
    pub controller: ServoController,
    pub generations: usize,
    pub elapsed_ms: u64,
}

/// A search over servo controller gains.
pub trait TuningOptimizer {
    type Error: std::error::Error;

    fn tune(&mut self, snapshot: &TuningSnapshot) -> Result<TuningOutcome, Self::Error>;
}

impl BlockLayoutWithData {
    /// Adopts the tuned controller and evaluates it against the locked plant.
    pub fn apply_outcome(&mut self, outcome: &TuningOutcome) -> ResponseResult<RecomputeOutcome> {
        info!(
            converged = outcome.converged,
            generations = outcome.generations,
            elapsed_ms = outcome.elapsed_ms,
            "applying tuned controller"
        );
        *self.shaped.servo_controller_mut() = outcome.controller.clone();
        self.recompute(RecomputeOptions {
            controller: None,
            lock_plant: true,
        })
    }
}
