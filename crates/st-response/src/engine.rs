//! Response computation engine.
//!
//! [`BlockLayoutWithData`] pairs a shaped (candidate) and an original
//! (baseline) block layout with a [`ResponseStore`] and the working frequency
//! grid. [`BlockLayoutWithData::recompute`] rebuilds every shaped response:
//!
//! 1. reconcile the grid with any imported plant curve (fails atomically);
//! 2. clear the shaped entries;
//! 3. compute the servo controller family (always);
//! 4. if the servo plant is locked, reuse it and close the servo loop;
//! 5. otherwise evaluate bottom-up: mechanics, current loop, servo plant,
//!    servo loop.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use st_blocks::{
    BlockRepresentation, ControlBlock, EvalContext, ImportedResponse, ServoController,
};
use st_core::compat;
use st_core::grid::{self, linspace};
use st_core::{Frd, Real, TWO_PI};
use st_layout::BlockLayout;
use tracing::{debug, info, warn};

use crate::error::{ResponseError, ResponseResult};
use crate::store::ResponseStore;
use crate::types::{LoopType, ResponseType};

/// Default working grid: 10 Hz to 10 kHz, linear, in rad/s.
pub const DEFAULT_GRID_START_HZ: Real = 10.0;
pub const DEFAULT_GRID_STOP_HZ: Real = 10_000.0;
pub const DEFAULT_GRID_POINTS: usize = 1000;

pub fn default_frequency_grid() -> Vec<Real> {
    linspace(
        DEFAULT_GRID_START_HZ * TWO_PI,
        DEFAULT_GRID_STOP_HZ * TWO_PI,
        DEFAULT_GRID_POINTS,
    )
}

#[derive(Debug, Clone, Default)]
pub struct RecomputeOptions {
    /// Evaluate this controller instead of the layout's own.
    pub controller: Option<ServoController>,
    /// Reuse the stored original servo plant when one exists.
    pub lock_plant: bool,
}

impl RecomputeOptions {
    /// Override controller evaluated against the existing plant chain.
    pub fn with_controller(controller: ServoController) -> Self {
        Self {
            controller: Some(controller),
            lock_plant: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// The layout is locked; nothing changed.
    Skipped,
    Computed {
        points: usize,
        plant_locked: bool,
    },
}

/// Which half of another layout [`BlockLayoutWithData::copy_in`] takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopySelection {
    Shaped,
    Original,
    Both,
}

impl CopySelection {
    fn shaped(self) -> bool {
        matches!(self, CopySelection::Shaped | CopySelection::Both)
    }

    fn original(self) -> bool {
        matches!(self, CopySelection::Original | CopySelection::Both)
    }
}

/// Controller-side responses, computed on every recompute.
struct ControllerResponses {
    total: Frd,
    pid: Frd,
    filters: Frd,
    feedforward: Frd,
    drive_frequency_hz: Real,
}

impl ControllerResponses {
    fn compute(controller: &mut ServoController, omega: &[Real]) -> Self {
        let drive_frequency_hz = controller.drive_frequency_hz();
        let ctx = EvalContext::new(omega, drive_frequency_hz);
        Self {
            total: controller.evaluate(&ctx),
            pid: controller.pid_response(omega),
            filters: controller.servo_filters_response(omega),
            feedforward: controller.feedforward_response(omega),
            drive_frequency_hz,
        }
    }
}

/// Open/closed-loop family of one loop level.
struct ClosedLoop {
    open_loop: Frd,
    closed_loop: Frd,
    sensitivity: Frd,
    complementary: Frd,
    process: Frd,
}

impl ClosedLoop {
    /// `OL = C·P`, `CL = (P·FF + OL)/(1 + OL)`, `S = 1/(1 + OL)`,
    /// `T = S·OL`, `PS = S·P`.
    fn close(controller: &Frd, plant: &Frd, feedforward: &Frd) -> Self {
        let open_loop = controller * plant;
        let return_difference = 1.0 + &open_loop;
        let closed_loop = (plant * feedforward + &open_loop) / &return_difference;
        let sensitivity = 1.0 / &return_difference;
        let complementary = &sensitivity * &open_loop;
        let process = &sensitivity * plant;
        Self {
            open_loop,
            closed_loop,
            sensitivity,
            complementary,
            process,
        }
    }

    fn store_servo(self, store: &mut ResponseStore) {
        store.set_shaped(ResponseType::ServoOpenLoop, self.open_loop);
        store.set_shaped(ResponseType::ServoClosedLoop, self.closed_loop);
        store.set_shaped(ResponseType::ServoSensitivity, self.sensitivity);
        store.set_shaped(ResponseType::ServoComplementarySensitivity, self.complementary);
        store.set_shaped(ResponseType::ServoProcessSensitivity, self.process);
    }
}

/// Shaped/original layouts with their responses and working grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLayoutWithData {
    pub shaped: BlockLayout,
    pub original: BlockLayout,
    pub responses: ResponseStore,
    frequency_radians: Vec<Real>,
    original_frequency_radians: Vec<Real>,
    pub loop_type: LoopType,
    /// Recompute calls leave a locked layout untouched.
    pub is_locked: bool,
    /// Whose controller gains are edited and exported.
    pub is_primary: bool,
    /// Built from defaults rather than a measurement.
    pub is_default: bool,
    pub filename: Option<PathBuf>,
}

impl BlockLayoutWithData {
    fn bare(layout: BlockLayout, frequency_radians: Vec<Real>) -> ResponseResult<Self> {
        grid::validate(&frequency_radians, "frequency grid")?;
        Ok(Self {
            original: layout.clone(),
            shaped: layout,
            responses: ResponseStore::new(),
            original_frequency_radians: frequency_radians.clone(),
            frequency_radians,
            loop_type: LoopType::Servo,
            is_locked: false,
            is_primary: true,
            is_default: false,
            filename: None,
        })
    }

    /// Computes every response of `layout` on `frequency_radians` and keeps
    /// the result as the baseline.
    pub fn new(layout: BlockLayout, frequency_radians: Vec<Real>) -> ResponseResult<Self> {
        let mut data = Self::bare(layout, frequency_radians)?;
        data.recompute(RecomputeOptions::default())?;
        data.copy_shaped_to_original();
        Ok(data)
    }

    /// Default layout, all plants modelled from parameters, on the default
    /// grid.
    pub fn from_defaults() -> ResponseResult<Self> {
        let mut layout = BlockLayout::default();
        layout.servo_plant_mut().source.representation = BlockRepresentation::Parameters;
        layout.current_plant_mut().source.representation = BlockRepresentation::Parameters;
        let mut data = Self::new(layout, default_frequency_grid())?;
        data.is_default = true;
        Ok(data)
    }

    /// Builds a layout around a measured open loop. The plant at the
    /// measured level becomes `open_loop / controller` and is locked in as
    /// the original plant; the grid is the measurement's.
    pub fn from_measured_open_loop(
        mut layout: BlockLayout,
        loop_type: LoopType,
        open_loop: Frd,
    ) -> ResponseResult<Self> {
        let omega = open_loop.frequency().to_vec();
        let drive_hz = layout.servo_controller().drive_frequency_hz();
        let ctx = EvalContext::new(&omega, drive_hz);

        let (open_loop_type, plant_type) = match loop_type {
            LoopType::Servo => {
                layout.servo_plant_mut().source.representation =
                    BlockRepresentation::FrequencyResponse;
                layout.current_plant_mut().source.representation = BlockRepresentation::Parameters;
                (ResponseType::ServoOpenLoop, ResponseType::ServoPlant)
            }
            LoopType::Current => {
                layout.servo_plant_mut().source.representation = BlockRepresentation::Parameters;
                layout.current_plant_mut().source.representation =
                    BlockRepresentation::FrequencyResponse;
                (ResponseType::CurrentOpenLoop, ResponseType::CurrentPlant)
            }
        };
        let controller = match loop_type {
            LoopType::Servo => layout.servo_controller_mut().evaluate(&ctx),
            LoopType::Current => layout.digital_current_loop_mut().evaluate(&ctx),
        };
        let plant = open_loop.checked_div(&controller)?;

        let mut data = Self::bare(layout, omega)?;
        data.loop_type = loop_type;
        data.responses.set_shaped(open_loop_type, open_loop);
        data.responses.set_shaped(plant_type, plant.clone());
        data.responses.set_original(plant_type, plant);
        info!(%loop_type, points = data.frequency_radians.len(), "layout built from measured open loop");

        data.recompute(RecomputeOptions::default())?;
        data.copy_shaped_to_original();
        Ok(data)
    }

    pub fn frequency_radians(&self) -> &[Real] {
        &self.frequency_radians
    }

    pub fn original_frequency_radians(&self) -> &[Real] {
        &self.original_frequency_radians
    }

    /// Replaces the working grid. Responses are not recomputed.
    pub fn set_frequency_grid(&mut self, frequency_radians: Vec<Real>) -> ResponseResult<()> {
        grid::validate(&frequency_radians, "frequency grid")?;
        self.frequency_radians = frequency_radians;
        Ok(())
    }

    /// Returns to the grid the layout was created with.
    pub fn restore_original_grid(&mut self) {
        self.frequency_radians = self.original_frequency_radians.clone();
    }

    // --- snapshots ------------------------------------------------------

    pub fn copy_shaped_to_original(&mut self) {
        self.original = self.shaped.clone();
        self.responses.copy_shaped_to_original();
    }

    pub fn copy_original_to_shaped(&mut self) {
        self.shaped = self.original.clone();
        self.responses.copy_original_to_shaped();
    }

    pub fn clear_shaped(&mut self) {
        self.responses.clear_shaped();
    }

    /// Copies layouts and responses from `other`.
    pub fn copy_in(&mut self, other: &BlockLayoutWithData, selection: CopySelection) {
        if selection.shaped() {
            self.shaped = other.shaped.clone();
            self.responses.copy_shaped_from(&other.responses);
        }
        if selection.original() {
            self.original = other.original.clone();
            self.responses.copy_original_from(&other.responses);
        }
    }

    // --- recompute ------------------------------------------------------

    /// Recomputes every shaped response. On a grid reconciliation failure
    /// nothing is modified.
    pub fn recompute(&mut self, options: RecomputeOptions) -> ResponseResult<RecomputeOutcome> {
        if self.is_locked {
            debug!("layout locked, recompute skipped");
            return Ok(RecomputeOutcome::Skipped);
        }

        let omega = self.reconcile_grid()?;
        if omega != self.frequency_radians {
            info!(
                from = self.frequency_radians.len(),
                to = omega.len(),
                "working frequency grid narrowed to imported plant overlap"
            );
        }
        let RecomputeOptions {
            controller,
            lock_plant,
        } = options;

        // Every fallible step runs before the store is touched.
        let locked_plant = self.locked_servo_plant(lock_plant, &omega)?;
        let imported_current = match locked_plant {
            Some(_) => None,
            None => self.imported_current_plant(&omega)?,
        };

        self.frequency_radians = omega.clone();
        self.responses.clear_shaped();

        let controller = match controller {
            Some(mut c) => ControllerResponses::compute(&mut c, &omega),
            None => ControllerResponses::compute(self.shaped.servo_controller_mut(), &omega),
        };
        let store = &mut self.responses;
        store.set_shaped(ResponseType::ServoController, controller.total.clone());
        store.set_shaped(ResponseType::ServoControllerOnly, controller.pid.clone());
        store.set_shaped(ResponseType::ServoFilters, controller.filters.clone());
        store.set_shaped(ResponseType::ServoFeedforward, controller.feedforward.clone());
        store.set_shaped(
            ResponseType::ServoInverseFeedforward,
            controller.feedforward.recip(),
        );

        let plant_locked = match locked_plant {
            Some(plant) => {
                debug!("servo plant locked");
                self.close_servo_loop(&controller, plant);
                true
            }
            None => {
                self.compute_bottom_up(&controller, &omega, imported_current);
                false
            }
        };

        Ok(RecomputeOutcome::Computed {
            points: omega.len(),
            plant_locked,
        })
    }

    /// Recomputes with `controller` against the existing plant.
    pub fn evaluate_candidate(
        &mut self,
        controller: &ServoController,
    ) -> ResponseResult<RecomputeOutcome> {
        self.recompute(RecomputeOptions::with_controller(controller.clone()))
    }

    /// Effective grid after narrowing to every imported plant in use.
    fn reconcile_grid(&self) -> ResponseResult<Vec<Real>> {
        let mut omega = self.frequency_radians.clone();

        let servo_plant = self.shaped.servo_plant();
        if servo_plant.is_frequency_response() {
            // Nested plants are inert.
            if servo_plant.source.frequency_response.is_loaded() {
                omega = narrow(&omega, &servo_plant.source.frequency_response, "Servo Plant")?;
            }
            return Ok(omega);
        }

        let mechanical = self.shaped.mechanical_plant();
        if mechanical.is_frequency_response() && mechanical.properties.frequency_response.is_loaded() {
            omega = narrow(
                &omega,
                &mechanical.properties.frequency_response,
                "Mechanical Plant",
            )?;
        }

        let current_plant = self.shaped.current_plant();
        if current_plant.is_frequency_response() {
            if current_plant.source.frequency_response.is_loaded() {
                omega = narrow(
                    &omega,
                    &current_plant.source.frequency_response,
                    "Current Plant",
                )?;
            }
        } else {
            let amplifier = self.shaped.amplifier_plant();
            if amplifier.is_frequency_response() && amplifier.properties.frequency_response.is_loaded()
            {
                omega = narrow(
                    &omega,
                    &amplifier.properties.frequency_response,
                    "Amplifier Plant",
                )?;
            }
        }
        Ok(omega)
    }

    /// The servo plant to reuse, resampled onto `omega`, if it is locked.
    fn locked_servo_plant(&self, lock_plant: bool, omega: &[Real]) -> ResponseResult<Option<Frd>> {
        let servo_plant = self.shaped.servo_plant();
        let stored = self.responses.original(ResponseType::ServoPlant);
        let source = if servo_plant.is_frequency_response() {
            match servo_plant.source.frequency_response.curve().or(stored) {
                Some(frd) => Some(frd),
                None => {
                    warn!("servo plant has no imported or stored response, modelling from parameters");
                    None
                }
            }
        } else if lock_plant {
            stored
        } else {
            None
        };
        Ok(match source {
            Some(frd) => Some(frd.resample(omega)?),
            None => None,
        })
    }

    fn close_servo_loop(&mut self, controller: &ControllerResponses, plant: Frd) {
        let feedforward = &controller.feedforward * &controller.filters;
        ClosedLoop::close(&controller.total, &plant, &feedforward).store_servo(&mut self.responses);
        self.responses.set_shaped(ResponseType::ServoPlant, plant);
    }

    fn compute_bottom_up(
        &mut self,
        controller: &ControllerResponses,
        omega: &[Real],
        imported_current: Option<Frd>,
    ) {
        let ctx = EvalContext::new(omega, controller.drive_frequency_hz);

        let mechanical = self.shaped.mechanical_plant_mut().evaluate(&ctx);
        self.responses
            .set_shaped(ResponseType::MechanicalPlant, mechanical.clone());

        let current_controller = self.shaped.digital_current_loop_mut().evaluate(&ctx);
        let current_feedforward = self
            .shaped
            .digital_current_loop()
            .feedforward_response(omega, controller.drive_frequency_hz);
        self.responses
            .set_shaped(ResponseType::CurrentController, current_controller.clone());
        self.responses.set_shaped(
            ResponseType::CurrentInverseFeedforward,
            current_feedforward.recip(),
        );
        self.responses
            .set_shaped(ResponseType::CurrentFeedforward, current_feedforward.clone());

        let current_plant = self.current_plant_response(&ctx, imported_current);
        self.responses
            .set_shaped(ResponseType::CurrentPlant, current_plant.clone());

        let current = ClosedLoop::close(&current_controller, &current_plant, &current_feedforward);
        let kt = self.shaped.motor_plant().torque_constant();
        let servo_plant = &current.closed_loop * kt * &mechanical;

        let store = &mut self.responses;
        store.set_shaped(ResponseType::CurrentOpenLoop, current.open_loop);
        store.set_shaped(ResponseType::CurrentClosedLoop, current.closed_loop);
        store.set_shaped(ResponseType::CurrentSensitivity, current.sensitivity);
        store.set_shaped(ResponseType::CurrentComplementarySensitivity, current.complementary);
        store.set_shaped(ResponseType::CurrentProcessSensitivity, current.process);

        if store.original(ResponseType::ServoPlant).is_none() {
            store.set_original(ResponseType::ServoPlant, servo_plant.clone());
        }
        self.close_servo_loop(controller, servo_plant);
    }

    /// Imported curve, else stored baseline, of a frequency-response-mode
    /// current plant, resampled onto `omega`.
    fn imported_current_plant(&self, omega: &[Real]) -> ResponseResult<Option<Frd>> {
        let plant = self.shaped.current_plant();
        if !plant.is_frequency_response() {
            return Ok(None);
        }
        let source = plant
            .source
            .frequency_response
            .curve()
            .or_else(|| self.responses.original(ResponseType::CurrentPlant));
        match source {
            Some(frd) => Ok(Some(frd.resample(omega)?)),
            None => {
                warn!("current plant has no imported or stored response, modelling from parameters");
                Ok(None)
            }
        }
    }

    /// `imported` when present, otherwise the product of the four series
    /// blocks.
    fn current_plant_response(&mut self, ctx: &EvalContext<'_>, imported: Option<Frd>) -> Frd {
        if let Some(frd) = imported {
            return frd;
        }

        let plant = self.shaped.current_plant_mut();
        let product = plant.evaluate(ctx);
        let parts = [
            (ResponseType::AmplifierPlant, plant.amplifier_plant.last_response()),
            (
                ResponseType::AmplifierRolloffFilter,
                plant.amplifier_rolloff_filter.last_response(),
            ),
            (ResponseType::MotorPlant, plant.motor_plant.last_response()),
            (
                ResponseType::CurrentFeedbackLowPassFilter,
                plant.current_feedback_low_pass_filter.last_response(),
            ),
        ];
        for (response, frd) in parts {
            if let Some(frd) = frd {
                self.responses.set_shaped(response, frd.clone());
            }
        }
        product
    }

    /// Inputs handed to an external tuner.
    pub fn tuning_snapshot(&self) -> ResponseResult<crate::tuning::TuningSnapshot> {
        let servo_plant = self
            .responses
            .shaped(ResponseType::ServoPlant)
            .ok_or(ResponseError::MissingResponse {
                what: "servo plant",
            })?;
        let servo_open_loop = self
            .responses
            .shaped(ResponseType::ServoOpenLoop)
            .ok_or(ResponseError::MissingResponse {
                what: "servo open loop",
            })?;
        Ok(crate::tuning::TuningSnapshot {
            frequency_radians: self.frequency_radians.clone(),
            servo_plant: servo_plant.clone(),
            servo_open_loop: servo_open_loop.clone(),
            controller: self.shaped.servo_controller().clone(),
        })
    }
}

/// Overlap of `omega` with an imported curve's grid.
fn narrow(
    omega: &[Real],
    imported: &ImportedResponse,
    plant: &'static str,
) -> ResponseResult<Vec<Real>> {
    let new = imported.source_frequencies().unwrap_or_default();
    let compatibility = compat::check(omega, new);
    if !compatibility.is_valid {
        return Err(ResponseError::FrequencyIncompatible {
            plant,
            source_path: imported.describe(),
        });
    }
    debug!(
        plant,
        exact = compatibility.is_exact,
        points = compatibility.overlap.len(),
        "imported plant grid reconciled"
    );
    Ok(compatibility.overlap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_core::Complex64;

    fn close(a: Complex64, b: Complex64, tol: Real) -> bool {
        (a - b).norm() <= tol * (1.0 + b.norm())
    }

    #[test]
    fn closed_loop_identities() {
        let omega = [1.0, 10.0, 100.0];
        let c = Frd::from_fn(&omega, |w| Complex64::new(100.0 / w, -5.0));
        let p = Frd::from_fn(&omega, |w| Complex64::new(1.0, 0.0) / Complex64::new(-w * w, w));
        let ff = Frd::unity(&omega);
        let l = ClosedLoop::close(&c, &p, &ff);
        for i in 0..omega.len() {
            let ol = l.open_loop.response()[i];
            let s = l.sensitivity.response()[i];
            assert!(close(s * (1.0 + ol), Complex64::new(1.0, 0.0), 1e-12));
            assert!(close(l.complementary.response()[i] + s, Complex64::new(1.0, 0.0), 1e-12));
            // Unity feedforward: CL = (P + CP)/(1 + CP)
            let p_i = p.response()[i];
            assert!(close(l.closed_loop.response()[i], (p_i + ol) / (1.0 + ol), 1e-12));
            assert!(close(l.process.response()[i], s * p_i, 1e-12));
        }
    }

    #[test]
    fn default_grid_spans_ten_hz_to_ten_khz() {
        let g = default_frequency_grid();
        assert_eq!(g.len(), DEFAULT_GRID_POINTS);
        assert!((g[0] - 10.0 * TWO_PI).abs() < 1e-9);
        assert!((g[g.len() - 1] - 10_000.0 * TWO_PI).abs() < 1e-6);
    }

    #[test]
    fn locked_layout_is_skipped() {
        let mut data = BlockLayoutWithData::from_defaults().unwrap();
        let before = data.responses.clone();
        data.is_locked = true;
        data.shaped.servo_controller_mut().properties.k = 10.0;
        assert_eq!(
            data.recompute(RecomputeOptions::default()).unwrap(),
            RecomputeOutcome::Skipped
        );
        assert_eq!(data.responses, before);
    }

    #[test]
    fn copy_selection_halves() {
        let source = BlockLayoutWithData::from_defaults().unwrap();
        let mut target = BlockLayoutWithData::from_defaults().unwrap();
        target.shaped.servo_controller_mut().properties.k = 2.0;
        target.clear_shaped();
        target.copy_in(&source, CopySelection::Shaped);
        assert_eq!(target.shaped.servo_controller().properties.k, 1.0);
        assert!(target.responses.shaped(ResponseType::ServoOpenLoop).is_some());

        target.original.servo_controller_mut().properties.k = 3.0;
        target.copy_in(&source, CopySelection::Original);
        assert_eq!(target.original.servo_controller().properties.k, 1.0);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut data = BlockLayoutWithData::from_defaults().unwrap();
        data.shaped.servo_controller_mut().properties.k = 4.0;
        data.recompute(RecomputeOptions::default()).unwrap();
        assert_ne!(
            data.responses.shaped(ResponseType::ServoOpenLoop),
            data.responses.original(ResponseType::ServoOpenLoop)
        );
        data.copy_original_to_shaped();
        assert_eq!(data.shaped.servo_controller().properties.k, 1.0);
        assert_eq!(
            data.responses.shaped(ResponseType::ServoOpenLoop),
            data.responses.original(ResponseType::ServoOpenLoop)
        );
    }

    #[test]
    fn current_plant_falls_back_to_stored_baseline() {
        let mut data = BlockLayoutWithData::from_defaults().unwrap();
        let baseline = data
            .responses
            .original(ResponseType::CurrentPlant)
            .cloned()
            .unwrap();
        data.shaped.current_plant_mut().source.representation =
            BlockRepresentation::FrequencyResponse;
        data.shaped.servo_controller_mut().properties.k = 2.0;
        data.recompute(RecomputeOptions::default()).unwrap();
        assert_eq!(data.responses.shaped(ResponseType::CurrentPlant), Some(&baseline));
    }

    #[test]
    fn failed_current_plant_resample_leaves_store_untouched() {
        let mut data = BlockLayoutWithData::from_defaults().unwrap();
        data.shaped.current_plant_mut().source.representation =
            BlockRepresentation::FrequencyResponse;
        // An empty baseline cannot be splined onto the working grid.
        data.responses
            .set_original(ResponseType::CurrentPlant, Frd::new(vec![], vec![]).unwrap());
        let responses = data.responses.clone();
        let grid = data.frequency_radians().to_vec();

        data.shaped.servo_controller_mut().properties.k = 2.0;
        assert!(data.recompute(RecomputeOptions::default()).is_err());
        assert_eq!(data.responses, responses);
        assert_eq!(data.frequency_radians(), grid.as_slice());
        assert!(data.responses.shaped(ResponseType::ServoOpenLoop).is_some());
    }

    #[test]
    fn grid_setter_validates() {
        let mut data = BlockLayoutWithData::from_defaults().unwrap();
        assert!(data.set_frequency_grid(vec![3.0, 2.0, 1.0]).is_err());
        data.set_frequency_grid(linspace(100.0, 1000.0, 50)).unwrap();
        assert_eq!(data.frequency_radians().len(), 50);
        data.restore_original_grid();
        assert_eq!(data.frequency_radians().len(), DEFAULT_GRID_POINTS);
    }
}
