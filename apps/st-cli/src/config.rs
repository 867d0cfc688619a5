//! YAML analysis configuration.

use serde::{Deserialize, Serialize};
use st_blocks::ServoLoop;
use st_core::grid::{linspace, logspace};
use st_core::{Real, hz_to_rad};
use st_response::{DEFAULT_GRID_POINTS, DEFAULT_GRID_START_HZ, DEFAULT_GRID_STOP_HZ};

use crate::error::CliResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub start_hz: Real,
    pub stop_hz: Real,
    pub points: usize,
    pub spacing: Spacing,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hz: DEFAULT_GRID_START_HZ,
            stop_hz: DEFAULT_GRID_STOP_HZ,
            points: DEFAULT_GRID_POINTS,
            spacing: Spacing::Linear,
        }
    }
}

impl GridConfig {
    /// Angular frequencies, rad/s.
    pub fn frequency_radians(&self) -> CliResult<Vec<Real>> {
        let (start, stop) = (hz_to_rad(self.start_hz), hz_to_rad(self.stop_hz));
        Ok(match self.spacing {
            Spacing::Linear => linspace(start, stop, self.points),
            Spacing::Log => logspace(start, stop, self.points)?,
        })
    }
}

/// A layout and the grid to analyze it on. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub grid: GridConfig,
    pub layout: ServoLoop,
}

impl AnalysisConfig {
    pub fn from_yaml(text: &str) -> CliResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
