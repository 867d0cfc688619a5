//! Imported (measured) frequency responses.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use st_core::{Frd, Real};

use crate::error::{BlockError, BlockResult};

/// A measured curve attached to a plant, plus where it came from.
///
/// Parsing the measurement file is the caller's job; this type only stores
/// the resulting FRD and resamples it onto whatever grid the engine uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportedResponse {
    curve: Option<Frd>,
    source_path: Option<PathBuf>,
}

impl ImportedResponse {
    pub fn new(curve: Frd, source_path: Option<PathBuf>) -> Self {
        Self {
            curve: Some(curve),
            source_path,
        }
    }

    pub fn from_frd(curve: Frd) -> Self {
        Self::new(curve, None)
    }

    pub fn is_loaded(&self) -> bool {
        self.curve.is_some()
    }

    pub fn curve(&self) -> Option<&Frd> {
        self.curve.as_ref()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Frequencies the curve was measured at, rad/s.
    pub fn source_frequencies(&self) -> Option<&[Real]> {
        self.curve.as_ref().map(Frd::frequency)
    }

    /// Short description for log and error messages.
    pub fn describe(&self) -> String {
        match &self.source_path {
            Some(p) => p.display().to_string(),
            None => "<in-memory>".to_string(),
        }
    }

    /// Spline-resamples the curve onto `frequencies`.
    pub fn evaluate_at(&self, frequencies: &[Real]) -> BlockResult<Frd> {
        let curve = self.curve.as_ref().ok_or(BlockError::MissingCurve {
            what: "imported response",
        })?;
        Ok(curve.resample(frequencies)?)
    }

    pub fn clear(&mut self) {
        self.curve = None;
        self.source_path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_core::Complex64;
    use st_core::grid::linspace;

    #[test]
    fn empty_response_has_no_curve() {
        let r = ImportedResponse::default();
        assert!(!r.is_loaded());
        assert!(r.source_frequencies().is_none());
        assert!(matches!(r.evaluate_at(&[1.0]), Err(BlockError::MissingCurve { .. })));
    }

    #[test]
    fn evaluate_at_resamples() {
        let g = linspace(10.0, 100.0, 10);
        let frd = Frd::from_fn(&g, |w| Complex64::new(w, -w));
        let r = ImportedResponse::new(frd, Some(PathBuf::from("plant.frd")));
        assert_eq!(r.source_path(), Some(Path::new("plant.frd")));
        let out = r.evaluate_at(&[15.0, 55.0]).unwrap();
        assert!((out.response()[0] - Complex64::new(15.0, -15.0)).norm() < 1e-9);
        assert!((out.response()[1] - Complex64::new(55.0, -55.0)).norm() < 1e-9);
    }
}
