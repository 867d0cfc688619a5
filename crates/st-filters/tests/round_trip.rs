//! Parameter → coefficient → parameter round trips for every filter type.

use proptest::prelude::*;
use st_filters::{Filter, FilterDesign, FilterType, StandardDesign};

const FS: f64 = 20_000.0;

fn close(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= 1e-6 * x.abs().max(1.0))
}

fn assert_round_trip(t: FilterType, p: Vec<f64>) -> Result<(), TestCaseError> {
    let c = StandardDesign
        .forward(t, &p, FS)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let back = StandardDesign
        .backward(t, &c, FS)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert!(close(&p, &back), "{t}: {p:?} -> {back:?}");
    Ok(())
}

proptest! {
    #[test]
    fn low_pass(fc in 10.0f64..9000.0) {
        assert_round_trip(FilterType::LowPass, vec![fc])?;
    }

    #[test]
    fn high_pass(fc in 10.0f64..9000.0) {
        assert_round_trip(FilterType::HighPass, vec![fc])?;
    }

    #[test]
    fn lead_lag(f in 10.0f64..8000.0, phase in -80.0f64..80.0) {
        assert_round_trip(FilterType::LeadLag, vec![f, phase])?;
    }

    #[test]
    fn notch(f in 50.0f64..8000.0, width_frac in 0.01f64..0.5, depth in 6.0f64..60.0) {
        assert_round_trip(FilterType::Notch, vec![f, f * width_frac, depth])?;
    }

    #[test]
    fn resonant(f in 50.0f64..8000.0, width_frac in 0.01f64..0.5, gain in 6.0f64..40.0) {
        assert_round_trip(FilterType::Resonant, vec![f, f * width_frac, gain])?;
    }

    #[test]
    fn custom(c in prop::collection::vec(-2.0f64..2.0, 5)) {
        assert_round_trip(FilterType::Custom, c)?;
    }

    #[test]
    fn resampling_preserves_notch(
        f in 100.0f64..3000.0,
        depth in 6.0f64..40.0,
        fs in 8000.0f64..40_000.0,
    ) {
        let mut filter = Filter::with_parameters(FilterType::Notch, vec![f, f * 0.1, depth]).unwrap();
        filter.set_sampling_frequency(fs).unwrap();
        prop_assert!(close(filter.parameters(), &[f, f * 0.1, depth]));
    }
}

#[test]
fn empty_round_trip_is_trivial() {
    let c = StandardDesign.forward(FilterType::Empty, &[], FS).unwrap();
    assert!(StandardDesign.backward(FilterType::Empty, &c, FS).unwrap().is_empty());
}
