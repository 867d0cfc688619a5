//! Property tests for FRD algebra and grid compatibility.

use proptest::prelude::*;
use st_core::compat::check;
use st_core::grid::logspace;
use st_core::{Complex64, Frd, MIN_FREQUENCIES, TWO_PI};

fn grid_strategy() -> impl Strategy<Value = Vec<f64>> {
    (1.0f64..100.0, 10.0f64..1000.0, MIN_FREQUENCIES..200usize)
        .prop_map(|(lo, span, n)| logspace(lo * TWO_PI, (lo + span) * TWO_PI, n).unwrap())
}

fn response_strategy(n: usize) -> impl Strategy<Value = Vec<Complex64>> {
    prop::collection::vec(
        (-1e3f64..1e3, -1e3f64..1e3).prop_map(|(re, im)| Complex64::new(re, im)),
        n,
    )
}

fn frd_pair() -> impl Strategy<Value = (Frd, Frd)> {
    grid_strategy().prop_flat_map(|g| {
        let n = g.len();
        (Just(g), response_strategy(n), response_strategy(n)).prop_map(|(g, a, b)| {
            (
                Frd::new(g.clone(), a).unwrap(),
                Frd::new(g, b).unwrap(),
            )
        })
    })
}

proptest! {
    #[test]
    fn product_is_pointwise((a, b) in frd_pair()) {
        let p = &a * &b;
        prop_assert_eq!(p.frequency(), a.frequency());
        for i in 0..a.len() {
            prop_assert_eq!(p.response()[i], a.response()[i] * b.response()[i]);
        }
    }

    #[test]
    fn times_reciprocal_is_unity((a, _) in frd_pair()) {
        let one = &a * &a.recip();
        for (x, c) in a.response().iter().zip(one.response()) {
            if x.norm() > 1e-6 {
                prop_assert!((c - Complex64::new(1.0, 0.0)).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn grid_is_compatible_with_itself(g in grid_strategy()) {
        let c = check(&g, &g);
        prop_assert!(c.is_valid && c.is_exact && c.has_overlap);
        prop_assert_eq!(c.overlap, g);
    }

    #[test]
    fn contiguous_subgrid_is_recovered(
        g in grid_strategy(),
        start_frac in 0.0f64..1.0,
    ) {
        let max_start = g.len() - MIN_FREQUENCIES;
        let start = ((max_start as f64) * start_frac) as usize;
        let end = (start + MIN_FREQUENCIES).max(g.len() - (max_start - start) / 2);
        let sub = g[start..end].to_vec();
        let c = check(&g, &sub);
        prop_assert!(c.is_valid);
        prop_assert_eq!(c.overlap, sub);
    }

    #[test]
    fn shifted_grid_is_rejected(g in grid_strategy()) {
        let hi = *g.last().unwrap();
        let disjoint: Vec<f64> = g.iter().map(|w| w + 2.0 * hi).collect();
        prop_assert!(!check(&g, &disjoint).is_valid);
    }
}
