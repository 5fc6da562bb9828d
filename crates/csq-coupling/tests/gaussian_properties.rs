use csq_coupling::{spread_curve_with, synthesize_with, Normalization};
use proptest::prelude::*;

fn normalization() -> impl Strategy<Value = Normalization> {
    prop_oneof![Just(Normalization::OneBased), Just(Normalization::ZeroBased)]
}

proptest! {
    #[test]
    fn reference_site_is_uncoupled(
        n in 1usize..40,
        b in -3.0f64..3.0,
        x1 in -1e6f64..1e6,
        norm in normalization(),
    ) {
        let coeffs = synthesize_with(n, b, x1, norm).unwrap();
        prop_assert_eq!(coeffs.len(), n + 1);
        prop_assert_eq!(coeffs[0], 0.0);
    }

    #[test]
    fn non_negative_scale_gives_non_negative_couplings(
        n in 1usize..40,
        b in -3.0f64..3.0,
        x1 in 0.0f64..1e6,
        norm in normalization(),
    ) {
        let coeffs = synthesize_with(n, b, x1, norm).unwrap();
        prop_assert!(coeffs.iter().all(|&c| c >= 0.0));
    }

    #[test]
    fn zero_spread_is_uniform(n in 1usize..40, x1 in -10.0f64..10.0, norm in normalization()) {
        let coeffs = synthesize_with(n, 0.0, x1, norm).unwrap();
        for &c in &coeffs[1..] {
            prop_assert!((c - x1).abs() <= 1e-12 * x1.abs().max(1.0));
        }
    }

    #[test]
    fn scale_is_linear(
        n in 1usize..40,
        b in 0.0f64..2.0,
        x1 in -1e3f64..1e3,
        norm in normalization(),
    ) {
        let single = synthesize_with(n, b, x1, norm).unwrap();
        let double = synthesize_with(n, b, 2.0 * x1, norm).unwrap();
        for (s, d) in single.iter().zip(&double) {
            prop_assert!((2.0 * s - d).abs() <= 1e-9 * s.abs().max(1.0));
        }
    }

    #[test]
    fn positive_spread_decreases_along_the_bath(n in 2usize..40, b in 0.05f64..3.0) {
        let coeffs = synthesize_with(n, b, 1.0, Normalization::OneBased).unwrap();
        prop_assert!(coeffs[1..].windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn spread_curve_matches_inputs(
        n in 1usize..20,
        x1 in 0.0f64..1e6,
        bs in proptest::collection::vec(0.0f64..1.5, 0..64),
        norm in normalization(),
    ) {
        let curve = spread_curve_with(n, x1, &bs, norm).unwrap();
        prop_assert_eq!(curve.len(), bs.len());
        for (point, &b) in curve.iter().zip(&bs) {
            prop_assert_eq!(point.x, b);
            prop_assert!(point.y >= 0.0);
        }
    }
}

#[test]
fn conventions_differ_in_magnitude() {
    let one = synthesize_with(12, 0.8, 1.0, Normalization::OneBased).unwrap();
    let zero = synthesize_with(12, 0.8, 1.0, Normalization::ZeroBased).unwrap();
    assert!(one[1] > zero[1]);
}
