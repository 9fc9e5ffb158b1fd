//! Property tests for the friction curve and the seating solver.

use gl_core::units::constants::EP_STRAND_PA;
use gl_core::units::{m, mm, mpa};
use gl_friction::{AnchorSetConfig, SeatedProfile};
use gl_model::{DuctPath, DuctSegment, JackedEnds, JackingEnd, StressingData};
use proptest::prelude::*;

fn arb_path() -> impl Strategy<Value = DuctPath> {
    prop::collection::vec((2.0..15.0_f64, 0.0..0.02_f64), 1..5).prop_map(|pieces| {
        DuctPath::new(
            pieces
                .into_iter()
                .map(|(len, curvature)| DuctSegment::curved(m(len), curvature))
                .collect(),
        )
    })
}

fn stressing(dset_mm: f64, wobble: f64, mu: f64, ends: JackedEnds) -> StressingData {
    StressingData {
        jacking: mpa(1396.0),
        jacked_ends: ends,
        anchor_set: mm(dset_mm),
        wobble_per_m: wobble,
        curvature_friction: mu,
    }
}

proptest! {
    #[test]
    fn retained_stress_never_increases_away_from_a_single_jack(
        path in arb_path(),
        wobble in 0.0..2.0e-3_f64,
        mu in 0.0..0.4_f64,
    ) {
        let s = stressing(0.0, wobble, mu, JackedEnds::Start);
        let profile = SeatedProfile::compute(&path, &s, EP_STRAND_PA, &AnchorSetConfig::default()).unwrap();
        let l = path.total_length_m();
        let mut prev = f64::INFINITY;
        for i in 0..=50 {
            let x = l * i as f64 / 50.0;
            let fp = profile.friction().stress_at(x);
            prop_assert!(fp <= prev + 1e-6);
            prop_assert!(fp > 0.0);
            prev = fp;
        }
    }

    #[test]
    fn stress_integral_is_additive(
        path in arb_path(),
        wobble in 0.0..2.0e-3_f64,
        mu in 0.0..0.4_f64,
        split in 0.1..0.9_f64,
    ) {
        let s = stressing(0.0, wobble, mu, JackedEnds::Start);
        let profile = SeatedProfile::compute(&path, &s, EP_STRAND_PA, &AnchorSetConfig::default()).unwrap();
        let curve = profile.friction().curve(JackingEnd::Start).unwrap();
        let l = path.total_length_m();
        let mid = split * l;
        let whole = curve.integral_stress(0.0, l);
        let parts = curve.integral_stress(0.0, mid) + curve.integral_stress(mid, l);
        prop_assert!((whole - parts).abs() <= 1e-6 * whole.abs());
    }

    #[test]
    fn seating_solution_respects_its_bracket(
        path in arb_path(),
        wobble in 1.0e-4..2.0e-3_f64,
        mu in 0.05..0.4_f64,
        dset_mm in 0.0..8.0_f64,
    ) {
        let s = stressing(dset_mm, wobble, mu, JackedEnds::Start);
        let profile = SeatedProfile::compute(&path, &s, EP_STRAND_PA, &AnchorSetConfig::default()).unwrap();
        let seat = profile.seat(JackingEnd::Start).unwrap();
        let l = path.total_length_m();
        prop_assert!(seat.xset_m >= 0.0);
        prop_assert!(seat.xset_m <= l + 1e-9);
        if seat.converged {
            // The implied movement reproduces the physical seating
            prop_assert!((seat.pull_in_m - dset_mm * 1e-3).abs() < 1e-4);
        } else {
            // Saturated: even the full reflection absorbs less than Dset
            prop_assert!(seat.pull_in_m < dset_mm * 1e-3);
        }
        // Seating only ever reduces stress near the anchor
        prop_assert!(profile.stress_at(0.0) <= profile.friction().stress_at(0.0) + 1e-6);
    }

    #[test]
    fn both_end_jacking_retains_at_least_single_end_stress(
        path in arb_path(),
        wobble in 1.0e-4..2.0e-3_f64,
        mu in 0.05..0.4_f64,
    ) {
        let both = SeatedProfile::compute(
            &path,
            &stressing(0.0, wobble, mu, JackedEnds::Both),
            EP_STRAND_PA,
            &AnchorSetConfig::default(),
        )
        .unwrap();
        let start_only = SeatedProfile::compute(
            &path,
            &stressing(0.0, wobble, mu, JackedEnds::Start),
            EP_STRAND_PA,
            &AnchorSetConfig::default(),
        )
        .unwrap();
        let l = path.total_length_m();
        for i in 0..=20 {
            let x = l * i as f64 / 20.0;
            prop_assert!(both.stress_at(x) >= start_only.stress_at(x) - 1e-6);
        }
    }
}
