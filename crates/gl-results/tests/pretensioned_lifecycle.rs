//! Full lifecycle of a pretensioned girder: release, deck casting,
//! temporary-strand removal, superimposed loads, long-term service.

use gl_core::units::{m, mm2, mpa};
use gl_core::{GirderKey, PoiId, SegmentKey, StrandType, INTERVAL_ALL};
use gl_model::{
    Activity, BridgeBuilder, BridgeModel, Concrete, ForceEffects, Interval, SectionGeometry,
    StrandProfile, Timeline,
};
use gl_results::LossStore;

fn lifecycle_model() -> (BridgeModel, SegmentKey, PoiId, PoiId) {
    let mut b = BridgeBuilder::new();
    let g = b.add_girder(0, 0);
    let seg = b.add_segment(
        g,
        m(30.0),
        Concrete::normal_weight(mpa(35_000.0)),
        SectionGeometry {
            area_m2: 0.5,
            inertia_m4: 0.1,
            centroid_from_top_m: 0.6,
        },
    );
    b.add_strands(
        seg,
        StrandType::Straight,
        30,
        mm2(140.0),
        mpa(1396.0),
        StrandProfile::Straight { ecc: m(0.5) },
    );
    b.add_strands(
        seg,
        StrandType::Harped,
        10,
        mm2(140.0),
        mpa(1396.0),
        StrandProfile::Harped {
            ecc_end: m(0.1),
            ecc_harp: m(0.45),
            harp_point: 0.4,
        },
    );
    b.add_strands(
        seg,
        StrandType::Temporary,
        4,
        mm2(140.0),
        mpa(1396.0),
        StrandProfile::Straight { ecc: m(-0.35) },
    );
    b.set_composite_section(
        seg,
        SectionGeometry {
            area_m2: 0.8,
            inertia_m4: 0.2,
            centroid_from_top_m: 0.4,
        },
    );
    let mid = b.add_poi(seg, m(15.0));
    let quarter = b.add_poi(seg, m(7.5));
    for &poi in &[mid, quarter] {
        // Self weight at release, deck weight at casting, barriers later
        b.set_applied_effects(poi, 0, ForceEffects::moment(2.0e6));
        b.set_applied_effects(poi, 1, ForceEffects::moment(1.5e6));
        b.set_applied_effects(poi, 2, ForceEffects::moment(0.8e6));
    }
    let tl = Timeline::new(vec![
        Interval::new(1.0, 28.0, vec![Activity::ConstructSegments(vec![seg])]),
        Interval::new(28.0, 56.0, vec![Activity::CastDeck(vec![seg])]),
        Interval::new(
            56.0,
            90.0,
            vec![
                Activity::RemoveTemporaryStrands(vec![seg]),
                Activity::ApplyLoad(0),
            ],
        ),
        Interval::new(90.0, 20_000.0, vec![]),
    ])
    .unwrap();
    (b.build(tl).unwrap(), seg, mid, quarter)
}

#[test]
fn every_population_stays_between_zero_and_jacking() {
    let (model, _, mid, quarter) = lifecycle_model();
    let mut store = LossStore::new(&model);
    for &poi in &[mid, quarter] {
        for interval in 0..4 {
            let d = store.losses(poi, interval).unwrap();
            for (_, s) in &d.strands {
                assert!(s.effective_pa > 0.0);
                assert!(s.effective_pa < s.jacking_pa);
            }
        }
    }
}

#[test]
fn time_dependent_losses_accumulate_per_interval() {
    let (model, _, mid, _) = lifecycle_model();
    let mut store = LossStore::new(&model);
    let mut prev = 0.0;
    for interval in 0..4 {
        let s = *store
            .losses(mid, interval)
            .unwrap()
            .strand(StrandType::Straight)
            .unwrap();
        let td = s.time_dependent_pa();
        assert!(td > prev);
        assert!(s.creep_pa > 0.0);
        assert!(s.shrinkage_pa > 0.0);
        assert!(s.relaxation_pa > 0.0);
        prev = td;
    }
}

#[test]
fn sagging_loads_register_as_elastic_gains() {
    let (model, _, mid, _) = lifecycle_model();
    let mut store = LossStore::new(&model);
    let at_release = *store
        .losses(mid, 0)
        .unwrap()
        .strand(StrandType::Straight)
        .unwrap();
    let after_deck = *store
        .losses(mid, 1)
        .unwrap()
        .strand(StrandType::Straight)
        .unwrap();
    assert!(at_release.elastic_external_pa < 0.0);
    assert!(after_deck.elastic_external_pa < at_release.elastic_external_pa);
}

#[test]
fn temporary_strands_exist_only_until_removal() {
    let (model, _, mid, _) = lifecycle_model();
    let mut store = LossStore::new(&model);
    assert!(store
        .losses(mid, 0)
        .unwrap()
        .strand(StrandType::Temporary)
        .is_some());
    assert!(store
        .losses(mid, 1)
        .unwrap()
        .strand(StrandType::Temporary)
        .is_some());
    for interval in 2..4 {
        assert!(store
            .losses(mid, interval)
            .unwrap()
            .strand(StrandType::Temporary)
            .is_none());
    }
}

#[test]
fn harped_strands_lose_less_at_the_quarter_point() {
    // Smaller eccentricity near the end means a smaller share of the
    // flexural component of elastic shortening.
    let (model, _, mid, quarter) = lifecycle_model();
    let mut store = LossStore::new(&model);
    let at_mid = *store
        .losses(mid, 0)
        .unwrap()
        .strand(StrandType::Harped)
        .unwrap();
    let at_quarter = *store
        .losses(quarter, 0)
        .unwrap()
        .strand(StrandType::Harped)
        .unwrap();
    assert!(at_quarter.elastic_shortening_pa < at_mid.elastic_shortening_pa);
}

#[test]
fn interval_all_matches_last_interval() {
    let (model, _, mid, _) = lifecycle_model();
    let mut store = LossStore::new(&model);
    let last = store.losses(mid, 3).unwrap().clone();
    let all = store.losses(mid, INTERVAL_ALL).unwrap().clone();
    assert_eq!(last, all);
}

#[test]
fn girder_aggregate_covers_every_poi_and_interval() {
    let (model, _, mid, quarter) = lifecycle_model();
    let mut store = LossStore::new(&model);
    let agg = store
        .girder_losses(GirderKey::new(0, 0), INTERVAL_ALL)
        .unwrap();
    for &poi in &[mid, quarter] {
        for interval in 0..4 {
            assert!(agg.details_at(poi, interval).is_some());
        }
    }
    assert_eq!(agg.computed_through, Some(3));
}
