//! Lazy, cached loss lookups.
//!
//! Results are computed per girder on first request and extended in place
//! when a later interval is asked for; finalized intervals are never
//! recomputed. Trial analyses live in a separate cache keyed by girder,
//! holding one configuration at a time: requesting a different trial
//! configuration for a girder discards that girder's trial results.

use std::collections::BTreeMap;

use gl_core::{GirderKey, IntervalIdx, PoiId, TendonKey, INTERVAL_ALL};
use gl_engine::{
    AnchorSetDetails, EngineError, EngineResult, LossDetails, LossEngine, LossesAggregate,
    TendonStressing, TrialConfig,
};
use gl_friction::AnchorSetConfig;
use gl_model::{BridgeModel, JackingEnd, SectionProvider, StructuralResponse, TendonGeometry};
use tracing::debug;

pub struct LossStore<'a> {
    model: &'a BridgeModel,
    sections: &'a dyn SectionProvider,
    tendons: &'a dyn TendonGeometry,
    response: &'a dyn StructuralResponse,
    anchor_cfg: AnchorSetConfig,
    persisted: BTreeMap<GirderKey, LossesAggregate>,
    design: BTreeMap<GirderKey, (TrialConfig, LossesAggregate)>,
}

impl<'a> LossStore<'a> {
    /// Store with the model itself backing every provider seam.
    pub fn new(model: &'a BridgeModel) -> Self {
        Self::with_providers(model, model, model, model)
    }

    pub fn with_providers(
        model: &'a BridgeModel,
        sections: &'a dyn SectionProvider,
        tendons: &'a dyn TendonGeometry,
        response: &'a dyn StructuralResponse,
    ) -> Self {
        Self {
            model,
            sections,
            tendons,
            response,
            anchor_cfg: AnchorSetConfig::default(),
            persisted: BTreeMap::new(),
            design: BTreeMap::new(),
        }
    }

    pub fn with_anchor_config(mut self, cfg: AnchorSetConfig) -> Self {
        self.anchor_cfg = cfg;
        self
    }

    /// Losses at a POI through the end of an interval (`INTERVAL_ALL` for
    /// the end of the timeline), computed from the persisted bridge.
    pub fn losses(&mut self, poi: PoiId, interval: IntervalIdx) -> EngineResult<&LossDetails> {
        let interval = self.resolve_interval(interval)?;
        let girder = self.model.poi(poi)?.segment.girder;
        let agg = self.ensure_persisted(girder, interval)?;
        lookup_details(agg, poi, interval)
    }

    /// Losses at a POI under a trial configuration. Never touches the
    /// persisted cache.
    pub fn losses_trial(
        &mut self,
        poi: PoiId,
        interval: IntervalIdx,
        trial: &TrialConfig,
    ) -> EngineResult<&LossDetails> {
        let interval = self.resolve_interval(interval)?;
        let girder = self.model.poi(poi)?.segment.girder;
        let engine = self.engine().with_trial(trial);

        let entry = self
            .design
            .entry(girder)
            .or_insert_with(|| (trial.clone(), LossesAggregate::new(girder)));
        if entry.0 != *trial {
            debug!(girder = %girder, "trial configuration changed, discarding trial results");
            *entry = (trial.clone(), LossesAggregate::new(girder));
        }
        engine.extend(&mut entry.1, interval)?;
        lookup_details(&entry.1, poi, interval)
    }

    /// Persisted losses at a POI with a transient live-load moment
    /// overlaid. Returns an owned record; the cache is unaffected.
    pub fn losses_with_live_load(
        &mut self,
        poi: PoiId,
        interval: IntervalIdx,
        ll_moment_nm: f64,
    ) -> EngineResult<LossDetails> {
        let interval = self.resolve_interval(interval)?;
        let base = self.losses(poi, interval)?.clone();
        self.engine().with_live_load(poi, interval, &base, ll_moment_nm)
    }

    /// Stressing-time record (friction averages and per-end seating) for
    /// a tendon.
    pub fn anchor_set_details(&mut self, tendon: TendonKey) -> EngineResult<&TendonStressing> {
        self.model.tendon(tendon)?;
        let stressed_at = self
            .model
            .timeline()
            .stressing_interval(tendon)
            .ok_or_else(|| EngineError::InvalidKey {
                what: format!("{tendon} is never stressed"),
            })?;
        let agg = self.ensure_persisted(tendon.girder, stressed_at)?;
        agg.tendon(tendon).ok_or_else(|| EngineError::InvalidKey {
            what: format!("{tendon}"),
        })
    }

    /// Seating record for one jacked end of a tendon.
    pub fn anchor_set_for_end(
        &mut self,
        tendon: TendonKey,
        end: JackingEnd,
    ) -> EngineResult<AnchorSetDetails> {
        let record = self.anchor_set_details(tendon)?;
        record
            .ends
            .get(&end)
            .copied()
            .ok_or_else(|| EngineError::InvalidKey {
                what: format!("{tendon} is not jacked from {end:?}"),
            })
    }

    /// Jacking elongation at one end of a tendon, m.
    pub fn elongation(&mut self, tendon: TendonKey, end: JackingEnd) -> EngineResult<f64> {
        Ok(self.anchor_set_for_end(tendon, end)?.elongation_m)
    }

    /// Length-weighted average friction and anchor-set losses, Pa.
    pub fn avg_friction_and_anchor_set(
        &mut self,
        tendon: TendonKey,
    ) -> EngineResult<(f64, f64)> {
        let record = self.anchor_set_details(tendon)?;
        Ok((record.avg_friction_pa, record.avg_anchor_set_pa))
    }

    /// Full aggregate for a girder through an interval.
    pub fn girder_losses(
        &mut self,
        girder: GirderKey,
        through: IntervalIdx,
    ) -> EngineResult<&LossesAggregate> {
        if !self.model.contains_girder(girder) {
            return Err(EngineError::InvalidKey {
                what: format!("girder {girder}"),
            });
        }
        let through = self.resolve_interval(through)?;
        self.ensure_persisted(girder, through)
    }

    /// Plain-text final-losses report for a girder, through the end of
    /// the timeline.
    pub fn report_final_losses(&mut self, girder: GirderKey) -> EngineResult<String> {
        let model = self.model;
        let agg = self.girder_losses(girder, INTERVAL_ALL)?;
        crate::report::final_losses_report(model, agg)
    }

    /// Drop cached results for one girder (model edit affecting it).
    pub fn invalidate(&mut self, girder: GirderKey) {
        self.persisted.remove(&girder);
        self.design.remove(&girder);
    }

    /// Drop all trial results (end of a design study).
    pub fn clear_design_losses(&mut self) {
        self.design.clear();
    }

    /// Map `INTERVAL_ALL` to the last index; an explicit index past the
    /// end of the timeline is an invalid key, like any other bad lookup.
    fn resolve_interval(&self, interval: IntervalIdx) -> EngineResult<IntervalIdx> {
        self.model
            .timeline()
            .resolve(interval)
            .map_err(|e| EngineError::InvalidKey {
                what: e.to_string(),
            })
    }

    fn engine(&self) -> LossEngine<'a> {
        LossEngine::new(self.model, self.sections, self.tendons, self.response)
            .with_anchor_config(self.anchor_cfg)
    }

    fn ensure_persisted(
        &mut self,
        girder: GirderKey,
        through: IntervalIdx,
    ) -> EngineResult<&LossesAggregate> {
        let engine = self.engine();
        let agg = self
            .persisted
            .entry(girder)
            .or_insert_with(|| LossesAggregate::new(girder));
        // A failed extension keeps the intervals already finalized.
        engine.extend(agg, through)?;
        Ok(agg)
    }
}

fn lookup_details(
    agg: &LossesAggregate,
    poi: PoiId,
    interval: IntervalIdx,
) -> EngineResult<&LossDetails> {
    agg.details_at(poi, interval)
        .ok_or_else(|| EngineError::InvalidKey {
            what: format!("POI {poi} in interval {interval}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::units::{m, mm2, mpa};
    use gl_core::{SegmentKey, StrandType, INTERVAL_ALL};
    use gl_model::{
        Activity, BridgeBuilder, Concrete, ForceEffects, Interval, SectionGeometry,
        StrandProfile, Timeline,
    };

    fn geometry() -> SectionGeometry {
        SectionGeometry {
            area_m2: 0.5,
            inertia_m4: 0.1,
            centroid_from_top_m: 0.6,
        }
    }

    fn simple_model(with_composite: bool) -> (BridgeModel, SegmentKey, PoiId) {
        let mut b = BridgeBuilder::new();
        let g = b.add_girder(0, 0);
        let seg = b.add_segment(g, m(30.0), Concrete::normal_weight(mpa(35_000.0)), geometry());
        b.add_strands(
            seg,
            StrandType::Straight,
            30,
            mm2(140.0),
            mpa(1396.0),
            StrandProfile::Straight { ecc: m(0.5) },
        );
        if with_composite {
            b.set_composite_section(
                seg,
                SectionGeometry {
                    area_m2: 0.8,
                    inertia_m4: 0.2,
                    centroid_from_top_m: 0.4,
                },
            );
        }
        let poi = b.add_poi(seg, m(15.0));
        b.set_applied_effects(poi, 0, ForceEffects::moment(2.0e6));
        let tl = Timeline::new(vec![
            Interval::new(1.0, 28.0, vec![Activity::ConstructSegments(vec![seg])]),
            Interval::new(28.0, 56.0, vec![Activity::CastDeck(vec![seg])]),
            Interval::new(56.0, 20_000.0, vec![]),
        ])
        .unwrap();
        (b.build(tl).unwrap(), seg, poi)
    }

    #[test]
    fn repeated_lookups_are_identical() {
        let (model, _, poi) = simple_model(true);
        let mut store = LossStore::new(&model);
        let first = store.losses(poi, INTERVAL_ALL).unwrap().clone();
        let second = store.losses(poi, INTERVAL_ALL).unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn extension_matches_fresh_computation() {
        let (model, _, poi) = simple_model(true);

        let mut incremental = LossStore::new(&model);
        incremental.losses(poi, 0).unwrap();
        incremental.losses(poi, 1).unwrap();
        let extended = incremental.losses(poi, INTERVAL_ALL).unwrap().clone();

        let mut fresh = LossStore::new(&model);
        let direct = fresh.losses(poi, INTERVAL_ALL).unwrap().clone();
        assert_eq!(extended, direct);
    }

    #[test]
    fn invalidate_forces_recomputation_to_same_answer() {
        let (model, _, poi) = simple_model(true);
        let mut store = LossStore::new(&model);
        let before = store.losses(poi, INTERVAL_ALL).unwrap().clone();
        store.invalidate(GirderKey::new(0, 0));
        let after = store.losses(poi, INTERVAL_ALL).unwrap().clone();
        assert_eq!(before, after);
    }

    #[test]
    fn trial_results_never_touch_persisted_cache() {
        let (model, seg, poi) = simple_model(true);
        let mut store = LossStore::new(&model);
        let persisted = store.losses(poi, INTERVAL_ALL).unwrap().clone();

        let mut trial = TrialConfig::default();
        trial.strand_overrides.insert((seg, StrandType::Straight), 40);
        let tried = store.losses_trial(poi, INTERVAL_ALL, &trial).unwrap().clone();

        // More strands, more elastic shortening per strand
        let p = persisted.strand(StrandType::Straight).unwrap();
        let t = tried.strand(StrandType::Straight).unwrap();
        assert!(t.elastic_shortening_pa > p.elastic_shortening_pa);

        // Persisted answer unchanged afterwards
        assert_eq!(store.losses(poi, INTERVAL_ALL).unwrap(), &persisted);
    }

    #[test]
    fn changing_trial_config_discards_old_trial() {
        let (model, seg, poi) = simple_model(true);
        let mut store = LossStore::new(&model);

        let mut a = TrialConfig::default();
        a.strand_overrides.insert((seg, StrandType::Straight), 40);
        let with_a = store.losses_trial(poi, INTERVAL_ALL, &a).unwrap().clone();

        let mut b = TrialConfig::default();
        b.strand_overrides.insert((seg, StrandType::Straight), 20);
        let with_b = store.losses_trial(poi, INTERVAL_ALL, &b).unwrap().clone();
        assert_ne!(with_a, with_b);

        // Asking for A again recomputes it from scratch, same answer
        let with_a_again = store.losses_trial(poi, INTERVAL_ALL, &a).unwrap().clone();
        assert_eq!(with_a, with_a_again);

        store.clear_design_losses();
        let after_clear = store.losses_trial(poi, INTERVAL_ALL, &a).unwrap().clone();
        assert_eq!(with_a, after_clear);
    }

    #[test]
    fn loss_details_snapshot_round_trips_as_json() {
        let (model, _, poi) = simple_model(true);
        let mut store = LossStore::new(&model);
        let details = store.losses(poi, INTERVAL_ALL).unwrap().clone();
        let json = serde_json::to_string(&details).unwrap();
        let back: LossDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn missing_composite_data_fails_late_intervals_only() {
        // Deck cast but no composite geometry registered: the composite
        // section first acts in interval 2, so intervals 0 and 1 resolve.
        let (model, _, poi) = simple_model(false);
        let mut store = LossStore::new(&model);
        assert!(store.losses(poi, 0).is_ok());
        assert!(store.losses(poi, 1).is_ok());
        let err = store.losses(poi, 2).unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable { interval: 2, .. }));
        // Finalized intervals stay cached and readable after the failure
        assert!(store.losses(poi, 1).is_ok());
    }

    #[test]
    fn live_load_overlay_is_transient() {
        let (model, _, poi) = simple_model(true);
        let mut store = LossStore::new(&model);
        let base = store.losses(poi, INTERVAL_ALL).unwrap().clone();
        let overlaid = store
            .losses_with_live_load(poi, INTERVAL_ALL, 1.2e6)
            .unwrap();
        let b = base.strand(StrandType::Straight).unwrap();
        let o = overlaid.strand(StrandType::Straight).unwrap();
        assert!(o.effective_pa > b.effective_pa);
        assert_eq!(store.losses(poi, INTERVAL_ALL).unwrap(), &base);
    }

    #[test]
    fn out_of_range_interval_is_an_invalid_key() {
        let (model, _, poi) = simple_model(true);
        let mut store = LossStore::new(&model);
        let err = store.losses(poi, 10).unwrap_err();
        assert!(matches!(err, EngineError::InvalidKey { .. }));
        let err = store
            .girder_losses(GirderKey::new(0, 0), 10)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidKey { .. }));
    }

    #[test]
    fn tendonless_girder_has_no_anchor_set_details() {
        let (model, _, _) = simple_model(true);
        let mut store = LossStore::new(&model);
        let err = store
            .anchor_set_details(TendonKey::new(GirderKey::new(0, 0), 0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidKey { .. }));
    }
}
