//! The time-step loss integrator.
//!
//! One [`LossEngine`] analyzes one bridge model through its provider
//! seams. Per girder it sweeps the timeline interval by interval,
//! applying instantaneous effects (strand release, tendon stressing and
//! seating, temporary-strand removal, external loads) and then the
//! time-dependent effects (creep, shrinkage, relaxation) over the
//! interval span, and finalizes a [`LossDetails`] record for every POI.
//!
//! Sign conventions: strand stresses are tensile-positive, concrete
//! fiber stresses compression-positive at the strand level, losses
//! positive when they reduce strand stress. Eccentricities are measured
//! downward from the current section centroid.

use std::collections::BTreeMap;

use crate::aggregate::{
    AnchorSetDetails, DuctState, LossesAggregate, PoiState, StrandState, TendonStressing,
};
use crate::details::LossDetails;
use crate::error::{EngineError, EngineResult};
use crate::sweep::SweepPhase;
use gl_core::units::Stress;
use gl_core::{GirderKey, IntervalIdx, PoiId, SegmentKey, StrandType, TendonKey};
use gl_friction::{AnchorSetConfig, SeatedProfile};
use gl_model::{
    Activity, BridgeModel, ForceEffects, SectionProps, SectionProvider, StructuralResponse,
    TendonGeometry,
};
use tracing::debug;

/// What-if overrides applied on top of the persisted bridge model.
///
/// Trial analyses never touch persisted results; the store keeps them in
/// a separate cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialConfig {
    /// Replacement strand counts, keyed by segment and population. Only
    /// populations defined in the model can be overridden; a zero count
    /// deactivates the population.
    pub strand_overrides: BTreeMap<(SegmentKey, StrandType), u32>,
    /// Replacement jacking stress for every pretensioned population.
    pub jacking_override: Option<Stress>,
}

/// Strand row with trial overrides resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedRow {
    pub(crate) count: u32,
    pub(crate) area_m2: f64,
    pub(crate) jacking_pa: f64,
}

/// Which cumulative bucket an elastic stress change lands in.
#[derive(Debug, Clone, Copy)]
enum ElasticBucket {
    Shortening,
    External,
}

/// One stressed population at a POI, snapshotted for section-level force
/// computations.
#[derive(Debug, Clone, Copy)]
struct Pop {
    kind: PopKind,
    area_m2: f64,
    ecc_m: f64,
    stress_pa: f64,
}

#[derive(Debug, Clone, Copy)]
enum PopKind {
    Strand(StrandType),
    Duct(u32),
}

/// Resolved per-interval data gathered during the initializing phase.
struct IntervalContext {
    start_day: f64,
    end_day: f64,
    constructed: Vec<SegmentKey>,
    stressed: Vec<TendonKey>,
    removed: Vec<SegmentKey>,
    /// Section properties for every POI on a segment constructed by this
    /// interval.
    props: BTreeMap<PoiId, SectionProps>,
}

pub struct LossEngine<'a> {
    model: &'a BridgeModel,
    sections: &'a dyn SectionProvider,
    tendons: &'a dyn TendonGeometry,
    response: &'a dyn StructuralResponse,
    anchor_cfg: AnchorSetConfig,
    trial: Option<&'a TrialConfig>,
}

impl<'a> LossEngine<'a> {
    pub fn new(
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
            trial: None,
        }
    }

    /// Engine with the model itself backing every provider seam.
    pub fn from_model(model: &'a BridgeModel) -> Self {
        Self::new(model, model, model, model)
    }

    pub fn with_anchor_config(mut self, cfg: AnchorSetConfig) -> Self {
        self.anchor_cfg = cfg;
        self
    }

    pub fn with_trial(mut self, trial: &'a TrialConfig) -> Self {
        self.trial = Some(trial);
        self
    }

    /// Sweep one girder from the first interval through `through`
    /// (`INTERVAL_ALL` for the full timeline).
    pub fn analyze(&self, girder: GirderKey, through: IntervalIdx) -> EngineResult<LossesAggregate> {
        if !self.model.contains_girder(girder) {
            return Err(EngineError::InvalidKey {
                what: format!("girder {girder}"),
            });
        }
        let mut agg = LossesAggregate::new(girder);
        self.extend(&mut agg, through)?;
        Ok(agg)
    }

    /// Extend a previous sweep through a later interval. Finalized
    /// intervals are never recomputed; asking for an interval already
    /// covered is a no-op.
    pub fn extend(&self, agg: &mut LossesAggregate, through: IntervalIdx) -> EngineResult<()> {
        let last = self.model.timeline().resolve(through)?;
        let start = match agg.computed_through {
            Some(done) if done >= last => return Ok(()),
            Some(done) => done + 1,
            None => 0,
        };

        let mut phase = SweepPhase::start_at(start);
        while let SweepPhase::Initializing(interval) = phase {
            let ctx = self.initialize(agg.girder, interval)?;
            phase = phase.advance(last);
            self.apply_instantaneous(agg, interval, &ctx)?;
            phase = phase.advance(last);
            self.apply_time_dependent(agg, interval, &ctx)?;
            phase = phase.advance(last);
            self.finalize_interval(agg, interval)?;
            phase = phase.advance(last);
        }
        debug_assert!(phase.is_complete());
        Ok(())
    }

    /// Overlay the elastic effect of a transient live-load moment on a
    /// finalized detail record. The gain exists only in the returned
    /// copy; it never feeds the time-dependent state.
    pub fn with_live_load(
        &self,
        poi: PoiId,
        interval: IntervalIdx,
        base: &LossDetails,
        ll_moment_nm: f64,
    ) -> EngineResult<LossDetails> {
        let mut out = base.clone();
        if ll_moment_nm == 0.0 || out.is_empty() {
            return Ok(out);
        }
        let interval = self.model.timeline().resolve(interval)?;
        let props = self
            .sections
            .transformed_properties(poi, interval)
            .map_err(|e| EngineError::for_interval(interval, e))?;
        let n = props.modular_ratio;
        let girder = self.model.poi(poi)?.segment.girder;
        let x_m = self.model.girder_offset_m(poi)?;

        for (&ty, s) in out.strands.iter_mut() {
            let e = self.model.eccentricity_m(poi, interval, ty)?;
            let delta = n * (-ll_moment_nm * e / props.inertia_m4);
            s.elastic_external_pa += delta;
            s.effective_pa -= delta;
        }
        for (&duct, d) in out.ducts.iter_mut() {
            if d.stress_pa == 0.0 {
                continue;
            }
            let key = TendonKey::new(girder, duct);
            let e = self.tendons.eccentricity_m(key, x_m, interval)?;
            let delta = n * (-ll_moment_nm * e / props.inertia_m4);
            d.stress_pa -= delta;
            d.force_n = d.stress_pa * self.tendons.tendon_area_m2(key)?;
        }
        Ok(out)
    }

    /// Strand row with trial overrides applied.
    pub(crate) fn resolved_strands(
        &self,
        segment: SegmentKey,
        strand_type: StrandType,
    ) -> EngineResult<Option<ResolvedRow>> {
        let Some(row) = self.model.strand_row(segment, strand_type)? else {
            return Ok(None);
        };
        let mut count = row.count;
        let mut jacking_pa = row.jacking.value;
        if let Some(trial) = self.trial {
            if let Some(&c) = trial.strand_overrides.get(&(segment, strand_type)) {
                count = c;
            }
            if let Some(j) = trial.jacking_override {
                jacking_pa = j.value;
            }
        }
        Ok(Some(ResolvedRow {
            count,
            area_m2: f64::from(count) * row.strand_area.value,
            jacking_pa,
        }))
    }

    fn initialize(&self, girder: GirderKey, interval: IntervalIdx) -> EngineResult<IntervalContext> {
        let timeline = self.model.timeline();
        let ivl = timeline.interval(interval)?;
        let (start_day, end_day) = (ivl.start_day, ivl.end_day);

        let mut constructed = Vec::new();
        let mut stressed = Vec::new();
        let mut removed = Vec::new();
        for activity in timeline.activities(interval)? {
            match activity {
                Activity::ConstructSegments(segs) => {
                    constructed.extend(segs.iter().copied().filter(|s| s.girder == girder));
                }
                Activity::StressTendon(t) => {
                    if t.girder == girder {
                        stressed.push(*t);
                    }
                }
                Activity::RemoveTemporaryStrands(segs) => {
                    removed.extend(segs.iter().copied().filter(|s| s.girder == girder));
                }
                // Composite switch and load registration are resolved by
                // the providers; nothing to collect here.
                Activity::CastDeck(_) | Activity::ApplyLoad(_) => {}
            }
        }
        stressed.sort();

        let mut props = BTreeMap::new();
        for &poi in self.model.girder_pois(girder)? {
            let segment = self.model.poi(poi)?.segment;
            let built = matches!(
                timeline.construction_interval(segment),
                Some(c) if c <= interval
            );
            if built {
                let p = self
                    .sections
                    .transformed_properties(poi, interval)
                    .map_err(|e| EngineError::for_interval(interval, e))?;
                props.insert(poi, p);
            }
        }

        Ok(IntervalContext {
            start_day,
            end_day,
            constructed,
            stressed,
            removed,
            props,
        })
    }

    fn apply_instantaneous(
        &self,
        agg: &mut LossesAggregate,
        interval: IntervalIdx,
        ctx: &IntervalContext,
    ) -> EngineResult<()> {
        let girder = agg.girder;

        // Segment construction: create POI states at jacking, then apply
        // elastic shortening from the full release force.
        for &segment in &ctx.constructed {
            let types = agg.state.tracker.active_types(self, segment)?;
            let on_segment: Vec<PoiId> = self
                .model
                .girder_pois(girder)?
                .iter()
                .copied()
                .filter(|&p| {
                    self.model
                        .poi(p)
                        .map(|poi| poi.segment == segment)
                        .unwrap_or(false)
                })
                .collect();
            for poi in on_segment {
                let x_m = self.model.girder_offset_m(poi)?;
                let mut state = PoiState::new(segment, x_m);
                for tendon in self.model.tendon_keys(girder)? {
                    state.ducts.insert(
                        tendon.duct,
                        DuctState {
                            area_m2: self.tendons.tendon_area_m2(tendon)?,
                            stress_pa: 0.0,
                        },
                    );
                }
                for &ty in &types {
                    if let Some(row) = self.resolved_strands(segment, ty)? {
                        state
                            .strands
                            .insert(ty, StrandState::at_jacking(row.area_m2, row.jacking_pa));
                    }
                }

                let props = props_for(ctx, interval, poi)?;
                let pops = self.populations(poi, interval, &state)?;
                let release_n: f64 = pops.iter().map(|p| p.area_m2 * p.stress_pa).sum();
                let release_m: f64 = pops
                    .iter()
                    .map(|p| -p.area_m2 * p.stress_pa * p.ecc_m)
                    .sum();
                self.apply_elastic(
                    poi,
                    interval,
                    &mut state,
                    &props,
                    release_n,
                    release_m,
                    ElasticBucket::Shortening,
                )?;
                agg.state.pois.insert(poi, state);
            }
        }

        // Tendon stressing and seating, in duct order. Each tendon sees
        // the elastic state left by the previous one.
        let ep_pa = self.model.strand_steel().modulus.value;
        for &tendon in &ctx.stressed {
            let path = self.tendons.duct_path(tendon)?;
            let stressing = self.tendons.stressing(tendon)?;
            let profile = SeatedProfile::compute(path, stressing, ep_pa, &self.anchor_cfg)?;

            let mut ends = BTreeMap::new();
            for seat in profile.seats() {
                ends.insert(
                    seat.end,
                    AnchorSetDetails {
                        xset_m: seat.xset_m,
                        anchor_set_loss_pa: seat.anchor_loss_pa,
                        friction_loss_at_xset_pa: profile.friction().jacking_pa()
                            - seat.stress_at_xset_pa,
                        elongation_m: seat.elongation_m,
                        converged: seat.converged,
                    },
                );
            }
            let record = TendonStressing {
                ends,
                avg_friction_pa: profile.avg_friction_loss_pa(),
                avg_anchor_set_pa: profile.avg_anchor_set_loss_pa(ep_pa),
            };

            let area_m2 = self.tendons.tendon_area_m2(tendon)?;
            let poi_ids: Vec<PoiId> = agg.state.pois.keys().copied().collect();
            for poi in poi_ids {
                let props = props_for(ctx, interval, poi)?;
                let Some(state) = agg.state.pois.get_mut(&poi) else {
                    continue;
                };
                let x_m = state.x_m;
                let ecc = self.tendons.eccentricity_m(tendon, x_m, interval)?;
                let seated_pa = profile.stress_at(x_m);
                let delta_p = area_m2 * seated_pa;
                self.apply_elastic(
                    poi,
                    interval,
                    state,
                    &props,
                    delta_p,
                    -delta_p * ecc,
                    ElasticBucket::Shortening,
                )?;
                if let Some(duct) = state.ducts.get_mut(&tendon.duct) {
                    duct.stress_pa = seated_pa;
                }
            }
            agg.tendons.insert(tendon, record);
        }

        // Temporary-strand removal: the remaining populations gain from
        // the decompression.
        for &segment in &ctx.removed {
            let on_segment: Vec<PoiId> = agg
                .state
                .pois
                .iter()
                .filter(|(_, s)| s.segment == segment)
                .map(|(&p, _)| p)
                .collect();
            for poi in on_segment {
                let props = props_for(ctx, interval, poi)?;
                let ecc = self.model.eccentricity_m(poi, interval, StrandType::Temporary)?;
                let Some(state) = agg.state.pois.get_mut(&poi) else {
                    continue;
                };
                let Some(temp) = state.strands.remove(&StrandType::Temporary) else {
                    continue;
                };
                let delta_p = -temp.area_m2 * temp.stress_pa;
                self.apply_elastic(
                    poi,
                    interval,
                    state,
                    &props,
                    delta_p,
                    -delta_p * ecc,
                    ElasticBucket::Shortening,
                )?;
            }
        }

        // External loads applied this interval.
        let poi_ids: Vec<PoiId> = agg.state.pois.keys().copied().collect();
        for poi in poi_ids {
            let effects = self
                .response
                .applied_effects(poi, interval)
                .map_err(|e| EngineError::for_interval(interval, e))?;
            if effects == ForceEffects::default() {
                continue;
            }
            let props = props_for(ctx, interval, poi)?;
            let Some(state) = agg.state.pois.get_mut(&poi) else {
                continue;
            };
            self.apply_elastic(
                poi,
                interval,
                state,
                &props,
                effects.axial_n,
                effects.moment_nm,
                ElasticBucket::External,
            )?;
            state.sustained_axial_n += effects.axial_n;
            state.sustained_moment_nm += effects.moment_nm;
        }

        Ok(())
    }

    /// Creep, shrinkage, and relaxation over the interval span, with the
    /// elastic recovery from the restraining force removed.
    fn apply_time_dependent(
        &self,
        agg: &mut LossesAggregate,
        interval: IntervalIdx,
        ctx: &IntervalContext,
    ) -> EngineResult<()> {
        let duration = ctx.end_day - ctx.start_day;
        if duration <= 0.0 {
            return Ok(());
        }
        let steel = *self.model.strand_steel();
        let ep_pa = steel.modulus.value;

        let poi_ids: Vec<PoiId> = agg.state.pois.keys().copied().collect();
        for poi in poi_ids {
            let props = props_for(ctx, interval, poi)?;
            let Some(state_ref) = agg.state.pois.get(&poi) else {
                continue;
            };
            let pops = self.populations(poi, interval, state_ref)?;
            if pops.is_empty() {
                continue;
            }
            let segment = state_ref.segment;
            let sustained_n = state_ref.sustained_axial_n;
            let sustained_m = state_ref.sustained_moment_nm;

            let concrete = self.model.segment(segment)?.concrete;
            let t0 = self
                .model
                .timeline()
                .age_at_start(segment, interval)
                .unwrap_or(0.0);
            let t1 = t0 + duration;
            let d_creep = concrete.creep_increment(t0, t1);
            let d_shrinkage = concrete.shrinkage_increment(t0, t1);
            let n = props.modular_ratio;

            // Unrestrained increments per population.
            let free: Vec<(f64, f64, f64)> = pops
                .iter()
                .map(|p| {
                    let fc = concrete_stress(&pops, &props, sustained_n, sustained_m, p.ecc_m);
                    let creep = n * d_creep * fc;
                    let shrinkage = ep_pa * d_shrinkage;
                    let relaxation =
                        steel.relaxation_increment(p.stress_pa, ctx.start_day, ctx.end_day);
                    (creep, shrinkage, relaxation)
                })
                .collect();

            // The prestress force shed by the free increments decompresses
            // the concrete; the elastic recovery offsets part of the loss.
            let mut restraint_n = 0.0;
            let mut restraint_m = 0.0;
            for (p, &(c, s, r)) in pops.iter().zip(&free) {
                let total = c + s + r;
                restraint_n += p.area_m2 * total;
                restraint_m += p.area_m2 * total * p.ecc_m;
            }

            let Some(state) = agg.state.pois.get_mut(&poi) else {
                continue;
            };
            for (p, &(creep, shrinkage, relaxation)) in pops.iter().zip(&free) {
                // Recovery is split across the buckets by magnitude; the
                // shares sum to the net even when the signed increments
                // nearly cancel (creep gain against shrinkage loss).
                let magnitude = creep.abs() + shrinkage.abs() + relaxation.abs();
                if magnitude == 0.0 {
                    continue;
                }
                let recovery = n
                    * (restraint_n / props.area_m2
                        + restraint_m * p.ecc_m / props.inertia_m4);
                let net = creep + shrinkage + relaxation - recovery;
                match p.kind {
                    PopKind::Strand(ty) => {
                        if let Some(s) = state.strands.get_mut(&ty) {
                            s.creep_pa += creep - recovery * creep.abs() / magnitude;
                            s.shrinkage_pa += shrinkage - recovery * shrinkage.abs() / magnitude;
                            s.relaxation_pa +=
                                relaxation - recovery * relaxation.abs() / magnitude;
                            s.stress_pa -= net;
                        }
                    }
                    PopKind::Duct(duct) => {
                        if let Some(d) = state.ducts.get_mut(&duct) {
                            d.stress_pa -= net;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn finalize_interval(
        &self,
        agg: &mut LossesAggregate,
        interval: IntervalIdx,
    ) -> EngineResult<()> {
        for &poi in self.model.girder_pois(agg.girder)? {
            let details = agg
                .state
                .pois
                .get(&poi)
                .map(PoiState::to_details)
                .unwrap_or_default();
            agg.details.insert((poi, interval), details);
        }
        agg.computed_through = Some(interval);
        debug!(
            girder = %agg.girder,
            interval,
            pois = agg.state.pois.len(),
            "finalized loss interval"
        );
        Ok(())
    }

    /// Apply an elastic concrete-stress change to every stressed
    /// population at one POI.
    ///
    /// `axial_n`/`moment_nm` follow the external convention (compression
    /// positive, sagging positive); a prestress increment `dP` at
    /// eccentricity `e` maps to `(dP, -dP * e)`.
    #[allow(clippy::too_many_arguments)]
    fn apply_elastic(
        &self,
        poi: PoiId,
        interval: IntervalIdx,
        state: &mut PoiState,
        props: &SectionProps,
        axial_n: f64,
        moment_nm: f64,
        bucket: ElasticBucket,
    ) -> EngineResult<()> {
        let n = props.modular_ratio;
        let types: Vec<StrandType> = state.strands.keys().copied().collect();
        for ty in types {
            let ecc = self.model.eccentricity_m(poi, interval, ty)?;
            let dfc = axial_n / props.area_m2 - moment_nm * ecc / props.inertia_m4;
            let delta = n * dfc;
            if let Some(s) = state.strands.get_mut(&ty) {
                s.stress_pa -= delta;
                match bucket {
                    ElasticBucket::Shortening => s.es_pa += delta,
                    ElasticBucket::External => s.ext_pa += delta,
                }
            }
        }

        let girder = state.segment.girder;
        let x_m = state.x_m;
        let stressed: Vec<u32> = state
            .ducts
            .iter()
            .filter(|(_, d)| d.stress_pa != 0.0)
            .map(|(&k, _)| k)
            .collect();
        for duct in stressed {
            let ecc = self
                .tendons
                .eccentricity_m(TendonKey::new(girder, duct), x_m, interval)?;
            let dfc = axial_n / props.area_m2 - moment_nm * ecc / props.inertia_m4;
            if let Some(d) = state.ducts.get_mut(&duct) {
                d.stress_pa -= n * dfc;
            }
        }
        Ok(())
    }

    /// Snapshot of the stressed populations at a POI (ducts with zero
    /// stress carry no force and are excluded).
    fn populations(
        &self,
        poi: PoiId,
        interval: IntervalIdx,
        state: &PoiState,
    ) -> EngineResult<Vec<Pop>> {
        let mut pops = Vec::with_capacity(state.strands.len() + state.ducts.len());
        for (&ty, s) in &state.strands {
            pops.push(Pop {
                kind: PopKind::Strand(ty),
                area_m2: s.area_m2,
                ecc_m: self.model.eccentricity_m(poi, interval, ty)?,
                stress_pa: s.stress_pa,
            });
        }
        let girder = state.segment.girder;
        for (&duct, d) in &state.ducts {
            if d.stress_pa == 0.0 {
                continue;
            }
            pops.push(Pop {
                kind: PopKind::Duct(duct),
                area_m2: d.area_m2,
                ecc_m: self
                    .tendons
                    .eccentricity_m(TendonKey::new(girder, duct), state.x_m, interval)?,
                stress_pa: d.stress_pa,
            });
        }
        Ok(pops)
    }
}

/// Concrete fiber stress at eccentricity `e` from the current prestress
/// plus sustained external effects. Compression positive.
fn concrete_stress(
    pops: &[Pop],
    props: &SectionProps,
    sustained_axial_n: f64,
    sustained_moment_nm: f64,
    e_m: f64,
) -> f64 {
    let mut force_n = 0.0;
    let mut moment_nm = 0.0;
    for pop in pops {
        let f = pop.area_m2 * pop.stress_pa;
        force_n += f;
        moment_nm += f * pop.ecc_m;
    }
    (force_n + sustained_axial_n) / props.area_m2
        + (moment_nm - sustained_moment_nm) * e_m / props.inertia_m4
}

fn props_for(
    ctx: &IntervalContext,
    interval: IntervalIdx,
    poi: PoiId,
) -> EngineResult<SectionProps> {
    ctx.props
        .get(&poi)
        .copied()
        .ok_or_else(|| EngineError::DataUnavailable {
            interval,
            what: format!("section properties at POI {poi}"),
        })
}
