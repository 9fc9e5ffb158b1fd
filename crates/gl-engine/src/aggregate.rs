//! Accumulated loss results for one girder.

use std::collections::BTreeMap;

use crate::details::{DuctLoss, LossDetails, StrandLoss};
use crate::strands::StrandTracker;
use gl_core::{GirderKey, IntervalIdx, PoiId, SegmentKey, StrandType, TendonKey};
use gl_model::JackingEnd;

/// Seating solution recorded for one jacked end of a tendon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSetDetails {
    /// Seating penetration length from the jacking end, m.
    pub xset_m: f64,
    /// Anchor-set loss at the jacking face, Pa.
    pub anchor_set_loss_pa: f64,
    /// Friction loss at Xset (the reflection pivot), Pa.
    pub friction_loss_at_xset_pa: f64,
    /// Jacking elongation over the full duct, m.
    pub elongation_m: f64,
    /// False when the seating search saturated or hit its iteration cap.
    pub converged: bool,
}

/// Stressing-time record for one tendon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TendonStressing {
    pub ends: BTreeMap<JackingEnd, AnchorSetDetails>,
    /// Length-weighted average friction loss, Pa.
    pub avg_friction_pa: f64,
    /// Length-weighted average anchor-set loss, Pa.
    pub avg_anchor_set_pa: f64,
}

/// All losses computed for one girder, extended interval by interval.
///
/// Details are keyed `(poi, interval)` and exist for every girder POI and
/// every finalized interval, so lookups after a successful run are total.
#[derive(Debug, Clone)]
pub struct LossesAggregate {
    pub girder: GirderKey,
    /// Highest interval finalized so far; `None` before the first.
    pub computed_through: Option<IntervalIdx>,
    pub details: BTreeMap<(PoiId, IntervalIdx), LossDetails>,
    pub tendons: BTreeMap<TendonKey, TendonStressing>,
    pub(crate) state: SweepState,
}

impl LossesAggregate {
    pub fn new(girder: GirderKey) -> Self {
        Self {
            girder,
            computed_through: None,
            details: BTreeMap::new(),
            tendons: BTreeMap::new(),
            state: SweepState::default(),
        }
    }

    pub fn details_at(&self, poi: PoiId, interval: IntervalIdx) -> Option<&LossDetails> {
        self.details.get(&(poi, interval))
    }

    pub fn tendon(&self, key: TendonKey) -> Option<&TendonStressing> {
        self.tendons.get(&key)
    }
}

/// Rolling integrator state carried between intervals.
#[derive(Debug, Clone, Default)]
pub(crate) struct SweepState {
    pub(crate) pois: BTreeMap<PoiId, PoiState>,
    pub(crate) tracker: StrandTracker,
}

/// Rolling state of one POI: current stresses and loss buckets of every
/// population plus the sustained external effects seen so far.
#[derive(Debug, Clone)]
pub(crate) struct PoiState {
    pub(crate) segment: SegmentKey,
    /// Girder coordinate, m.
    pub(crate) x_m: f64,
    pub(crate) strands: BTreeMap<StrandType, StrandState>,
    pub(crate) ducts: BTreeMap<u32, DuctState>,
    pub(crate) sustained_axial_n: f64,
    pub(crate) sustained_moment_nm: f64,
}

impl PoiState {
    pub(crate) fn new(segment: SegmentKey, x_m: f64) -> Self {
        Self {
            segment,
            x_m,
            strands: BTreeMap::new(),
            ducts: BTreeMap::new(),
            sustained_axial_n: 0.0,
            sustained_moment_nm: 0.0,
        }
    }

    /// Snapshot the rolling state as a detail record.
    pub(crate) fn to_details(&self) -> LossDetails {
        let mut details = LossDetails::default();
        for (&ty, s) in &self.strands {
            details.strands.insert(
                ty,
                StrandLoss {
                    jacking_pa: s.jacking_pa,
                    elastic_shortening_pa: s.es_pa,
                    elastic_external_pa: s.ext_pa,
                    creep_pa: s.creep_pa,
                    shrinkage_pa: s.shrinkage_pa,
                    relaxation_pa: s.relaxation_pa,
                    effective_pa: s.stress_pa,
                },
            );
        }
        for (&duct, d) in &self.ducts {
            details.ducts.insert(
                duct,
                DuctLoss {
                    stress_pa: d.stress_pa,
                    force_n: d.stress_pa * d.area_m2,
                },
            );
        }
        details
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StrandState {
    pub(crate) area_m2: f64,
    pub(crate) jacking_pa: f64,
    pub(crate) stress_pa: f64,
    pub(crate) es_pa: f64,
    pub(crate) ext_pa: f64,
    pub(crate) creep_pa: f64,
    pub(crate) shrinkage_pa: f64,
    pub(crate) relaxation_pa: f64,
}

impl StrandState {
    pub(crate) fn at_jacking(area_m2: f64, jacking_pa: f64) -> Self {
        Self {
            area_m2,
            jacking_pa,
            stress_pa: jacking_pa,
            es_pa: 0.0,
            ext_pa: 0.0,
            creep_pa: 0.0,
            shrinkage_pa: 0.0,
            relaxation_pa: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DuctState {
    pub(crate) area_m2: f64,
    pub(crate) stress_pa: f64,
}
