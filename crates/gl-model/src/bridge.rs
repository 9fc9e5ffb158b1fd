//! In-memory bridge model implementing every provider seam.
//!
//! Built incrementally with [`BridgeBuilder`], validated and frozen by
//! `build()`. The surrounding application can substitute its own provider
//! implementations; this one backs the integration tests and simple hosts.

use std::collections::BTreeMap;

use crate::error::{ModelError, ModelResult};
use crate::materials::{Concrete, Strand};
use crate::response::{ForceEffects, StructuralResponse};
use crate::section::{SectionGeometry, SectionProps, SectionProvider};
use crate::tendon::{DuctPath, StressingData, TendonGeometry};
use crate::timeline::{Activity, Timeline};
use gl_core::units::{Area, Length, Stress};
use gl_core::{GirderKey, IntervalIdx, PoiId, SegmentKey, StrandType, TendonKey};

/// A point of interest along a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poi {
    pub id: PoiId,
    pub segment: SegmentKey,
    /// Longitudinal offset from the segment start, m.
    pub offset_m: f64,
}

/// Vertical profile of a strand population, as eccentricity below the
/// noncomposite section centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrandProfile {
    Straight {
        ecc: Length,
    },
    /// Symmetric harp: linear from each end to the harp point, constant
    /// between harp points. `harp_point` is a fraction of segment length,
    /// in (0, 0.5].
    Harped {
        ecc_end: Length,
        ecc_harp: Length,
        harp_point: f64,
    },
}

impl StrandProfile {
    pub(crate) fn ecc_at(&self, x_m: f64, seg_len_m: f64) -> f64 {
        match *self {
            StrandProfile::Straight { ecc } => ecc.value,
            StrandProfile::Harped {
                ecc_end,
                ecc_harp,
                harp_point,
            } => {
                let frac = if seg_len_m > 0.0 { x_m / seg_len_m } else { 0.0 };
                let frac = frac.clamp(0.0, 1.0);
                // Mirror about midspan
                let f = frac.min(1.0 - frac);
                if f >= harp_point {
                    ecc_harp.value
                } else {
                    gl_core::lerp(0.0, ecc_end.value, harp_point, ecc_harp.value, f)
                }
            }
        }
    }
}

/// One pretensioned strand population on a segment.
#[derive(Debug, Clone, Copy)]
pub struct StrandRow {
    pub count: u32,
    /// Area of a single strand.
    pub strand_area: Area,
    /// Stress at jacking, before transfer.
    pub jacking: Stress,
    pub profile: StrandProfile,
}

impl StrandRow {
    pub fn total_area_m2(&self) -> f64 {
        f64::from(self.count) * self.strand_area.value
    }
}

/// One precast segment.
#[derive(Debug, Clone)]
pub struct SegmentData {
    pub length_m: f64,
    pub concrete: Concrete,
    /// Noncomposite transformed geometry.
    pub section: SectionGeometry,
    /// Composite transformed geometry, valid after the deck acts.
    pub composite: Option<SectionGeometry>,
    pub strands: BTreeMap<StrandType, StrandRow>,
}

/// One post-tensioning tendon.
#[derive(Debug, Clone)]
pub struct TendonData {
    pub path: DuctPath,
    pub strand_count: u32,
    pub strand_area: Area,
    pub stressing: StressingData,
    /// Eccentricity below the noncomposite centroid at the anchorages.
    pub ecc_end: Length,
    /// Eccentricity below the noncomposite centroid at midlength.
    pub ecc_mid: Length,
}

impl TendonData {
    pub fn total_area_m2(&self) -> f64 {
        f64::from(self.strand_count) * self.strand_area.value
    }

    /// Parabolic drape between the anchorage and midlength eccentricities.
    fn profile_ecc_m(&self, x_m: f64, girder_len_m: f64) -> f64 {
        if girder_len_m <= 0.0 {
            return self.ecc_mid.value;
        }
        let xi = 2.0 * (x_m / girder_len_m).clamp(0.0, 1.0) - 1.0;
        self.ecc_mid.value + (self.ecc_end.value - self.ecc_mid.value) * xi * xi
    }
}

#[derive(Debug, Clone, Default)]
struct GirderData {
    segments: BTreeMap<u32, SegmentData>,
    tendons: BTreeMap<u32, TendonData>,
    pois: Vec<PoiId>,
}

/// Frozen in-memory bridge model.
#[derive(Debug, Clone)]
pub struct BridgeModel {
    timeline: Timeline,
    strand_steel: Strand,
    girders: BTreeMap<GirderKey, GirderData>,
    pois: Vec<Poi>,
    effects: BTreeMap<(PoiId, IntervalIdx), ForceEffects>,
}

impl BridgeModel {
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn strand_steel(&self) -> &Strand {
        &self.strand_steel
    }

    pub fn girder_keys(&self) -> impl Iterator<Item = GirderKey> + '_ {
        self.girders.keys().copied()
    }

    pub fn contains_girder(&self, girder: GirderKey) -> bool {
        self.girders.contains_key(&girder)
    }

    pub fn girder_pois(&self, girder: GirderKey) -> ModelResult<&[PoiId]> {
        Ok(&self.girder(girder)?.pois)
    }

    pub fn poi(&self, id: PoiId) -> ModelResult<&Poi> {
        self.pois
            .get(id.index() as usize)
            .ok_or(ModelError::UnknownPoi(id))
    }

    pub fn segment(&self, key: SegmentKey) -> ModelResult<&SegmentData> {
        self.girder(key.girder)?
            .segments
            .get(&key.segment)
            .ok_or(ModelError::UnknownSegment(key))
    }

    pub fn segment_keys(&self, girder: GirderKey) -> ModelResult<Vec<SegmentKey>> {
        Ok(self
            .girder(girder)?
            .segments
            .keys()
            .map(|&s| SegmentKey::new(girder, s))
            .collect())
    }

    pub fn strand_row(
        &self,
        segment: SegmentKey,
        strand_type: StrandType,
    ) -> ModelResult<Option<&StrandRow>> {
        Ok(self.segment(segment)?.strands.get(&strand_type))
    }

    pub fn tendon_keys(&self, girder: GirderKey) -> ModelResult<Vec<TendonKey>> {
        Ok(self
            .girder(girder)?
            .tendons
            .keys()
            .map(|&d| TendonKey::new(girder, d))
            .collect())
    }

    pub fn tendon(&self, key: TendonKey) -> ModelResult<&TendonData> {
        self.girder(key.girder)?
            .tendons
            .get(&key.duct)
            .ok_or(ModelError::UnknownTendon(key))
    }

    /// Girder coordinate of a POI: offset plus the lengths of all
    /// preceding segments.
    pub fn girder_offset_m(&self, id: PoiId) -> ModelResult<f64> {
        let poi = self.poi(id)?;
        let girder = self.girder(poi.segment.girder)?;
        let mut x = poi.offset_m;
        for (&idx, seg) in &girder.segments {
            if idx < poi.segment.segment {
                x += seg.length_m;
            }
        }
        Ok(x)
    }

    pub fn girder_length_m(&self, girder: GirderKey) -> ModelResult<f64> {
        Ok(self
            .girder(girder)?
            .segments
            .values()
            .map(|s| s.length_m)
            .sum())
    }

    /// Eccentricity of a strand population below the current section
    /// centroid at a POI.
    pub fn eccentricity_m(
        &self,
        id: PoiId,
        interval: IntervalIdx,
        strand_type: StrandType,
    ) -> ModelResult<f64> {
        let poi = *self.poi(id)?;
        let seg = self.segment(poi.segment)?;
        let row = seg
            .strands
            .get(&strand_type)
            .ok_or_else(|| ModelError::MissingData {
                what: format!("{strand_type} strands on {}", poi.segment),
            })?;
        let base = row.profile.ecc_at(poi.offset_m, seg.length_m);
        Ok(base + self.centroid_shift_m(poi.segment, interval)?)
    }

    /// Shift of the centroid when the composite section acts: eccentricities
    /// defined against the noncomposite centroid grow by this amount.
    fn centroid_shift_m(&self, segment: SegmentKey, interval: IntervalIdx) -> ModelResult<f64> {
        let seg = self.segment(segment)?;
        if self.composite_acts(segment, interval) {
            let comp = seg.composite.ok_or_else(|| ModelError::MissingData {
                what: format!("composite section properties for {segment}"),
            })?;
            Ok(seg.section.centroid_from_top_m - comp.centroid_from_top_m)
        } else {
            Ok(0.0)
        }
    }

    /// Composite action starts the interval after the deck is cast.
    fn composite_acts(&self, segment: SegmentKey, interval: IntervalIdx) -> bool {
        matches!(self.timeline.deck_casting_interval(segment), Some(d) if d < interval)
    }

    fn girder(&self, girder: GirderKey) -> ModelResult<&GirderData> {
        self.girders
            .get(&girder)
            .ok_or(ModelError::UnknownGirder(girder))
    }

    fn segment_at(&self, girder: GirderKey, x_m: f64) -> ModelResult<SegmentKey> {
        let data = self.girder(girder)?;
        let mut start = 0.0;
        let mut last = None;
        for (&idx, seg) in &data.segments {
            let key = SegmentKey::new(girder, idx);
            if x_m < start + seg.length_m {
                return Ok(key);
            }
            start += seg.length_m;
            last = Some(key);
        }
        // x at (or past) the far end belongs to the last segment
        last.ok_or(ModelError::MissingData {
            what: format!("{girder} has no segments"),
        })
    }
}

impl SectionProvider for BridgeModel {
    fn transformed_properties(
        &self,
        poi: PoiId,
        interval: IntervalIdx,
    ) -> ModelResult<SectionProps> {
        let poi = *self.poi(poi)?;
        let seg = self.segment(poi.segment)?;
        let age = self
            .timeline
            .age_at_start(poi.segment, interval)
            .ok_or_else(|| ModelError::MissingData {
                what: format!("{} not constructed by interval {interval}", poi.segment),
            })?;

        let geometry = if self.composite_acts(poi.segment, interval) {
            seg.composite.ok_or_else(|| ModelError::MissingData {
                what: format!("composite section properties for {}", poi.segment),
            })?
        } else {
            seg.section
        };

        let ec_pa = seg.concrete.modulus_at(age);
        Ok(SectionProps {
            area_m2: geometry.area_m2,
            inertia_m4: geometry.inertia_m4,
            centroid_from_top_m: geometry.centroid_from_top_m,
            ec_pa,
            modular_ratio: self.strand_steel.modulus.value / ec_pa,
        })
    }
}

impl TendonGeometry for BridgeModel {
    fn duct_path(&self, tendon: TendonKey) -> ModelResult<&DuctPath> {
        Ok(&self.tendon(tendon)?.path)
    }

    fn stressing(&self, tendon: TendonKey) -> ModelResult<&StressingData> {
        Ok(&self.tendon(tendon)?.stressing)
    }

    fn tendon_area_m2(&self, tendon: TendonKey) -> ModelResult<f64> {
        Ok(self.tendon(tendon)?.total_area_m2())
    }

    fn eccentricity_m(
        &self,
        tendon: TendonKey,
        x_m: f64,
        interval: IntervalIdx,
    ) -> ModelResult<f64> {
        let data = self.tendon(tendon)?;
        let girder_len = self.girder_length_m(tendon.girder)?;
        let segment = self.segment_at(tendon.girder, x_m)?;
        Ok(data.profile_ecc_m(x_m, girder_len) + self.centroid_shift_m(segment, interval)?)
    }
}

impl StructuralResponse for BridgeModel {
    fn applied_effects(&self, poi: PoiId, interval: IntervalIdx) -> ModelResult<ForceEffects> {
        // POI must exist; unregistered intervals simply carry no load.
        self.poi(poi)?;
        Ok(self
            .effects
            .get(&(poi, interval))
            .copied()
            .unwrap_or_default())
    }
}

/// Incremental builder for [`BridgeModel`].
#[derive(Debug)]
pub struct BridgeBuilder {
    strand_steel: Strand,
    girders: BTreeMap<GirderKey, GirderData>,
    pois: Vec<Poi>,
    effects: BTreeMap<(PoiId, IntervalIdx), ForceEffects>,
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeBuilder {
    pub fn new() -> Self {
        Self {
            strand_steel: Strand::low_relaxation(),
            girders: BTreeMap::new(),
            pois: Vec::new(),
            effects: BTreeMap::new(),
        }
    }

    pub fn strand_steel(&mut self, strand: Strand) -> &mut Self {
        self.strand_steel = strand;
        self
    }

    pub fn add_girder(&mut self, group: u32, girder: u32) -> GirderKey {
        let key = GirderKey::new(group, girder);
        self.girders.entry(key).or_default();
        key
    }

    /// Append a segment to a girder and return its key.
    pub fn add_segment(
        &mut self,
        girder: GirderKey,
        length: Length,
        concrete: Concrete,
        section: SectionGeometry,
    ) -> SegmentKey {
        let data = self.girders.entry(girder).or_default();
        let idx = data.segments.len() as u32;
        data.segments.insert(
            idx,
            SegmentData {
                length_m: length.value,
                concrete,
                section,
                composite: None,
                strands: BTreeMap::new(),
            },
        );
        SegmentKey::new(girder, idx)
    }

    pub fn add_strands(
        &mut self,
        segment: SegmentKey,
        strand_type: StrandType,
        count: u32,
        strand_area: Area,
        jacking: Stress,
        profile: StrandProfile,
    ) -> &mut Self {
        if let Some(seg) = self.segment_mut(segment) {
            seg.strands.insert(
                strand_type,
                StrandRow {
                    count,
                    strand_area,
                    jacking,
                    profile,
                },
            );
        }
        self
    }

    pub fn set_composite_section(
        &mut self,
        segment: SegmentKey,
        composite: SectionGeometry,
    ) -> &mut Self {
        if let Some(seg) = self.segment_mut(segment) {
            seg.composite = Some(composite);
        }
        self
    }

    pub fn add_poi(&mut self, segment: SegmentKey, offset: Length) -> PoiId {
        let id = PoiId::from_index(self.pois.len() as u32);
        self.pois.push(Poi {
            id,
            segment,
            offset_m: offset.value,
        });
        self.girders
            .entry(segment.girder)
            .or_default()
            .pois
            .push(id);
        id
    }

    pub fn add_tendon(&mut self, girder: GirderKey, tendon: TendonData) -> TendonKey {
        let data = self.girders.entry(girder).or_default();
        let idx = data.tendons.len() as u32;
        data.tendons.insert(idx, tendon);
        TendonKey::new(girder, idx)
    }

    /// Register the force effects an external loading applies at a POI in
    /// one interval (overwrites any previous registration).
    pub fn set_applied_effects(
        &mut self,
        poi: PoiId,
        interval: IntervalIdx,
        effects: ForceEffects,
    ) -> &mut Self {
        self.effects.insert((poi, interval), effects);
        self
    }

    /// Validate and freeze the model against a timeline.
    pub fn build(self, timeline: Timeline) -> ModelResult<BridgeModel> {
        for poi in &self.pois {
            let seg = self
                .girders
                .get(&poi.segment.girder)
                .and_then(|g| g.segments.get(&poi.segment.segment))
                .ok_or(ModelError::UnknownSegment(poi.segment))?;
            if poi.offset_m < 0.0 || poi.offset_m > seg.length_m {
                return Err(ModelError::Invalid {
                    what: format!("POI {} offset outside its segment", poi.id),
                });
            }
        }

        for (key, girder) in &self.girders {
            for (&idx, seg) in &girder.segments {
                for (ty, row) in &seg.strands {
                    if !row.jacking.value.is_finite() || row.jacking.value < 0.0 {
                        return Err(ModelError::Invalid {
                            what: format!(
                                "{ty} strands on {} have invalid jacking stress",
                                SegmentKey::new(*key, idx)
                            ),
                        });
                    }
                    if let StrandProfile::Harped { harp_point, .. } = row.profile {
                        if !(harp_point > 0.0 && harp_point <= 0.5) {
                            return Err(ModelError::Invalid {
                                what: format!(
                                    "harp point fraction out of (0, 0.5] on {}",
                                    SegmentKey::new(*key, idx)
                                ),
                            });
                        }
                    }
                }
            }
            for (&duct, tendon) in &girder.tendons {
                tendon.path.validate()?;
                let s = &tendon.stressing;
                if s.jacking.value <= 0.0
                    || s.anchor_set.value < 0.0
                    || s.wobble_per_m < 0.0
                    || s.curvature_friction < 0.0
                {
                    return Err(ModelError::Invalid {
                        what: format!(
                            "invalid stressing data for {}",
                            TendonKey::new(*key, duct)
                        ),
                    });
                }
            }
        }

        // Every activity must reference model objects.
        for idx in 0..timeline.interval_count() {
            for activity in timeline.activities(idx)? {
                match activity {
                    Activity::ConstructSegments(segs)
                    | Activity::CastDeck(segs)
                    | Activity::RemoveTemporaryStrands(segs) => {
                        for &s in segs {
                            self.girders
                                .get(&s.girder)
                                .and_then(|g| g.segments.get(&s.segment))
                                .ok_or(ModelError::UnknownSegment(s))?;
                        }
                    }
                    Activity::StressTendon(t) => {
                        self.girders
                            .get(&t.girder)
                            .and_then(|g| g.tendons.get(&t.duct))
                            .ok_or(ModelError::UnknownTendon(*t))?;
                    }
                    Activity::ApplyLoad(_) => {}
                }
            }
        }

        Ok(BridgeModel {
            timeline,
            strand_steel: self.strand_steel,
            girders: self.girders,
            pois: self.pois,
            effects: self.effects,
        })
    }

    fn segment_mut(&mut self, key: SegmentKey) -> Option<&mut SegmentData> {
        self.girders
            .get_mut(&key.girder)
            .and_then(|g| g.segments.get_mut(&key.segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Interval;
    use gl_core::units::{m, mm2, mpa};

    fn geometry() -> SectionGeometry {
        SectionGeometry {
            area_m2: 0.5,
            inertia_m4: 0.1,
            centroid_from_top_m: 0.6,
        }
    }

    fn one_segment_model() -> (BridgeModel, SegmentKey, PoiId) {
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
        let poi = b.add_poi(seg, m(15.0));
        let tl = Timeline::new(vec![
            Interval::new(1.0, 28.0, vec![Activity::ConstructSegments(vec![seg])]),
            Interval::new(28.0, 20_000.0, vec![]),
        ])
        .unwrap();
        (b.build(tl).unwrap(), seg, poi)
    }

    #[test]
    fn build_and_basic_lookups() {
        let (model, seg, poi) = one_segment_model();
        assert!(model.contains_girder(seg.girder));
        assert_eq!(model.girder_pois(seg.girder).unwrap(), &[poi]);
        assert!((model.girder_length_m(seg.girder).unwrap() - 30.0).abs() < 1e-12);
        assert!((model.girder_offset_m(poi).unwrap() - 15.0).abs() < 1e-12);
        let row = model.strand_row(seg, StrandType::Straight).unwrap().unwrap();
        assert_eq!(row.count, 30);
        assert!(model.strand_row(seg, StrandType::Temporary).unwrap().is_none());
    }

    #[test]
    fn unknown_keys_are_invalid() {
        let (model, seg, _) = one_segment_model();
        let bogus = GirderKey::new(9, 9);
        assert!(matches!(
            model.girder_pois(bogus),
            Err(ModelError::UnknownGirder(_))
        ));
        assert!(matches!(
            model.segment(SegmentKey::new(seg.girder, 7)),
            Err(ModelError::UnknownSegment(_))
        ));
        assert!(matches!(
            model.tendon(TendonKey::new(seg.girder, 0)),
            Err(ModelError::UnknownTendon(_))
        ));
    }

    #[test]
    fn section_properties_age_adjust() {
        let (model, _, poi) = one_segment_model();
        let at_release = model.transformed_properties(poi, 0).unwrap();
        let late = model.transformed_properties(poi, 1).unwrap();
        assert!(at_release.ec_pa < late.ec_pa);
        assert!(at_release.modular_ratio > late.modular_ratio);
        assert!(at_release.modular_ratio > 1.0);
    }

    #[test]
    fn section_properties_before_construction_missing() {
        let mut b = BridgeBuilder::new();
        let g = b.add_girder(0, 0);
        let seg = b.add_segment(g, m(30.0), Concrete::normal_weight(mpa(35_000.0)), geometry());
        let poi = b.add_poi(seg, m(15.0));
        let tl = Timeline::new(vec![
            Interval::new(0.0, 10.0, vec![]),
            Interval::new(10.0, 28.0, vec![Activity::ConstructSegments(vec![seg])]),
        ])
        .unwrap();
        let model = b.build(tl).unwrap();
        assert!(matches!(
            model.transformed_properties(poi, 0),
            Err(ModelError::MissingData { .. })
        ));
        assert!(model.transformed_properties(poi, 1).is_ok());
    }

    #[test]
    fn out_of_range_interval_is_missing_data_not_a_panic() {
        let (model, _, poi) = one_segment_model();
        assert!(matches!(
            model.transformed_properties(poi, 10),
            Err(ModelError::MissingData { .. })
        ));
    }

    #[test]
    fn harped_profile_varies_along_segment() {
        let profile = StrandProfile::Harped {
            ecc_end: m(0.1),
            ecc_harp: m(0.5),
            harp_point: 0.4,
        };
        let at_end = profile.ecc_at(0.0, 30.0);
        let at_harp = profile.ecc_at(12.0, 30.0);
        let at_mid = profile.ecc_at(15.0, 30.0);
        let mirrored = profile.ecc_at(30.0, 30.0);
        assert!((at_end - 0.1).abs() < 1e-12);
        assert!((at_harp - 0.5).abs() < 1e-9);
        assert!((at_mid - 0.5).abs() < 1e-12);
        assert!((mirrored - 0.1).abs() < 1e-12);
    }

    #[test]
    fn applied_effects_default_to_zero() {
        let (model, _, poi) = one_segment_model();
        assert_eq!(model.applied_effects(poi, 1).unwrap(), ForceEffects::default());
    }

    #[test]
    fn timeline_referencing_missing_segment_rejected() {
        let b = BridgeBuilder::new();
        let ghost = SegmentKey::new(GirderKey::new(0, 0), 0);
        let tl = Timeline::new(vec![Interval::new(
            0.0,
            1.0,
            vec![Activity::ConstructSegments(vec![ghost])],
        )])
        .unwrap();
        assert!(b.build(tl).is_err());
    }
}
