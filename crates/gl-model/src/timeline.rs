//! Construction/loading timeline: ordered intervals with activities.
//!
//! The timeline is created by the surrounding application's event editor
//! and is read-only to the loss engine. Intervals are referenced by index;
//! indices are monotonic and stable for the life of an analysis run.

use crate::error::{ModelError, ModelResult};
use gl_core::{IntervalIdx, SegmentKey, TendonKey, INTERVAL_ALL};

/// Identifier of an externally applied loading (assigned by the caller).
pub type LoadId = u32;

/// Something that happens during an interval.
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    /// Segments are cast and their pretensioned strands released.
    ConstructSegments(Vec<SegmentKey>),
    /// A post-tensioning tendon is jacked and seated.
    StressTendon(TendonKey),
    /// Deck is cast over the given segments; composite section from the
    /// following evaluations onward.
    CastDeck(Vec<SegmentKey>),
    /// An external loading contributes force effects via the structural
    /// response collaborator.
    ApplyLoad(LoadId),
    /// Temporary strands are cut on the given segments.
    RemoveTemporaryStrands(Vec<SegmentKey>),
}

/// One timeline slot: a time span plus the activities occurring in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    /// Start of the interval, days from the project origin.
    pub start_day: f64,
    /// End of the interval, days from the project origin.
    pub end_day: f64,
    pub activities: Vec<Activity>,
}

impl Interval {
    pub fn new(start_day: f64, end_day: f64, activities: Vec<Activity>) -> Self {
        Self {
            start_day,
            end_day,
            activities,
        }
    }

    pub fn duration_days(&self) -> f64 {
        self.end_day - self.start_day
    }
}

/// Ordered, immutable-once-built list of intervals.
#[derive(Debug, Clone)]
pub struct Timeline {
    intervals: Vec<Interval>,
}

impl Timeline {
    /// Validate and freeze a sequence of intervals.
    ///
    /// Intervals must be contiguous in time: non-negative durations and
    /// each start at or after the previous end.
    pub fn new(intervals: Vec<Interval>) -> ModelResult<Self> {
        let mut prev_end = f64::NEG_INFINITY;
        for (idx, ivl) in intervals.iter().enumerate() {
            if !ivl.start_day.is_finite() || !ivl.end_day.is_finite() {
                return Err(ModelError::Invalid {
                    what: format!("interval {idx} has non-finite bounds"),
                });
            }
            if ivl.end_day < ivl.start_day {
                return Err(ModelError::Invalid {
                    what: format!("interval {idx} has negative duration"),
                });
            }
            if ivl.start_day < prev_end {
                return Err(ModelError::Invalid {
                    what: format!("interval {idx} starts before the previous interval ends"),
                });
            }
            prev_end = ivl.end_day;
        }
        Ok(Self { intervals })
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn interval(&self, idx: IntervalIdx) -> ModelResult<&Interval> {
        self.intervals.get(idx).ok_or(ModelError::MissingData {
            what: format!("interval {idx} (timeline has {})", self.intervals.len()),
        })
    }

    pub fn activities(&self, idx: IntervalIdx) -> ModelResult<&[Activity]> {
        Ok(self.interval(idx)?.activities.as_slice())
    }

    /// Map `INTERVAL_ALL` to the last interval index.
    pub fn resolve(&self, idx: IntervalIdx) -> ModelResult<IntervalIdx> {
        if self.intervals.is_empty() {
            return Err(ModelError::Invalid {
                what: "timeline has no intervals".into(),
            });
        }
        if idx == INTERVAL_ALL {
            return Ok(self.intervals.len() - 1);
        }
        if idx >= self.intervals.len() {
            return Err(ModelError::MissingData {
                what: format!("interval {idx} (timeline has {})", self.intervals.len()),
            });
        }
        Ok(idx)
    }

    /// Interval in which a tendon is stressed, if any.
    pub fn stressing_interval(&self, tendon: TendonKey) -> Option<IntervalIdx> {
        self.find(|a| matches!(a, Activity::StressTendon(t) if *t == tendon))
    }

    /// Interval in which a segment is constructed (strands released).
    pub fn construction_interval(&self, segment: SegmentKey) -> Option<IntervalIdx> {
        self.find(|a| matches!(a, Activity::ConstructSegments(s) if s.contains(&segment)))
    }

    /// Interval in which the deck is cast over a segment.
    pub fn deck_casting_interval(&self, segment: SegmentKey) -> Option<IntervalIdx> {
        self.find(|a| matches!(a, Activity::CastDeck(s) if s.contains(&segment)))
    }

    /// Interval in which a segment's temporary strands are removed.
    pub fn removal_interval(&self, segment: SegmentKey) -> Option<IntervalIdx> {
        self.find(|a| matches!(a, Activity::RemoveTemporaryStrands(s) if s.contains(&segment)))
    }

    /// Concrete age (days since construction) at the start of an interval.
    ///
    /// `None` if the segment is not constructed by that interval.
    pub fn age_at_start(&self, segment: SegmentKey, idx: IntervalIdx) -> Option<f64> {
        let built = self.construction_interval(segment)?;
        if idx < built {
            return None;
        }
        let t0 = self.intervals.get(built)?.start_day;
        Some(self.intervals.get(idx)?.start_day - t0)
    }

    fn find(&self, pred: impl Fn(&Activity) -> bool) -> Option<IntervalIdx> {
        self.intervals
            .iter()
            .position(|ivl| ivl.activities.iter().any(&pred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::GirderKey;

    fn seg() -> SegmentKey {
        SegmentKey::new(GirderKey::new(0, 0), 0)
    }

    fn three_intervals() -> Timeline {
        Timeline::new(vec![
            Interval::new(1.0, 28.0, vec![Activity::ConstructSegments(vec![seg()])]),
            Interval::new(28.0, 56.0, vec![Activity::CastDeck(vec![seg()])]),
            Interval::new(56.0, 20_000.0, vec![Activity::ApplyLoad(0)]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_overlapping_intervals() {
        let err = Timeline::new(vec![
            Interval::new(0.0, 10.0, vec![]),
            Interval::new(5.0, 20.0, vec![]),
        ])
        .unwrap_err();
        assert!(format!("{err}").contains("starts before"));
    }

    #[test]
    fn rejects_negative_duration() {
        assert!(Timeline::new(vec![Interval::new(10.0, 5.0, vec![])]).is_err());
    }

    #[test]
    fn activity_queries() {
        let tl = three_intervals();
        assert_eq!(tl.interval_count(), 3);
        assert_eq!(tl.construction_interval(seg()), Some(0));
        assert_eq!(tl.deck_casting_interval(seg()), Some(1));
        assert_eq!(tl.removal_interval(seg()), None);
        assert_eq!(
            tl.stressing_interval(TendonKey::new(GirderKey::new(0, 0), 0)),
            None
        );
    }

    #[test]
    fn resolve_all_maps_to_last() {
        let tl = three_intervals();
        assert_eq!(tl.resolve(gl_core::INTERVAL_ALL).unwrap(), 2);
        assert_eq!(tl.resolve(1).unwrap(), 1);
        assert!(tl.resolve(3).is_err());
    }

    #[test]
    fn age_at_start_counts_from_construction() {
        let tl = three_intervals();
        assert_eq!(tl.age_at_start(seg(), 0), Some(0.0));
        assert_eq!(tl.age_at_start(seg(), 1), Some(27.0));
        assert_eq!(tl.age_at_start(seg(), 2), Some(55.0));
    }

    #[test]
    fn age_at_start_out_of_range_interval_is_none() {
        let tl = three_intervals();
        assert_eq!(tl.age_at_start(seg(), 10), None);
    }
}
