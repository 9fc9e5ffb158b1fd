//! Interval sweep state machine.
//!
//! Each interval of the timeline passes through the same ordered phases:
//! resolve data, apply instantaneous effects, apply time-dependent
//! effects, record results. `advance` is the only transition, so the
//! driver loop cannot skip or reorder a phase.

use gl_core::IntervalIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    NotStarted,
    /// Resolving activities and section data for the interval.
    Initializing(IntervalIdx),
    /// Applying release, stressing, removal, and external-load effects.
    Instantaneous(IntervalIdx),
    /// Applying creep, shrinkage, and relaxation over the interval span.
    TimeDependent(IntervalIdx),
    /// Recording per-POI details for the interval.
    Finalizing(IntervalIdx),
    Complete,
}

impl SweepPhase {
    /// Begin a sweep at the given interval (resuming an extension skips
    /// the intervals already finalized).
    pub fn start_at(interval: IntervalIdx) -> Self {
        SweepPhase::Initializing(interval)
    }

    /// Next phase, ending after `last` has been finalized.
    pub fn advance(self, last: IntervalIdx) -> Self {
        match self {
            SweepPhase::NotStarted => SweepPhase::Initializing(0),
            SweepPhase::Initializing(i) => SweepPhase::Instantaneous(i),
            SweepPhase::Instantaneous(i) => SweepPhase::TimeDependent(i),
            SweepPhase::TimeDependent(i) => SweepPhase::Finalizing(i),
            SweepPhase::Finalizing(i) if i >= last => SweepPhase::Complete,
            SweepPhase::Finalizing(i) => SweepPhase::Initializing(i + 1),
            SweepPhase::Complete => SweepPhase::Complete,
        }
    }

    /// Interval the phase operates on, if any.
    pub fn interval(&self) -> Option<IntervalIdx> {
        match *self {
            SweepPhase::Initializing(i)
            | SweepPhase::Instantaneous(i)
            | SweepPhase::TimeDependent(i)
            | SweepPhase::Finalizing(i) => Some(i),
            SweepPhase::NotStarted | SweepPhase::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SweepPhase::Complete)
    }
}
