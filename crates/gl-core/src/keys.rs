//! Ordered value keys for girders, segments, and tendons.
//!
//! All keys are small Copy types with total ordering and structural
//! equality so they can key `BTreeMap`s deterministically.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of an interval in the construction/loading timeline.
///
/// Monotonic and stable for the life of an analysis run.
pub type IntervalIdx = usize;

/// Sentinel meaning "through the last interval of the timeline".
pub const INTERVAL_ALL: IntervalIdx = usize::MAX;

/// Identifies one girder line within a girder group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GirderKey {
    pub group: u32,
    pub girder: u32,
}

impl GirderKey {
    pub fn new(group: u32, girder: u32) -> Self {
        Self { group, girder }
    }
}

impl fmt::Display for GirderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {} Girder {}", self.group + 1, self.girder + 1)
    }
}

/// Identifies one precast segment of a girder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentKey {
    pub girder: GirderKey,
    pub segment: u32,
}

impl SegmentKey {
    pub fn new(girder: GirderKey, segment: u32) -> Self {
        Self { girder, segment }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Segment {}", self.girder, self.segment + 1)
    }
}

/// Identifies one post-tensioning tendon (duct) within a girder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TendonKey {
    pub girder: GirderKey,
    pub duct: u32,
}

impl TendonKey {
    pub fn new(girder: GirderKey, duct: u32) -> Self {
        Self { girder, duct }
    }
}

impl fmt::Display for TendonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Duct {}", self.girder, self.duct + 1)
    }
}

/// Pretensioned strand population category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StrandType {
    Straight,
    Harped,
    Temporary,
}

impl StrandType {
    /// All categories, in key order.
    pub const ALL: [StrandType; 3] = [
        StrandType::Straight,
        StrandType::Harped,
        StrandType::Temporary,
    ];
}

impl fmt::Display for StrandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrandType::Straight => "Straight",
            StrandType::Harped => "Harped",
            StrandType::Temporary => "Temporary",
        };
        f.write_str(s)
    }
}
