//! Post-tensioning duct geometry and the tendon provider seam.

use crate::error::{ModelError, ModelResult};
use gl_core::units::{Length, Stress};
use gl_core::{IntervalIdx, TendonKey};
use serde::{Deserialize, Serialize};

/// One piece of a duct path: an arc length with constant curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuctSegment {
    pub length: Length,
    /// Signed curvature, 1/m. The friction model uses the magnitude.
    pub curvature_per_m: f64,
}

impl DuctSegment {
    pub fn straight(length: Length) -> Self {
        Self {
            length,
            curvature_per_m: 0.0,
        }
    }

    pub fn curved(length: Length, curvature_per_m: f64) -> Self {
        Self {
            length,
            curvature_per_m,
        }
    }
}

/// Piecewise duct path from the start anchorage to the end anchorage.
#[derive(Debug, Clone, PartialEq)]
pub struct DuctPath {
    segments: Vec<DuctSegment>,
}

impl DuctPath {
    pub fn new(segments: Vec<DuctSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[DuctSegment] {
        &self.segments
    }

    pub fn total_length_m(&self) -> f64 {
        self.segments.iter().map(|s| s.length.value).sum()
    }

    /// The same path walked from the end anchorage.
    pub fn reversed(&self) -> DuctPath {
        let mut segments = self.segments.clone();
        segments.reverse();
        DuctPath { segments }
    }

    /// Reject degenerate geometry before any friction computation.
    pub fn validate(&self) -> ModelResult<()> {
        if self.total_length_m() <= 0.0 {
            return Err(ModelError::Invalid {
                what: "duct path has zero length".into(),
            });
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.length.value.is_finite() || seg.length.value < 0.0 {
                return Err(ModelError::Invalid {
                    what: format!("duct segment {i} has invalid length"),
                });
            }
            if !seg.curvature_per_m.is_finite() {
                return Err(ModelError::Invalid {
                    what: format!("duct segment {i} has non-finite curvature"),
                });
            }
        }
        Ok(())
    }
}

/// One jacking end of a tendon.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum JackingEnd {
    Start,
    End,
}

/// Which anchorage(s) the tendon is jacked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JackedEnds {
    Start,
    End,
    Both,
}

impl JackedEnds {
    pub fn ends(&self) -> &'static [JackingEnd] {
        match self {
            JackedEnds::Start => &[JackingEnd::Start],
            JackedEnds::End => &[JackingEnd::End],
            JackedEnds::Both => &[JackingEnd::Start, JackingEnd::End],
        }
    }

    pub fn includes(&self, end: JackingEnd) -> bool {
        self.ends().contains(&end)
    }
}

/// Stressing parameters for one tendon.
#[derive(Debug, Clone, Copy)]
pub struct StressingData {
    pub jacking: Stress,
    pub jacked_ends: JackedEnds,
    /// Physical anchor seating movement (Dset).
    pub anchor_set: Length,
    /// Wobble friction coefficient K, 1/m.
    pub wobble_per_m: f64,
    /// Curvature friction coefficient mu, 1/rad.
    pub curvature_friction: f64,
}

/// Tendon/duct geometry provider seam (external collaborator).
pub trait TendonGeometry {
    fn duct_path(&self, tendon: TendonKey) -> ModelResult<&DuctPath>;

    fn stressing(&self, tendon: TendonKey) -> ModelResult<&StressingData>;

    /// Total tendon steel area, m^2.
    fn tendon_area_m2(&self, tendon: TendonKey) -> ModelResult<f64>;

    /// Tendon eccentricity below the current section centroid at a girder
    /// coordinate, m.
    fn eccentricity_m(&self, tendon: TendonKey, x_m: f64, interval: IntervalIdx)
        -> ModelResult<f64>;
}
