//! Transformed section properties and the provider seam.

use crate::error::ModelResult;
use gl_core::{IntervalIdx, PoiId};

/// Geometric properties of one cross-section stage (SI).
///
/// Callers supply transformed values; the model only attaches the
/// age-dependent modulus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionGeometry {
    pub area_m2: f64,
    pub inertia_m4: f64,
    /// Centroid location measured down from the top of the section.
    pub centroid_from_top_m: f64,
}

/// Age-adjusted transformed properties at one POI for one interval.
#[derive(Debug, Clone, Copy)]
pub struct SectionProps {
    pub area_m2: f64,
    pub inertia_m4: f64,
    pub centroid_from_top_m: f64,
    /// Concrete modulus at the interval start, Pa.
    pub ec_pa: f64,
    /// Strand-to-concrete modular ratio Ep/Ec for this interval.
    pub modular_ratio: f64,
}

/// Section-property provider seam (external collaborator).
pub trait SectionProvider {
    fn transformed_properties(&self, poi: PoiId, interval: IntervalIdx)
        -> ModelResult<SectionProps>;
}
