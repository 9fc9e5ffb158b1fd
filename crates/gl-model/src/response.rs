//! Structural-response collaborator seam.
//!
//! The separate response analysis produces applied force effects (self
//! weight, superimposed loads) per interval; this core only consumes them.

use crate::error::ModelResult;
use gl_core::{IntervalIdx, PoiId};

/// Force effects applied at a POI during one interval.
///
/// Sign convention: `axial_n` positive in compression on the concrete,
/// `moment_nm` positive sagging (tension on the bottom fiber).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceEffects {
    pub axial_n: f64,
    pub moment_nm: f64,
}

impl ForceEffects {
    pub fn moment(moment_nm: f64) -> Self {
        Self {
            axial_n: 0.0,
            moment_nm,
        }
    }
}

pub trait StructuralResponse {
    /// Effects newly applied during `interval` (not cumulative).
    fn applied_effects(&self, poi: PoiId, interval: IntervalIdx) -> ModelResult<ForceEffects>;
}
