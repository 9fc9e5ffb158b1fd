//! Per-POI, per-interval loss records.

use std::collections::BTreeMap;

use gl_core::StrandType;
use serde::{Deserialize, Serialize};

/// Cumulative loss breakdown for one strand population at one POI through
/// the end of one interval. All stresses in Pa; positive entries reduce
/// the strand stress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrandLoss {
    /// Stress at jacking, before any loss.
    pub jacking_pa: f64,
    /// Elastic shortening from release, subsequent tendon stressing, and
    /// temporary-strand removal.
    pub elastic_shortening_pa: f64,
    /// Elastic change from externally applied loads. Negative is a gain
    /// (sagging moments decompress the concrete at the strand level).
    pub elastic_external_pa: f64,
    pub creep_pa: f64,
    pub shrinkage_pa: f64,
    pub relaxation_pa: f64,
    /// Stress remaining in the strand.
    pub effective_pa: f64,
}

impl StrandLoss {
    /// Creep + shrinkage + relaxation accrued so far.
    pub fn time_dependent_pa(&self) -> f64 {
        self.creep_pa + self.shrinkage_pa + self.relaxation_pa
    }

    /// Net loss from jacking to the effective stress.
    pub fn total_loss_pa(&self) -> f64 {
        self.jacking_pa - self.effective_pa
    }
}

/// State of one post-tensioning duct at one POI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuctLoss {
    /// Current tendon stress; exactly zero until the duct is stressed.
    pub stress_pa: f64,
    /// Tendon force, stress times total steel area.
    pub force_n: f64,
}

/// Losses at one POI through the end of one interval.
///
/// Rows exist for every interval of the analysis. Before a segment is
/// constructed both maps are empty; populations with zero strands are
/// never keyed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossDetails {
    pub strands: BTreeMap<StrandType, StrandLoss>,
    pub ducts: BTreeMap<u32, DuctLoss>,
}

impl LossDetails {
    pub fn strand(&self, strand_type: StrandType) -> Option<&StrandLoss> {
        self.strands.get(&strand_type)
    }

    pub fn duct(&self, duct: u32) -> Option<&DuctLoss> {
        self.ducts.get(&duct)
    }

    pub fn is_empty(&self) -> bool {
        self.strands.is_empty() && self.ducts.is_empty()
    }
}
