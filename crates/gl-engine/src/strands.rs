//! Strand-type activity tracking.
//!
//! Many segments carry no harped or temporary strands. The tracker
//! memoizes which populations actually exist with a nonzero count on each
//! segment so the sweep never iterates empty populations, and so trial
//! overrides resolve once per segment.

use std::collections::BTreeMap;

use crate::engine::LossEngine;
use crate::error::EngineResult;
use gl_core::{SegmentKey, StrandType};

#[derive(Debug, Clone, Default)]
pub struct StrandTracker {
    memo: BTreeMap<SegmentKey, Vec<StrandType>>,
}

impl StrandTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strand populations with a nonzero count on a segment, in key order.
    pub fn active_types(
        &mut self,
        engine: &LossEngine<'_>,
        segment: SegmentKey,
    ) -> EngineResult<Vec<StrandType>> {
        if let Some(cached) = self.memo.get(&segment) {
            return Ok(cached.clone());
        }
        let mut active = Vec::new();
        for ty in StrandType::ALL {
            if let Some(row) = engine.resolved_strands(segment, ty)? {
                if row.count > 0 {
                    active.push(ty);
                }
            }
        }
        self.memo.insert(segment, active.clone());
        Ok(active)
    }
}
