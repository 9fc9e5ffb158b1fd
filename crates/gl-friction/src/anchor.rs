//! Anchor-set (seating) loss solver.
//!
//! When the jack is released the anchor hardware seats by a small movement
//! Dset. Friction reverses over a length Xset from the anchorage, and the
//! post-seating curve is the reflection of the friction curve about its
//! value at Xset. Xset must satisfy
//!
//! `Dset = 2/Ep * ∫0^Xset (fp(u) - fp(Xset)) du`
//!
//! which depends on the very curve it perturbs, so Xset is found by a
//! bracketed bisection. Seating effects cannot propagate past the
//! minimum-friction location; if even that reflection cannot absorb Dset
//! the solver saturates there and flags non-convergence instead of
//! failing.

use crate::curve::{FrictionCurve, TendonFriction};
use crate::error::FrictionResult;
use gl_model::{DuctPath, JackingEnd, StressingData};
use tracing::warn;

/// Bisection controls for the seating search.
#[derive(Debug, Clone, Copy)]
pub struct AnchorSetConfig {
    /// Iteration cap; hitting it flags non-convergence.
    pub max_iterations: usize,
    /// Bracket-width tolerance on Xset, m.
    pub abs_tol_m: f64,
}

impl Default for AnchorSetConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abs_tol_m: 1e-6,
        }
    }
}

/// Seating solution for one jacking end.
#[derive(Debug, Clone, Copy)]
pub struct AnchorSetSolution {
    pub end: JackingEnd,
    /// Seating penetration length, measured from the jacking end, m.
    pub xset_m: f64,
    /// Retained stress at Xset (the pivot of the reflection), Pa.
    pub stress_at_xset_pa: f64,
    /// Anchor-set loss at the jacking face, Pa.
    pub anchor_loss_pa: f64,
    /// Seating movement implied by the returned Xset, m.
    pub pull_in_m: f64,
    /// Jacking elongation over the full duct, m.
    pub elongation_m: f64,
    /// False when the search saturated at the bracket top or hit the
    /// iteration cap (best estimate returned, per NonConvergenceWarning).
    pub converged: bool,
}

/// Seating movement implied by a trial Xset, m.
fn pull_in(curve: &FrictionCurve, xset_m: f64, ep_pa: f64) -> f64 {
    let integral = curve.integral_stress(0.0, xset_m) - xset_m * curve.stress_at(xset_m);
    2.0 * integral / ep_pa
}

/// Solve for the seating penetration of one jacking end.
///
/// `limit_m` bounds the search: the distance from this end to the
/// minimum-friction location (or the full length for single-end jacking).
pub fn solve_anchor_set(
    curve: &FrictionCurve,
    end: JackingEnd,
    dset_m: f64,
    ep_pa: f64,
    limit_m: f64,
    cfg: &AnchorSetConfig,
) -> FrictionResult<AnchorSetSolution> {
    let elongation_m = curve.integral_stress(0.0, curve.length_m()) / ep_pa;
    let limit = limit_m.clamp(0.0, curve.length_m());

    let finish = |xset: f64, converged: bool| {
        let fp_xset = curve.stress_at(xset);
        AnchorSetSolution {
            end,
            xset_m: xset,
            stress_at_xset_pa: fp_xset,
            anchor_loss_pa: 2.0 * (curve.jacking_pa() - fp_xset),
            pull_in_m: pull_in(curve, xset, ep_pa),
            elongation_m,
            converged,
        }
    };

    if dset_m <= 0.0 {
        return Ok(finish(0.0, true));
    }

    // The full-bracket reflection cannot absorb the specified movement:
    // saturate at the minimum-friction location.
    if pull_in(curve, limit, ep_pa) < dset_m {
        warn!(
            xset_m = limit,
            dset_m, "anchor set saturated at the minimum-friction location"
        );
        return Ok(finish(limit, false));
    }

    let mut lo = 0.0;
    let mut hi = limit;
    for _ in 0..cfg.max_iterations {
        if hi - lo <= cfg.abs_tol_m {
            return Ok(finish(0.5 * (lo + hi), true));
        }
        let mid = 0.5 * (lo + hi);
        if pull_in(curve, mid, ep_pa) < dset_m {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    warn!(
        lo_m = lo,
        hi_m = hi,
        "anchor-set bisection hit the iteration cap"
    );
    Ok(finish(0.5 * (lo + hi), false))
}

/// Post-seating stress state of a tendon: friction curves plus the
/// seating solution for each jacked end.
#[derive(Debug, Clone)]
pub struct SeatedProfile {
    friction: TendonFriction,
    seats: Vec<AnchorSetSolution>,
}

impl SeatedProfile {
    /// Build the friction state and solve seating at every jacked end.
    pub fn compute(
        path: &DuctPath,
        stressing: &StressingData,
        ep_pa: f64,
        cfg: &AnchorSetConfig,
    ) -> FrictionResult<Self> {
        let friction = TendonFriction::build(path, stressing)?;
        let x_min = friction.min_friction_location_m();
        let mut seats = Vec::new();
        for &end in stressing.jacked_ends.ends() {
            let Some(curve) = friction.curve(end) else {
                continue;
            };
            let limit = friction.distance_from(end, x_min);
            seats.push(solve_anchor_set(
                curve,
                end,
                stressing.anchor_set.value,
                ep_pa,
                limit,
                cfg,
            )?);
        }
        Ok(Self { friction, seats })
    }

    pub fn friction(&self) -> &TendonFriction {
        &self.friction
    }

    pub fn seats(&self) -> &[AnchorSetSolution] {
        &self.seats
    }

    pub fn seat(&self, end: JackingEnd) -> Option<&AnchorSetSolution> {
        self.seats.iter().find(|s| s.end == end)
    }

    /// Post-seating retained stress at girder coordinate `x`, Pa.
    pub fn stress_at(&self, x_m: f64) -> f64 {
        let base = self.friction.stress_at(x_m);
        let mut stress = base;
        for seat in &self.seats {
            let d = self.friction.distance_from(seat.end, x_m);
            if d < seat.xset_m {
                // Reflection about the stress at Xset
                stress = 2.0 * seat.stress_at_xset_pa - base;
            }
        }
        stress.max(0.0)
    }

    /// Length-weighted average friction loss over the duct, Pa.
    pub fn avg_friction_loss_pa(&self) -> f64 {
        let l = self.friction.length_m();
        self.friction.jacking_pa() - self.friction.integral_stress() / l
    }

    /// Length-weighted average anchor-set loss over the duct, Pa.
    ///
    /// Equal to `Ep * pull_in / L` summed over the jacked ends.
    pub fn avg_anchor_set_loss_pa(&self, ep_pa: f64) -> f64 {
        let l = self.friction.length_m();
        self.seats
            .iter()
            .map(|s| ep_pa * s.pull_in_m / l)
            .sum()
    }
}
