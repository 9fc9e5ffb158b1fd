//! Friction loss curves along a duct.
//!
//! The retained stress at distance `d` from a jacking end is
//! `fp(d) = fpj * exp(-(K*d + mu*alpha(d)))` where `alpha` is the total
//! angle change walked from the anchorage. With piecewise-constant
//! curvature the exponent is piecewise linear in `d`, so the curve is
//! piecewise-exponential and its integrals are closed-form.

use crate::error::{FrictionError, FrictionResult};
use gl_model::{DuctPath, JackingEnd, StressingData};

/// Below this exponent slope a path piece is treated as friction-free.
const SLOPE_EPS: f64 = 1e-14;

#[derive(Debug, Clone, Copy)]
struct Node {
    /// Distance from the jacking end, m.
    d_m: f64,
    /// Accumulated friction exponent `K*d + mu*alpha(d)`.
    exponent: f64,
}

/// Loss-vs-distance curve from one jacking end.
#[derive(Debug, Clone)]
pub struct FrictionCurve {
    jacking_pa: f64,
    nodes: Vec<Node>,
}

impl FrictionCurve {
    /// Build the curve for a path walked from its first segment.
    ///
    /// For a tendon jacked at the far anchorage pass `path.reversed()`.
    pub fn from_path(
        path: &DuctPath,
        wobble_per_m: f64,
        curvature_friction: f64,
        jacking_pa: f64,
    ) -> FrictionResult<Self> {
        path.validate()
            .map_err(|e| FrictionError::Geometry { what: e.to_string() })?;
        if !jacking_pa.is_finite() || jacking_pa <= 0.0 {
            return Err(FrictionError::Geometry {
                what: "jacking stress must be positive".into(),
            });
        }
        if wobble_per_m < 0.0 || curvature_friction < 0.0 {
            return Err(FrictionError::Geometry {
                what: "friction coefficients must be non-negative".into(),
            });
        }

        let mut nodes = Vec::with_capacity(path.segments().len() + 1);
        let mut d = 0.0;
        let mut exponent = 0.0;
        nodes.push(Node { d_m: d, exponent });
        for seg in path.segments() {
            let len = seg.length.value;
            d += len;
            exponent += (wobble_per_m + curvature_friction * seg.curvature_per_m.abs()) * len;
            if !exponent.is_finite() {
                return Err(FrictionError::NonFinite {
                    what: "friction exponent",
                });
            }
            nodes.push(Node { d_m: d, exponent });
        }
        Ok(Self { jacking_pa, nodes })
    }

    pub fn jacking_pa(&self) -> f64 {
        self.jacking_pa
    }

    pub fn length_m(&self) -> f64 {
        self.nodes[self.nodes.len() - 1].d_m
    }

    /// Retained stress at distance `d` from the jacking end, Pa.
    pub fn stress_at(&self, d_m: f64) -> f64 {
        self.jacking_pa * (-self.exponent_at(d_m)).exp()
    }

    /// Friction loss at distance `d` from the jacking end, Pa.
    pub fn loss_at(&self, d_m: f64) -> f64 {
        self.jacking_pa - self.stress_at(d_m)
    }

    /// Exact integral of the retained stress over `[a, b]`, Pa*m.
    pub fn integral_stress(&self, a_m: f64, b_m: f64) -> f64 {
        let a = a_m.clamp(0.0, self.length_m());
        let b = b_m.clamp(0.0, self.length_m());
        if b <= a {
            return 0.0;
        }
        let mut total = 0.0;
        for pair in self.nodes.windows(2) {
            let (n0, n1) = (pair[0], pair[1]);
            let lo = a.max(n0.d_m);
            let hi = b.min(n1.d_m);
            if hi <= lo {
                continue;
            }
            let slope = if n1.d_m > n0.d_m {
                (n1.exponent - n0.exponent) / (n1.d_m - n0.d_m)
            } else {
                0.0
            };
            let e_lo = n0.exponent + slope * (lo - n0.d_m);
            let width = hi - lo;
            // ∫ fpj e^{-(e_lo + s u)} du over [0, width]
            total += if slope.abs() < SLOPE_EPS {
                self.jacking_pa * (-e_lo).exp() * width
            } else {
                self.jacking_pa * (-e_lo).exp() * (1.0 - (-slope * width).exp()) / slope
            };
        }
        total
    }

    fn exponent_at(&self, d_m: f64) -> f64 {
        let d = d_m.clamp(0.0, self.length_m());
        for pair in self.nodes.windows(2) {
            if d <= pair[1].d_m {
                return gl_core::lerp(
                    pair[0].d_m,
                    pair[0].exponent,
                    pair[1].d_m,
                    pair[1].exponent,
                    d,
                );
            }
        }
        self.nodes[self.nodes.len() - 1].exponent
    }
}

/// Combined friction state of a tendon, in girder coordinates measured
/// from the start anchorage.
///
/// For a tendon jacked from both ends the retained stress at each point is
/// whichever jacking end yields the higher value; the location where the
/// two curves cross is the minimum-friction location that bounds anchor
/// seating effects.
#[derive(Debug, Clone)]
pub struct TendonFriction {
    length_m: f64,
    start: Option<FrictionCurve>,
    end: Option<FrictionCurve>,
}

impl TendonFriction {
    pub fn build(path: &DuctPath, stressing: &StressingData) -> FrictionResult<Self> {
        let jacking_pa = stressing.jacking.value;
        let start = if stressing.jacked_ends.includes(JackingEnd::Start) {
            Some(FrictionCurve::from_path(
                path,
                stressing.wobble_per_m,
                stressing.curvature_friction,
                jacking_pa,
            )?)
        } else {
            None
        };
        let end = if stressing.jacked_ends.includes(JackingEnd::End) {
            Some(FrictionCurve::from_path(
                &path.reversed(),
                stressing.wobble_per_m,
                stressing.curvature_friction,
                jacking_pa,
            )?)
        } else {
            None
        };
        Ok(Self {
            length_m: path.total_length_m(),
            start,
            end,
        })
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// Jacking stress, Pa (identical at every jacked end).
    pub fn jacking_pa(&self) -> f64 {
        self.start
            .as_ref()
            .or(self.end.as_ref())
            .map(|c| c.jacking_pa())
            .unwrap_or(0.0)
    }

    pub fn curve(&self, end: JackingEnd) -> Option<&FrictionCurve> {
        match end {
            JackingEnd::Start => self.start.as_ref(),
            JackingEnd::End => self.end.as_ref(),
        }
    }

    /// Distance of a girder coordinate from a given jacking end.
    pub fn distance_from(&self, end: JackingEnd, x_m: f64) -> f64 {
        match end {
            JackingEnd::Start => x_m,
            JackingEnd::End => self.length_m - x_m,
        }
    }

    /// Pre-seating retained stress at girder coordinate `x`, Pa.
    pub fn stress_at(&self, x_m: f64) -> f64 {
        let s = self.start.as_ref().map(|c| c.stress_at(x_m));
        let e = self.end.as_ref().map(|c| c.stress_at(self.length_m - x_m));
        match (s, e) {
            (Some(a), Some(b)) => a.max(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => 0.0,
        }
    }

    /// Girder coordinate of the minimum-friction location.
    ///
    /// For a both-end tendon this is where the two jacking curves cross;
    /// for a single-end tendon it is the far anchorage.
    pub fn min_friction_location_m(&self) -> f64 {
        match (&self.start, &self.end) {
            (Some(s), Some(e)) => self.crossing_m(s, e),
            (Some(_), None) => self.length_m,
            (None, Some(_)) => 0.0,
            (None, None) => 0.0,
        }
    }

    /// Exact integral of the pre-seating retained stress over the duct.
    pub fn integral_stress(&self) -> f64 {
        match (&self.start, &self.end) {
            (Some(s), Some(e)) => {
                let xc = self.crossing_m(s, e);
                s.integral_stress(0.0, xc) + e.integral_stress(0.0, self.length_m - xc)
            }
            (Some(s), None) => s.integral_stress(0.0, self.length_m),
            (None, Some(e)) => e.integral_stress(0.0, self.length_m),
            (None, None) => 0.0,
        }
    }

    /// Find where the start-jacked and end-jacked exponents are equal.
    ///
    /// The difference is non-decreasing in x and changes sign exactly once
    /// for non-negative coefficients.
    fn crossing_m(&self, s: &FrictionCurve, e: &FrictionCurve) -> f64 {
        let l = self.length_m;
        let diff = |x: f64| s.exponent_at(x) - e.exponent_at(l - x);
        if diff(0.0) >= 0.0 {
            // Friction-free tendon: every point ties; use midlength.
            return 0.5 * l;
        }
        if diff(l) <= 0.0 {
            return l;
        }
        // Walk merged breakpoints; the difference is piecewise linear.
        let mut xs: Vec<f64> = s
            .nodes
            .iter()
            .map(|n| n.d_m)
            .chain(e.nodes.iter().map(|n| l - n.d_m))
            .filter(|&x| (0.0..=l).contains(&x))
            .collect();
        xs.sort_by(f64::total_cmp);
        let mut prev = 0.0;
        let mut prev_diff = diff(prev);
        for &x in &xs {
            if x <= prev {
                continue;
            }
            let d = diff(x);
            if d >= 0.0 {
                // Linear interpolation for the root within this piece
                return gl_core::lerp(prev_diff, prev, d, x, 0.0);
            }
            prev = x;
            prev_diff = d;
        }
        l
    }
}
