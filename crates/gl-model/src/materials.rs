//! Concrete and prestressing-steel material models.
//!
//! The time-step integrator only needs three things from concrete: an
//! age-dependent modulus and per-interval creep/shrinkage increments. The
//! growth curves are the ACI 209 forms; ultimate values are inputs so a
//! caller can calibrate to the governing design specification.

use gl_core::units::{constants, Stress};

/// Minimum concrete age used in the growth curves, days.
///
/// Release never happens before overnight cure; evaluating the modulus at
/// age zero would divide by zero.
const MIN_AGE_DAYS: f64 = 0.75;

/// Concrete of one segment (or closure pour).
#[derive(Debug, Clone, Copy)]
pub struct Concrete {
    /// 28-day modulus of elasticity.
    pub ec28: Stress,
    /// Ultimate creep coefficient.
    pub creep_ultimate: f64,
    /// Ultimate shrinkage strain (dimensionless, positive = shortening).
    pub shrinkage_ultimate: f64,
}

impl Concrete {
    /// Normal-weight concrete with typical ultimate creep/shrinkage.
    pub fn normal_weight(ec28: Stress) -> Self {
        Self {
            ec28,
            creep_ultimate: 2.0,
            shrinkage_ultimate: 4.8e-4,
        }
    }

    /// Modulus of elasticity at a given age, Pa.
    ///
    /// Strength growth per ACI 209 (`f'c(t) = f'c28 * t/(4 + 0.85t)`),
    /// modulus proportional to the square root of strength.
    pub fn modulus_at(&self, age_days: f64) -> f64 {
        let t = age_days.max(MIN_AGE_DAYS);
        self.ec28.value * (t / (4.0 + 0.85 * t)).sqrt()
    }

    /// Creep coefficient accrued between two ages (days).
    pub fn creep_increment(&self, t0_days: f64, t1_days: f64) -> f64 {
        self.creep_coefficient(t1_days) - self.creep_coefficient(t0_days)
    }

    /// Shrinkage strain accrued between two ages (days).
    pub fn shrinkage_increment(&self, t0_days: f64, t1_days: f64) -> f64 {
        self.shrinkage_strain(t1_days) - self.shrinkage_strain(t0_days)
    }

    fn creep_coefficient(&self, age_days: f64) -> f64 {
        let t = age_days.max(0.0);
        let tp = t.powf(0.6);
        self.creep_ultimate * tp / (10.0 + tp)
    }

    fn shrinkage_strain(&self, age_days: f64) -> f64 {
        let t = age_days.max(0.0);
        self.shrinkage_ultimate * t / (35.0 + t)
    }
}

/// Prestressing strand/tendon steel.
#[derive(Debug, Clone, Copy)]
pub struct Strand {
    /// Modulus of elasticity.
    pub modulus: Stress,
    /// Ultimate strength.
    pub fpu: Stress,
    /// Yield strength.
    pub fpy: Stress,
    /// Intrinsic relaxation divisor (45 for low-relaxation strand).
    pub relaxation_k: f64,
}

impl Strand {
    /// Grade 270 low-relaxation strand.
    pub fn low_relaxation() -> Self {
        let fpu = gl_core::units::pa(constants::FPU_GRADE270_PA);
        Self {
            modulus: constants::ep_strand(),
            fpu,
            fpy: fpu * 0.9,
            relaxation_k: 45.0,
        }
    }

    /// Intrinsic relaxation loss over one interval, Pa.
    ///
    /// `Δf = fp/K * (fp/fpy - 0.55) * log10((t1+1)/(t0+1))`, zero when the
    /// stress is at or below 0.55 fpy. Times are in days from the project
    /// origin; the +1 keeps the log term defined at t = 0.
    pub fn relaxation_increment(&self, stress_pa: f64, t0_days: f64, t1_days: f64) -> f64 {
        let fpy = self.fpy.value;
        if stress_pa <= 0.55 * fpy || t1_days <= t0_days {
            return 0.0;
        }
        let log_term = ((t1_days + 1.0) / (t0_days + 1.0)).log10();
        (stress_pa / self.relaxation_k) * (stress_pa / fpy - 0.55) * log_term
    }
}
