// gl-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Force as UomForce, Length as UomLength, Pressure as UomPressure,
    Ratio as UomRatio, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Force = UomForce;
pub type Length = UomLength;
/// Stress and elastic modulus share the pressure dimension.
pub type Stress = UomPressure;
pub type Ratio = UomRatio;
pub type Time = UomTime;

#[inline]
pub fn pa(v: f64) -> Stress {
    use uom::si::pressure::pascal;
    Stress::new::<pascal>(v)
}

#[inline]
pub fn mpa(v: f64) -> Stress {
    use uom::si::pressure::megapascal;
    Stress::new::<megapascal>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn mm2(v: f64) -> Area {
    use uom::si::area::square_millimeter;
    Area::new::<square_millimeter>(v)
}

#[inline]
pub fn newton(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn day(v: f64) -> Time {
    use uom::si::time::day;
    Time::new::<day>(v)
}

pub mod constants {
    use super::*;

    /// Modulus of elasticity of seven-wire prestressing strand (28,500 ksi).
    pub const EP_STRAND_PA: f64 = 196.5e9;

    /// Ultimate strength of Grade 270 low-relaxation strand.
    pub const FPU_GRADE270_PA: f64 = 1.86e9;

    #[inline]
    pub fn ep_strand() -> Stress {
        pa(EP_STRAND_PA)
    }
}
