// st-core/src/units.rs

use uom::si::f64::{
    AngularVelocity as UomAngularVelocity, Frequency as UomFrequency, Time as UomTime,
};

use crate::numeric::TWO_PI;

// Public canonical unit types (SI, f64)
pub type Frequency = UomFrequency;
pub type AngularVelocity = UomAngularVelocity;
pub type Time = UomTime;

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn rad_per_s(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::radian_per_second;
    AngularVelocity::new::<radian_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

/// Cyclic frequency to angular velocity (ω = 2πf).
#[inline]
pub fn to_angular(f: Frequency) -> AngularVelocity {
    use uom::si::frequency::hertz;
    rad_per_s(TWO_PI * f.get::<hertz>())
}

/// Angular velocity to cyclic frequency (f = ω/2π).
#[inline]
pub fn to_cyclic(w: AngularVelocity) -> Frequency {
    use uom::si::angular_velocity::radian_per_second;
    hz(w.get::<radian_per_second>() / TWO_PI)
}

#[inline]
pub fn hz_to_rad(f_hz: f64) -> f64 {
    use uom::si::angular_velocity::radian_per_second;
    to_angular(hz(f_hz)).get::<radian_per_second>()
}

#[inline]
pub fn rad_to_hz(w: f64) -> f64 {
    use uom::si::frequency::hertz;
    to_cyclic(rad_per_s(w)).get::<hertz>()
}

/// Sample period of a sampling frequency.
#[inline]
pub fn period(fs: Frequency) -> Time {
    use uom::si::frequency::hertz;
    s(1.0 / fs.get::<hertz>())
}
