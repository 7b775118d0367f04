//! Spherical Mercator to and from the unit square.
//!
//! `x` grows eastwards and `y` grows southwards; both lie in `0.0..=1.0`, so a
//! tile pixel at zoom `z` is `extent * 2^z` units of the square.

use std::f64::consts::PI;

#[must_use]
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

#[must_use]
pub fn lat_y(lat: f64) -> f64 {
    let sin = lat.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

#[must_use]
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

#[must_use]
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}
