//! Great-circle range/bearing math on the sphere.

use geo_types::Coord;

/// Sphere radius used throughout the display math, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.204;

/// Kilometers per degree of latitude on that sphere.
pub const KM_PER_DEG: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Returns `(range_km, bearing_deg)` from point 1 to point 2.
///
/// Bearing is clockwise from true north in `[0, 360)`.
pub fn range_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let cos_c = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * dlon.cos();
    let c = cos_c.clamp(-1.0, 1.0).acos();

    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    let mut bearing = y.atan2(x).to_degrees();
    if bearing < 0.0 {
        bearing += 360.0;
    }

    (c * EARTH_RADIUS_KM, bearing)
}

/// Returns the point reached from `(lat, lon)` after `range_km` along the
/// great circle at `bearing_deg` (clockwise from north).
///
/// The result uses the x = longitude, y = latitude convention.
pub fn destination(lat: f64, lon: f64, range_km: f64, bearing_deg: f64) -> Coord<f64> {
    let phi = lat.to_radians();
    let lambda = lon.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = range_km / EARTH_RADIUS_KM;

    let phi2 = (phi.sin() * delta.cos() + phi.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 =
        lambda + (theta.sin() * delta.sin() * phi.cos()).atan2(delta.cos() - phi.sin() * phi2.sin());

    Coord {
        x: lambda2.to_degrees(),
        y: phi2.to_degrees(),
    }
}
