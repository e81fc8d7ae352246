//! The visible domain rectangle and the geographic envelope derived from
//! it for clip decisions.

use crate::proj::{Projection, KM_PER_DEG};

/// Clip buffer around the display rectangle for km-based projections.
pub const CLIP_BUFFER_KM: f64 = 25.0;
/// Clip buffer around the display rectangle for the lat-lon projection.
pub const CLIP_BUFFER_DEG: f64 = 0.4;

/// Current zoom/pan rectangle in projection-local coordinates (km, or
/// degrees under the lat-lon projection).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Domain {
    /// Builds a rectangle from two opposite corners in either order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Horizontal span of the domain in km, the scale measure used for
    /// detail-threshold culling and font sizing.
    pub fn km_across(&self, proj: &Projection) -> f64 {
        if proj.is_latlon() {
            self.width() * KM_PER_DEG
        } else {
            self.width()
        }
    }

    /// Diagonal span in km, used to pick range-ring spacing.
    pub fn diagonal_km(&self, proj: &Projection) -> f64 {
        let d = self.width().hypot(self.height());
        if proj.is_latlon() {
            d * KM_PER_DEG
        } else {
            d
        }
    }

    /// Grows the smaller dimension symmetrically so the rectangle matches
    /// the window aspect ratio. Under the lat-lon projection the height is
    /// first foreshortened by cos(origin latitude) so boxes look right.
    pub fn fit_aspect(&mut self, aspect_ratio: f64, proj: &Projection) {
        let dx = self.width();
        let mut dy = self.height();
        if proj.is_latlon() {
            dy /= proj.origin().0.to_radians().cos();
        }
        dy *= aspect_ratio;
        if dx > dy {
            self.max_y += (dx - dy) / 2.0;
            self.min_y -= (dx - dy) / 2.0;
        } else {
            self.max_x += (dy - dx) / 2.0;
            self.min_x -= (dy - dx) / 2.0;
        }
    }

    /// Shifts the rectangle back inside `limits`, preserving its size
    /// where possible.
    pub fn constrain_to(&mut self, limits: &Domain) {
        if self.max_x > limits.max_x {
            self.min_x -= self.max_x - limits.max_x;
            self.max_x = limits.max_x;
        }
        if self.max_y > limits.max_y {
            self.min_y -= self.max_y - limits.max_y;
            self.max_y = limits.max_y;
        }
        if self.min_x < limits.min_x {
            self.max_x += limits.min_x - self.min_x;
            self.min_x = limits.min_x;
        }
        if self.min_y < limits.min_y {
            self.max_y += limits.min_y - self.min_y;
            self.min_y = limits.min_y;
        }
    }
}

/// Geographic envelope of the visible domain, used to decide which map
/// features are worth projecting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl WorldBox {
    /// Conservative fallback covering every representable position,
    /// including longitudes already shifted by a cycle.
    pub fn full_world() -> Self {
        Self {
            min_lat: -180.0,
            max_lat: 180.0,
            min_lon: -360.0,
            max_lon: 360.0,
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    pub fn is_degenerate(&self) -> bool {
        self.min_lat >= self.max_lat || self.min_lon >= self.max_lon
    }
}

/// Brings `lon` into the 360° cycle starting at `min_lon`. Longitudes
/// already inside `[min_lon, max_lon]` pass through untouched; the result
/// always lies in `[min_lon, min_lon + 360)` otherwise. Non-finite input
/// comes back unchanged for the envelope test to reject.
pub fn normalize_lon(lon: f64, min_lon: f64, max_lon: f64) -> f64 {
    // infinities would shift by cycles forever
    if !lon.is_finite() {
        return lon;
    }
    if lon >= min_lon && lon <= max_lon {
        return lon;
    }
    let mut lon = lon;
    while lon < min_lon {
        lon += 360.0;
    }
    while lon >= min_lon + 360.0 {
        lon -= 360.0;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_may_come_in_any_order() {
        let d = Domain::new(10.0, 20.0, -10.0, -20.0);
        assert_eq!(d.min_x, -10.0);
        assert_eq!(d.max_y, 20.0);
        assert!(d.contains(0.0, 0.0));
        assert!(!d.contains(11.0, 0.0));
    }

    #[test]
    fn km_across_scales_latlon_domains() {
        let flat = Projection::flat(40.0, -100.0, 0.0);
        let ll = Projection::latlon(40.0, -100.0);
        let d = Domain::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(d.km_across(&flat), 10.0);
        assert!((d.km_across(&ll) - 10.0 * KM_PER_DEG).abs() < 1e-9);
    }

    #[test]
    fn fit_aspect_grows_the_short_side() {
        let proj = Projection::flat(40.0, -100.0, 0.0);
        let mut d = Domain::new(0.0, 0.0, 100.0, 40.0);
        d.fit_aspect(1.0, &proj);
        assert_eq!(d.min_x, 0.0);
        assert_eq!(d.max_x, 100.0);
        // height grows symmetrically about its midpoint to match width
        assert!((d.min_y + 30.0).abs() < 1e-9);
        assert!((d.max_y - 70.0).abs() < 1e-9);
    }

    #[test]
    fn fit_aspect_foreshortens_latlon_height() {
        let proj = Projection::latlon(60.0, 0.0);
        let mut d = Domain::new(0.0, 0.0, 10.0, 10.0);
        d.fit_aspect(1.0, &proj);
        // at 60N the 10 degree height counts double, so width grows
        assert!(d.width() > 19.0 && d.width() < 21.0);
        assert_eq!(d.height(), 10.0);
    }

    #[test]
    fn constrain_shifts_window_back_inside() {
        let limits = Domain::new(-100.0, -100.0, 100.0, 100.0);
        let mut d = Domain::new(60.0, -20.0, 140.0, 60.0);
        d.constrain_to(&limits);
        assert_eq!(d.max_x, 100.0);
        assert_eq!(d.min_x, 20.0);
        assert_eq!(d.width(), 80.0);
    }

    #[test]
    fn normalize_lon_is_idempotent_and_in_cycle() {
        let cases = [
            (-500.0, -180.0, 180.0),
            (400.0, -180.0, 180.0),
            (10.0, 0.0, 360.0),
            (-179.0, 100.0, 260.0),
        ];
        for (lon, min, max) in cases {
            let once = normalize_lon(lon, min, max);
            assert!(once >= min && once < min + 360.0, "({lon}, {min}, {max}) -> {once}");
            assert_eq!(normalize_lon(once, min, max), once);
        }
    }

    #[test]
    fn normalize_lon_passes_in_range_values_through() {
        assert_eq!(normalize_lon(170.0, -180.0, 180.0), 170.0);
        assert_eq!(normalize_lon(-0.2, -0.4, 10.4), -0.2);
    }

    #[test]
    fn normalize_lon_returns_non_finite_input_unchanged() {
        // "1e999" in a map file parses as infinity; it must come straight
        // back out instead of spinning the shift loops
        assert_eq!(normalize_lon(f64::INFINITY, -180.0, 180.0), f64::INFINITY);
        assert_eq!(
            normalize_lon(f64::NEG_INFINITY, -180.0, 180.0),
            f64::NEG_INFINITY
        );
        assert!(normalize_lon(f64::NAN, -180.0, 180.0).is_nan());
    }
}
