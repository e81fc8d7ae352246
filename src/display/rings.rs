//! Range rings and azimuth lines around a radar or display origin.

use geo_types::Coord;
use glam::DVec2;

use crate::overlay::{MapVertex, Polyline};
use crate::proj::{destination, gauss_ring, Projection};

use super::domain::Domain;
use super::ticks::tick_interval;

/// Points per ring: 6° azimuth steps, first point repeated to close.
const RING_POINTS: usize = 61;
const AZIMUTH_STEP_DEG: f64 = 6.0;

/// Ring and azimuth-line settings, in display units (km times
/// `units_per_km`).
#[derive(Clone, Debug)]
pub struct RingOptions {
    /// Ring spacing; non-positive selects automatic spacing from the
    /// domain diagonal.
    pub spacing: f64,
    /// Outer radius clamp bounding the generated ring count.
    pub max_ring_range: f64,
    /// Angular step between azimuth lines, degrees.
    pub azimuth_interval: f64,
    /// Length of each azimuth line from the origin.
    pub azimuth_radius: f64,
    /// Display units per kilometer, with the matching label suffix.
    pub units_per_km: f64,
    pub units_label: String,
    /// Accept an origin at exactly (0, 0), which is otherwise treated as
    /// an unset-origin sentinel.
    pub zero_origin_valid: bool,
}

impl Default for RingOptions {
    fn default() -> Self {
        Self {
            spacing: -1.0, // automatic
            max_ring_range: 1000.0,
            azimuth_interval: 30.0,
            azimuth_radius: 200.0,
            units_per_km: 1.0,
            units_label: "km".to_string(),
            zero_origin_valid: false,
        }
    }
}

/// One generated ring: a closed local-coordinate polyline plus the anchor
/// where its radius label goes.
#[derive(Clone, Debug)]
pub struct RangeRing {
    /// Radius in display units.
    pub radius: f64,
    /// Exactly [`RING_POINTS`] local-coordinate points.
    pub points: Vec<DVec2>,
    pub label_anchor: DVec2,
    pub label: String,
}

/// One azimuth line, origin to outer end, in local coordinates.
#[derive(Clone, Debug)]
pub struct AzimuthLine {
    pub azimuth_deg: f64,
    pub start: DVec2,
    pub end: DVec2,
}

fn origin_is_degenerate(lat: f64, lon: f64, opts: &RingOptions) -> bool {
    if lat == -90.0 && lon == -180.0 {
        return true;
    }
    lat == 0.0 && lon == 0.0 && !opts.zero_origin_valid
}

/// Generates range rings around (`origin_lat`, `origin_lon`), outermost
/// first. Returns no rings for a degenerate origin.
pub fn generate_range_rings(
    proj: &Projection,
    domain: &Domain,
    origin_lat: f64,
    origin_lon: f64,
    opts: &RingOptions,
) -> Vec<RangeRing> {
    if origin_is_degenerate(origin_lat, origin_lon, opts) {
        log::debug!("range rings skipped, degenerate origin ({origin_lat}, {origin_lon})");
        return Vec::new();
    }

    let spacing = if opts.spacing > 0.0 {
        opts.spacing
    } else {
        tick_interval(domain.diagonal_km(proj) * opts.units_per_km)
    };

    // corner distances from the origin, in display units
    let corners = [
        (domain.min_x, domain.min_y),
        (domain.min_x, domain.max_y),
        (domain.max_x, domain.min_y),
        (domain.max_x, domain.max_y),
    ];
    let mut min_corner = f64::INFINITY;
    let mut max_corner: f64 = 0.0;
    for (x, y) in corners {
        let (clat, clon) = proj.xy2latlon(x, y);
        let (range_km, _) = crate::proj::range_bearing(origin_lat, origin_lon, clat, clon);
        let d = range_km * opts.units_per_km;
        min_corner = min_corner.min(d);
        max_corner = max_corner.max(d);
    }

    let mut outer = (max_corner / spacing).ceil() * spacing;
    if outer > opts.max_ring_range {
        outer = (opts.max_ring_range / spacing).floor() * spacing;
    }

    let (ox, oy) = proj.latlon2xy(origin_lat, origin_lon);
    let inner = if domain.contains(ox, oy) {
        spacing
    } else {
        ((min_corner / spacing).floor() * spacing).max(spacing)
    };

    let n_outer = (outer / spacing).round() as i64;
    let n_inner = (inner / spacing).round() as i64;
    let mut rings = Vec::new();
    for n in (n_inner..=n_outer).rev() {
        let radius = n as f64 * spacing;
        let range_km = radius / opts.units_per_km;

        let mut points = Vec::with_capacity(RING_POINTS);
        for step in 0..RING_POINTS {
            let az = step as f64 * AZIMUTH_STEP_DEG;
            let p = destination(origin_lat, origin_lon, range_km, az);
            let (x, y) = proj.latlon2xy(p.y, p.x);
            points.push(DVec2::new(x, y));
        }

        let label_anchor = points
            .iter()
            .find(|p| domain.contains(p.x, p.y))
            .copied()
            .unwrap_or(points[0]);

        rings.push(RangeRing {
            radius,
            points,
            label_anchor,
            label: format_ring_label(radius, &opts.units_label),
        });
    }
    rings
}

/// Generates azimuth lines through the origin at the configured angular
/// interval, as origin-to-endpoint segments in local coordinates.
pub fn generate_azimuth_lines(
    proj: &Projection,
    origin_lat: f64,
    origin_lon: f64,
    opts: &RingOptions,
) -> Vec<AzimuthLine> {
    if origin_is_degenerate(origin_lat, origin_lon, opts) {
        log::debug!("azimuth lines skipped, degenerate origin ({origin_lat}, {origin_lon})");
        return Vec::new();
    }
    if opts.azimuth_interval <= 0.0 {
        log::warn!(
            "azimuth lines skipped, non-positive interval {}",
            opts.azimuth_interval
        );
        return Vec::new();
    }

    let (ox, oy) = proj.latlon2xy(origin_lat, origin_lon);
    let start = DVec2::new(ox, oy);
    let range_km = opts.azimuth_radius / opts.units_per_km;

    let count = (360.0 / opts.azimuth_interval) as usize;
    let mut lines = Vec::with_capacity(count);
    for step in 0..count {
        let az = step as f64 * opts.azimuth_interval;
        let p = destination(origin_lat, origin_lon, range_km, az);
        let (x, y) = proj.latlon2xy(p.y, p.x);
        lines.push(AzimuthLine {
            azimuth_deg: az,
            start,
            end: DVec2::new(x, y),
        });
    }
    lines
}

/// Builds a closed map polyline for a station range ring walked in the
/// Gauss survey plane rather than on the sphere; inputs use the survey
/// convention (latitude positive south), the returned vertices are
/// geographic and ready for the reproject pass.
pub fn station_ring(lat: f64, lon: f64, ref_meridian: f64, range_m: f64, label: &str) -> Polyline {
    let ring = gauss_ring(lat, lon, ref_meridian, range_m, AZIMUTH_STEP_DEG);
    let mut poly = Polyline::new(label);
    for p in &ring {
        poly.vertices.push(MapVertex::Point(Coord { x: p.x, y: -p.y }));
    }
    if let Some(&first) = poly.vertices.first() {
        poly.vertices.push(first); // close the ring
    }
    poly
}

fn format_ring_label(radius: f64, units_label: &str) -> String {
    // shave float noise so repeated spacing sums print as round values
    let rounded = (radius * 1e6).round() / 1e6;
    format!("{rounded} {units_label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_at_zero() -> Projection {
        Projection::flat(0.0, 0.0, 0.0)
    }

    fn zero_ok() -> RingOptions {
        RingOptions {
            zero_origin_valid: true,
            ..RingOptions::default()
        }
    }

    #[test]
    fn rings_have_61_points_and_respect_the_clamp() {
        let proj = flat_at_zero();
        let domain = Domain::new(-2000.0, -2000.0, 2000.0, 2000.0);
        let rings = generate_range_rings(&proj, &domain, 0.0, 0.0, &zero_ok());

        assert!(!rings.is_empty());
        for ring in &rings {
            assert_eq!(ring.points.len(), 61);
            assert!(ring.radius <= 1000.0);
        }
        // outermost first
        assert!(rings.first().unwrap().radius > rings.last().unwrap().radius);
    }

    #[test]
    fn degenerate_origins_generate_nothing() {
        let proj = flat_at_zero();
        let domain = Domain::new(-100.0, -100.0, 100.0, 100.0);
        assert!(generate_range_rings(&proj, &domain, 0.0, 0.0, &RingOptions::default()).is_empty());
        assert!(generate_range_rings(&proj, &domain, -90.0, -180.0, &zero_ok()).is_empty());
        assert!(generate_azimuth_lines(&proj, 0.0, 0.0, &RingOptions::default()).is_empty());
    }

    #[test]
    fn explicit_spacing_overrides_the_ladder() {
        let proj = flat_at_zero();
        let domain = Domain::new(-300.0, -300.0, 300.0, 300.0);
        let opts = RingOptions {
            spacing: 100.0,
            ..zero_ok()
        };
        let rings = generate_range_rings(&proj, &domain, 0.0, 0.0, &opts);
        for ring in &rings {
            assert!((ring.radius % 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ring_radius_matches_local_distance_on_flat() {
        let proj = flat_at_zero();
        let domain = Domain::new(-300.0, -300.0, 300.0, 300.0);
        let opts = RingOptions {
            spacing: 200.0,
            ..zero_ok()
        };
        let rings = generate_range_rings(&proj, &domain, 0.0, 0.0, &opts);
        let ring = rings.iter().find(|r| r.radius == 200.0).unwrap();
        for p in &ring.points {
            assert!((p.length() - 200.0).abs() < 1e-6);
        }
    }

    #[test]
    fn label_anchor_prefers_a_visible_point() {
        let proj = flat_at_zero();
        // window north-east of the origin, rings partially visible
        let domain = Domain::new(50.0, 50.0, 400.0, 400.0);
        let opts = RingOptions {
            spacing: 100.0,
            ..zero_ok()
        };
        let rings = generate_range_rings(&proj, &domain, 0.0, 0.0, &opts);
        let ring = rings.iter().find(|r| r.radius == 300.0).unwrap();
        assert!(domain.contains(ring.label_anchor.x, ring.label_anchor.y));
    }

    #[test]
    fn azimuth_lines_step_the_circle() {
        let proj = flat_at_zero();
        let lines = generate_azimuth_lines(&proj, 0.0, 0.0, &zero_ok());
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0].azimuth_deg, 0.0);
        assert_eq!(lines[3].azimuth_deg, 90.0);
        for line in &lines {
            assert!((line.end.length() - 200.0).abs() < 1e-6);
            assert_eq!(line.start, DVec2::ZERO);
        }
    }

    #[test]
    fn station_rings_close_and_come_out_geographic() {
        // Bethlehem radar in the survey convention: 28.25 S, meridian 28
        let ring = station_ring(28.25, 28.33, 28.0, 100_000.0, "100 km");
        assert_eq!(ring.vertices.len(), 61);
        assert_eq!(ring.vertices.first(), ring.vertices.last());
        assert_eq!(ring.label, "100 km");
        for v in &ring.vertices {
            match v {
                MapVertex::Point(c) => {
                    assert!(c.y < -27.0 && c.y > -29.5, "lat {}", c.y);
                    assert!(c.x > 27.0 && c.x < 29.5, "lon {}", c.x);
                }
                MapVertex::PenUp => panic!("unexpected pen-up"),
            }
        }
    }

    #[test]
    fn labels_print_round_values() {
        assert_eq!(format_ring_label(200.0, "km"), "200 km");
        assert_eq!(format_ring_label(0.30000000000000004, "nm"), "0.3 nm");
        assert_eq!(format_ring_label(0.25, "km"), "0.25 km");
    }
}
