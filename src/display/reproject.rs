//! The geo-clip/reproject pass.
//!
//! Run whenever the visible domain or projection changes: every label,
//! icon, and polyline vertex gets its local coordinate recomputed from the
//! stored geographic position, with off-domain geometry marked clipped
//! rather than removed. Cost is linear in the total vertex count and the
//! pass runs once per domain change, not per frame.

use glam::DVec2;

use crate::overlay::{LocalBounds, LocalVertex, MapVertex, Overlay, Polyline};
use crate::proj::Projection;

use super::domain::{normalize_lon, Domain, WorldBox, CLIP_BUFFER_DEG, CLIP_BUFFER_KM};

/// A consecutive-vertex longitude jump beyond this is taken to be a
/// wrap-around artifact and the segment is suppressed. Applies under the
/// lat-lon projection only.
pub const LON_JUMP_MAX_DEG: f64 = 330.0;

/// Geographic envelope of the buffered domain rectangle.
///
/// For the lat-lon projection the rectangle already is geographic, so the
/// envelope is just the buffered rectangle. For km-based projections the
/// corners and the top/bottom edge midpoints of the buffered rectangle are
/// inverse-projected and their lat/lon extent taken; stereographic kinds,
/// where that sampling is unreliable, and degenerate envelopes fall back
/// to the full world.
pub fn world_bounds(proj: &Projection, domain: &Domain) -> WorldBox {
    if proj.is_latlon() {
        return WorldBox {
            min_lat: domain.min_y - CLIP_BUFFER_DEG,
            max_lat: domain.max_y + CLIP_BUFFER_DEG,
            min_lon: domain.min_x - CLIP_BUFFER_DEG,
            max_lon: domain.max_x + CLIP_BUFFER_DEG,
        };
    }
    if proj.is_stereographic() {
        return WorldBox::full_world();
    }

    let min_x = domain.min_x - CLIP_BUFFER_KM;
    let max_x = domain.max_x + CLIP_BUFFER_KM;
    let min_y = domain.min_y - CLIP_BUFFER_KM;
    let max_y = domain.max_y + CLIP_BUFFER_KM;
    let mid_x = (min_x + max_x) / 2.0;
    let samples = [
        (min_x, min_y),
        (min_x, max_y),
        (max_x, min_y),
        (max_x, max_y),
        (mid_x, min_y),
        (mid_x, max_y),
    ];

    let mut world = WorldBox {
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lon: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
    };
    for (x, y) in samples {
        let (lat, lon) = proj.xy2latlon(x, y);
        world.min_lat = world.min_lat.min(lat);
        world.max_lat = world.max_lat.max(lat);
        world.min_lon = world.min_lon.min(lon);
        world.max_lon = world.max_lon.max(lon);
    }

    if world.is_degenerate() {
        log::debug!(
            "degenerate world envelope for {} domain, using full world",
            proj.kind_name()
        );
        return WorldBox::full_world();
    }
    world
}

/// Recomputes the local coordinates of everything in `overlay` for the
/// current projection and world envelope.
pub fn reproject_overlay(proj: &Projection, world: &WorldBox, overlay: &mut Overlay) {
    for label in &mut overlay.labels {
        label.local = project_anchor(proj, world, label.attach_lat, label.attach_lon);
    }
    for icon in &mut overlay.icons {
        icon.local = project_anchor(proj, world, icon.lat, icon.lon);
    }
    let latlon_guard = proj.is_latlon();
    for poly in &mut overlay.polylines {
        reproject_polyline(proj, world, latlon_guard, poly);
    }
}

fn project_anchor(proj: &Projection, world: &WorldBox, lat: f64, lon: f64) -> Option<DVec2> {
    let lon = normalize_lon(lon, world.min_lon, world.max_lon);
    if !world.contains(lat, lon) {
        return None;
    }
    let (x, y) = proj.latlon2xy(lat, lon);
    Some(DVec2::new(x, y))
}

fn reproject_polyline(proj: &Projection, world: &WorldBox, latlon_guard: bool, poly: &mut Polyline) {
    let mut local = Vec::with_capacity(poly.vertices.len());
    let mut bounds: Option<LocalBounds> = None;
    let mut prev_lon: Option<f64> = None;

    for vertex in &poly.vertices {
        match vertex {
            MapVertex::PenUp => {
                local.push(LocalVertex::PenUp);
                prev_lon = None;
            }
            MapVertex::Point(c) => {
                let lat = c.y;
                let lon = normalize_lon(c.x, world.min_lon, world.max_lon);
                let wrap_jump = latlon_guard
                    && prev_lon.is_some_and(|p| (lon - p).abs() > LON_JUMP_MAX_DEG);
                prev_lon = Some(lon);
                if wrap_jump || !world.contains(lat, lon) {
                    local.push(LocalVertex::Clipped);
                } else {
                    let (x, y) = proj.latlon2xy(lat, lon);
                    let p = DVec2::new(x, y);
                    match &mut bounds {
                        Some(b) => b.include(p),
                        None => bounds = Some(LocalBounds::of_point(p)),
                    }
                    local.push(LocalVertex::At(p));
                }
            }
        }
    }

    poly.local = local;
    poly.local_bounds = bounds;
}
