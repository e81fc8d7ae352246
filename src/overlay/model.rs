//! In-memory model for one loadable map overlay.
//!
//! Geometry is stored twice: the geographic coordinates as parsed from the
//! source file, and the derived local (projection-plane) coordinates for
//! the current visible domain. The local side is rebuilt wholesale by the
//! reproject pass; a polyline is either fully reprojected or stale, never
//! partially updated.

use std::collections::HashMap;
use std::sync::Arc;

use geo_types::Coord;
use glam::DVec2;

/// One source-side polyline vertex. Pen-up breaks the drawn line without
/// ending the polyline; shapefile part boundaries import as pen-ups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapVertex {
    /// Geographic position, x = longitude, y = latitude, degrees.
    Point(Coord<f64>),
    PenUp,
}

/// One derived local-coordinate vertex for the current domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalVertex {
    /// Inside the clip region, projected to local coordinates.
    At(DVec2),
    /// Source pen-up, carried through unchanged.
    PenUp,
    /// Outside the clip region for the current domain; the vertex stays in
    /// the model and the drawn line breaks here.
    Clipped,
}

/// Axis-aligned bounds in local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalBounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl LocalBounds {
    pub fn of_point(p: DVec2) -> Self {
        Self { min: p, max: p }
    }

    pub fn include(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn overlaps(&self, other: &LocalBounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// A connected (or pen-up-segmented) sequence of map vertices.
#[derive(Clone, Debug, Default)]
pub struct Polyline {
    pub label: String,
    pub vertices: Vec<MapVertex>,
    /// Parallel to `vertices` once reprojected; empty while stale.
    pub local: Vec<LocalVertex>,
    /// Bounds over the `At` vertices only; `None` while stale or when every
    /// vertex is clipped.
    pub local_bounds: Option<LocalBounds>,
}

impl Polyline {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn num_points(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the local side matches the vertex list for some domain.
    pub fn is_projected(&self) -> bool {
        self.local.len() == self.vertices.len()
    }
}

/// One point of an icon glyph, in pixel offsets from the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconPoint {
    Offset { x: i16, y: i16 },
    PenUp,
}

/// A small reusable vector glyph, shared by reference among instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconDef {
    pub name: String,
    pub points: Vec<IconPoint>,
}

/// One placed occurrence of an [`IconDef`].
#[derive(Clone, Debug)]
pub struct IconInstance {
    pub icon: Arc<IconDef>,
    pub lat: f64,
    pub lon: f64,
    /// Pixel offset of the attached text from the anchor.
    pub text_x: i32,
    pub text_y: i32,
    pub label: String,
    /// Local anchor for the current domain; `None` when clipped or stale.
    pub local: Option<DVec2>,
}

/// An anchored, optionally rotated text annotation.
#[derive(Clone, Debug)]
pub struct Label {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    pub rotation: f64,
    pub attach_lat: f64,
    pub attach_lon: f64,
    pub text: String,
    /// Local anchor for the current domain; `None` when clipped or stale.
    pub local: Option<DVec2>,
}

/// One loadable map layer: registry metadata plus owned geometry.
#[derive(Clone, Debug)]
pub struct Overlay {
    /// Short code the registry keys the layer by.
    pub code: String,
    /// Human-readable menu label.
    pub control_label: String,
    /// Name the map file declares for itself, if any.
    pub map_name: String,
    /// Source file name or URL, as given in the registry.
    pub file_name: String,
    pub default_on: bool,
    pub active: bool,
    pub line_width: u32,
    /// Visible-span range (km across screen) within which this layer draws.
    pub detail_thresh_min: f64,
    pub detail_thresh_max: f64,
    pub color: String,
    pub polylines: Vec<Polyline>,
    pub icons: Vec<IconInstance>,
    pub labels: Vec<Label>,
    icon_defs: HashMap<String, Arc<IconDef>>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            code: String::new(),
            control_label: String::new(),
            map_name: String::new(),
            file_name: String::new(),
            default_on: false,
            active: false,
            line_width: 1,
            detail_thresh_min: 0.0,
            detail_thresh_max: 100_000.0, // draw at any zoom unless narrowed
            color: "white".to_string(),
            polylines: Vec::new(),
            icons: Vec::new(),
            labels: Vec::new(),
            icon_defs: HashMap::new(),
        }
    }
}

impl Overlay {
    pub fn new(code: &str, control_label: &str, file_name: &str) -> Self {
        Self {
            code: code.to_string(),
            control_label: control_label.to_string(),
            file_name: file_name.to_string(),
            ..Self::default()
        }
    }

    /// Interns an icon definition under its name, returning the shared
    /// handle. A redefinition replaces the old glyph for later lookups;
    /// instances already placed keep the handle they resolved.
    pub fn add_icon_def(&mut self, def: IconDef) -> Arc<IconDef> {
        let shared = Arc::new(def);
        self.icon_defs
            .insert(shared.name.clone(), Arc::clone(&shared));
        shared
    }

    pub fn icon_def(&self, name: &str) -> Option<Arc<IconDef>> {
        self.icon_defs.get(name).cloned()
    }

    pub fn num_icon_defs(&self) -> usize {
        self.icon_defs.len()
    }

    /// True when the load produced no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.icons.is_empty() && self.labels.is_empty()
    }

    /// Detail-threshold and activity cull, `km_across_screen` being the
    /// diagonal span of the visible domain in km.
    pub fn should_render(&self, km_across_screen: f64) -> bool {
        self.active
            && !(self.detail_thresh_min > km_across_screen)
            && !(self.detail_thresh_max < km_across_screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_thresholds_cull_by_span() {
        let overlay = Overlay {
            active: true,
            detail_thresh_min: 0.0,
            detail_thresh_max: 50.0,
            ..Overlay::default()
        };
        assert!(!overlay.should_render(100.0));
        assert!(overlay.should_render(30.0));
    }

    #[test]
    fn inactive_overlay_never_renders() {
        let overlay = Overlay {
            active: false,
            ..Overlay::default()
        };
        assert!(!overlay.should_render(30.0));
    }

    #[test]
    fn icon_defs_are_shared_by_handle() {
        let mut overlay = Overlay::default();
        let def = overlay.add_icon_def(IconDef {
            name: "station".to_string(),
            points: vec![
                IconPoint::Offset { x: -2, y: 0 },
                IconPoint::Offset { x: 2, y: 0 },
            ],
        });
        let looked_up = overlay.icon_def("station").unwrap();
        assert!(Arc::ptr_eq(&def, &looked_up));
        assert!(overlay.icon_def("missing").is_none());
    }

    #[test]
    fn bounds_grow_to_cover_points() {
        let mut b = LocalBounds::of_point(DVec2::new(1.0, 2.0));
        b.include(DVec2::new(-3.0, 5.0));
        assert_eq!(b.min, DVec2::new(-3.0, 2.0));
        assert_eq!(b.max, DVec2::new(1.0, 5.0));
        assert!(b.overlaps(&LocalBounds::of_point(DVec2::new(0.0, 3.0))));
        assert!(!b.overlaps(&LocalBounds::of_point(DVec2::new(10.0, 10.0))));
    }
}
