//! Owned display state: the active projection, the visible domain, and
//! the loaded overlays.
//!
//! Domain or projection changes and the reprojection they force are one
//! method call here, so callers can never observe a half-updated state.

use crate::overlay::Overlay;
use crate::proj::Projection;

use super::domain::{Domain, WorldBox};
use super::reproject::{reproject_overlay, world_bounds};

pub struct DisplayContext {
    proj: Projection,
    /// Full zoom-out extent; domains are constrained to stay inside it.
    limits: Domain,
    domain: Domain,
    world: WorldBox,
    aspect_ratio: f64,
    pub overlays: Vec<Overlay>,
}

impl DisplayContext {
    /// Starts fully zoomed out with no overlays loaded.
    pub fn new(proj: Projection, limits: Domain, aspect_ratio: f64) -> Self {
        let world = world_bounds(&proj, &limits);
        Self {
            proj,
            limits,
            domain: limits,
            world,
            aspect_ratio,
            overlays: Vec::new(),
        }
    }

    pub fn proj(&self) -> &Projection {
        &self.proj
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn world(&self) -> &WorldBox {
        &self.world
    }

    pub fn km_across(&self) -> f64 {
        self.domain.km_across(&self.proj)
    }

    /// Adds an overlay and brings its local coordinates up to date with
    /// the current domain.
    pub fn add_overlay(&mut self, mut overlay: Overlay) {
        reproject_overlay(&self.proj, &self.world, &mut overlay);
        self.overlays.push(overlay);
    }

    /// Zoom or pan: fits the new rectangle to the window aspect ratio,
    /// constrains it to the full extent, and reprojects every overlay.
    pub fn set_domain(&mut self, domain: Domain) {
        let mut domain = domain;
        domain.fit_aspect(self.aspect_ratio, &self.proj);
        domain.constrain_to(&self.limits);
        self.domain = domain;
        self.world = world_bounds(&self.proj, &self.domain);
        self.reproject_all();
        log::debug!(
            "domain now x [{}, {}] y [{}, {}], {:.0} km across",
            self.domain.min_x,
            self.domain.max_x,
            self.domain.min_y,
            self.domain.max_y,
            self.km_across()
        );
    }

    /// Replaces the projection and the local extents that were expressed
    /// in its units, then reprojects every overlay.
    pub fn set_projection(&mut self, proj: Projection, limits: Domain) {
        self.proj = proj;
        self.limits = limits;
        self.domain = limits;
        self.world = world_bounds(&self.proj, &self.domain);
        self.reproject_all();
    }

    fn reproject_all(&mut self) {
        let world = self.world;
        for overlay in &mut self.overlays {
            reproject_overlay(&self.proj, &world, overlay);
        }
    }

    /// Overlays that should draw at the current zoom: active and within
    /// their detail-threshold span.
    pub fn visible_overlays(&self) -> impl Iterator<Item = &Overlay> {
        let span = self.km_across();
        self.overlays.iter().filter(move |o| o.should_render(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{LocalVertex, MapVertex, Polyline};
    use geo_types::Coord;

    fn context_with_point(lat: f64, lon: f64) -> DisplayContext {
        let proj = Projection::flat(40.0, -100.0, 0.0);
        let limits = Domain::new(-500.0, -500.0, 500.0, 500.0);
        let mut ctx = DisplayContext::new(proj, limits, 1.0);

        let mut overlay = Overlay::default();
        overlay.active = true;
        let mut poly = Polyline::new("pt");
        poly.vertices.push(MapVertex::Point(Coord { x: lon, y: lat }));
        overlay.polylines.push(poly);
        ctx.add_overlay(overlay);
        ctx
    }

    #[test]
    fn add_overlay_projects_immediately() {
        let ctx = context_with_point(40.5, -100.0);
        assert!(matches!(
            ctx.overlays[0].polylines[0].local[0],
            LocalVertex::At(_)
        ));
    }

    #[test]
    fn zooming_reclips_geometry() {
        let mut ctx = context_with_point(40.5, -100.0);
        // zoom into the south-west corner, away from the point
        ctx.set_domain(Domain::new(-500.0, -500.0, -300.0, -300.0));
        assert_eq!(ctx.overlays[0].polylines[0].local[0], LocalVertex::Clipped);

        ctx.set_domain(Domain::new(-500.0, -500.0, 500.0, 500.0));
        assert!(matches!(
            ctx.overlays[0].polylines[0].local[0],
            LocalVertex::At(_)
        ));
    }

    #[test]
    fn projection_change_recomputes_locals() {
        let mut ctx = context_with_point(40.5, -100.0);
        let before = match ctx.overlays[0].polylines[0].local[0] {
            LocalVertex::At(p) => p,
            other => panic!("expected projected vertex, got {other:?}"),
        };

        let latlon = Projection::latlon(40.0, -100.0);
        ctx.set_projection(latlon, Domain::new(-110.0, 30.0, -90.0, 50.0));
        let after = match ctx.overlays[0].polylines[0].local[0] {
            LocalVertex::At(p) => p,
            other => panic!("expected projected vertex, got {other:?}"),
        };
        // local units changed from km north of origin to absolute degrees
        assert!((before.y - 55.6).abs() < 1.0);
        assert!((after.x + 100.0).abs() < 1e-9 && (after.y - 40.5).abs() < 1e-9);
    }

    #[test]
    fn domain_changes_respect_limits_and_aspect() {
        let mut ctx = context_with_point(40.5, -100.0);
        ctx.set_domain(Domain::new(300.0, 300.0, 700.0, 400.0));
        let d = *ctx.domain();
        // clipped to the 500 km extent and squared up by aspect
        assert!(d.max_x <= 500.0 && d.max_y <= 500.0);
        assert!((d.width() - d.height()).abs() < 1e-9);
    }

    #[test]
    fn visibility_follows_detail_thresholds() {
        let mut ctx = context_with_point(40.5, -100.0);
        ctx.overlays[0].detail_thresh_min = 0.0;
        ctx.overlays[0].detail_thresh_max = 50.0;

        // full extent: 1000 km across, overlay too detailed to show
        assert_eq!(ctx.visible_overlays().count(), 0);

        ctx.set_domain(Domain::new(-20.0, -20.0, 20.0, 20.0));
        assert_eq!(ctx.visible_overlays().count(), 1);
    }
}
