//! Display-side state: the visible domain, the clip/reproject pass that
//! keeps overlay local coordinates current, and range-ring generation.
//!
//! Everything here works in projection-local coordinates; geographic
//! coordinates enter only through the overlay model and the projection.

mod context;
mod domain;
mod reproject;
mod rings;
mod ticks;

pub use context::DisplayContext;
pub use domain::{normalize_lon, Domain, WorldBox, CLIP_BUFFER_DEG, CLIP_BUFFER_KM};
pub use reproject::{reproject_overlay, world_bounds, LON_JUMP_MAX_DEG};
pub use rings::{
    generate_azimuth_lines, generate_range_rings, station_ring, AzimuthLine, RangeRing,
    RingOptions,
};
pub use ticks::tick_interval;
