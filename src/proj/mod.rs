//! Projection math: forward/inverse transforms for the supported map
//! projections, great-circle utilities, and the Gauss conform survey pair.
//!
//! Pure math, no I/O. Angles are degrees at the public boundary and radians
//! internally; local distances are kilometers except for the lat-lon kind,
//! whose local units are degrees.

mod gauss;
mod great_circle;
mod projection;

pub use gauss::{gauss, gauss_ring, invgauss};
pub use great_circle::{destination, range_bearing, EARTH_RADIUS_KM, KM_PER_DEG};
pub use projection::{condition_lon, Pole, Projection};
