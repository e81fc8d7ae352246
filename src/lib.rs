#![warn(clippy::all)]

//! Map overlay geometry and reprojection core for weather displays.
//!
//! The crate loads vector map overlays (RAP-style text maps, ESRI
//! shapefiles) into a projection-independent model, and keeps each layer's
//! projection-local coordinates current through an explicit clip/reproject
//! pass whenever the visible domain changes. Range-ring and azimuth-line
//! generation round out the display geometry. No rendering or GUI code
//! lives here; consumers draw the local coordinates however they like.

pub mod display;
pub mod error;
pub mod overlay;
pub mod proj;

pub use error::LoadError;
