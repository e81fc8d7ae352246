//! Overlay map layers: the in-memory model, the two file parsers, the
//! registry/configuration contract, and source resolution.
//!
//! Parsers populate an [`Overlay`] once per load; the display side derives
//! and refreshes its local coordinates on every domain change.

mod model;
mod rap;
mod registry;
mod shape;
mod source;

pub use model::{
    IconDef, IconInstance, IconPoint, Label, LocalBounds, LocalVertex, MapVertex, Overlay, Polyline,
};
pub use rap::parse_rap_map;
pub use registry::{parse_overlay_registry, parse_registry_line, DisplayConfig, RegistryEntry};
pub use shape::parse_shapefile;
pub use source::{is_shapefile_name, load_overlay, MapSource};
