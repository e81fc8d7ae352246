//! Error taxonomy for overlay loading.
//!
//! Per-record problems inside a map file never surface here; parsers log
//! and skip those records. Only source-level failures, where nothing usable
//! could be read at all, reach the caller as a `LoadError`.

use thiserror::Error;

/// A source-level failure while loading an overlay or its configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The map name did not resolve against any search directory.
    #[error("map source not found: {0}")]
    NotFound(String),

    /// Local file I/O failed for a path that exists.
    #[error("i/o error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP fetch failed, timed out, or returned a bad status.
    #[error("http fetch failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The shapefile reader rejected the source.
    #[error("shapefile error in {name}: {source}")]
    Shapefile {
        name: String,
        #[source]
        source: shapefile::Error,
    },

    /// Display configuration was internally inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}
