//! Map source resolution.
//!
//! Overlay file names resolve against a comma-separated directory list, with
//! the current directory implicitly tried first. A name or directory entry
//! that is itself a URL is fetched in full over blocking HTTP before parsing,
//! so shapefile bytes never touch disk.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::LoadError;

use super::model::Overlay;
use super::rap::parse_rap_map;
use super::shape::parse_shapefile;

/// Resolves overlay names to raw file bytes.
pub struct MapSource {
    dirs: Vec<String>,
    client: reqwest::blocking::Client,
}

impl MapSource {
    /// Builds a source over `dir_list` (comma-separated). The proxy URL may
    /// be empty; `timeout` bounds every HTTP fetch.
    pub fn new(dir_list: &str, proxy_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let mut dirs = vec![".".to_string()];
        dirs.extend(
            dir_list
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        );

        let mut builder = reqwest::blocking::Client::builder().timeout(timeout);
        if !proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| LoadError::Config(format!("bad http proxy {proxy_url}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| LoadError::Config(format!("http client: {e}")))?;

        Ok(MapSource { dirs, client })
    }

    /// Resolves `name` and reads its full contents into memory. Local
    /// directories are searched in order, first hit wins; URL directory
    /// entries are tried over HTTP.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, LoadError> {
        if is_url(name) {
            return self.fetch(name);
        }
        for dir in &self.dirs {
            if is_url(dir) {
                let url = format!("{}/{}", dir.trim_end_matches('/'), name);
                match self.fetch(&url) {
                    Ok(bytes) => return Ok(bytes),
                    Err(e) => log::debug!("{}", e),
                }
            } else {
                let path = Path::new(dir).join(name);
                if path.is_file() {
                    return fs::read(&path).map_err(|source| LoadError::Io {
                        path: path.display().to_string(),
                        source,
                    });
                }
            }
        }
        Err(LoadError::NotFound(name.to_string()))
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let wrap = |source: reqwest::Error| LoadError::Http {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().map_err(wrap)?;
        let response = response.error_for_status().map_err(wrap)?;
        Ok(response.bytes().map_err(wrap)?.to_vec())
    }
}

/// Whether a registry file name refers to shapefile data.
pub fn is_shapefile_name(name: &str) -> bool {
    name.contains(".shp") || name.contains(".shx")
}

fn is_url(name: &str) -> bool {
    name.starts_with("http://") || name.starts_with("https://")
}

/// Geometry lives in the `.shp` member of a shapefile pair.
fn fetch_name(name: &str) -> String {
    name.replace(".shx", ".shp")
}

/// Fills `overlay` from its configured source. Any failure to fetch or open
/// the source is logged and leaves the overlay empty; per-record problems are
/// handled inside the parsers.
pub fn load_overlay(overlay: &mut Overlay, source: &MapSource) {
    let name = fetch_name(&overlay.file_name);
    let bytes = match source.read(&name) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("{}: leaving overlay empty: {}", overlay.code, e);
            return;
        }
    };

    if is_shapefile_name(&name) {
        if let Err(e) = parse_shapefile(overlay, &bytes) {
            log::warn!("{}: leaving overlay empty: {}", overlay.code, e);
            return;
        }
    } else {
        parse_rap_map(overlay, &String::from_utf8_lossy(&bytes));
    }

    log::debug!(
        "{}: loaded {} ({} polylines, {} icons, {} labels)",
        overlay.code,
        name,
        overlay.polylines.len(),
        overlay.icons.len(),
        overlay.labels.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_source(dir_list: &str) -> MapSource {
        MapSource::new(dir_list, "", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn current_dir_is_searched_first() {
        let source = local_source("");
        let bytes = source.read("Cargo.toml").unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn listed_directories_are_searched_in_order() {
        // lib.rs only resolves through the src entry
        let source = local_source(" src , ");
        let bytes = source.read("lib.rs").unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn unresolved_names_report_not_found() {
        let source = local_source("src");
        match source.read("no_such_map.rap") {
            Err(LoadError::NotFound(name)) => assert_eq!(name, "no_such_map.rap"),
            other => panic!("expected NotFound, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn bad_proxy_is_a_config_error() {
        let result = MapSource::new("", "not a proxy", Duration::from_secs(1));
        assert!(matches!(result, Err(LoadError::Config(_))));
    }

    #[test]
    fn shapefile_names_are_detected() {
        assert!(is_shapefile_name("counties.shp"));
        assert!(is_shapefile_name("counties.shx"));
        assert!(!is_shapefile_name("counties.map"));
        assert_eq!(fetch_name("counties.shx"), "counties.shp");
        assert_eq!(fetch_name("usa.map"), "usa.map");
    }

    #[test]
    fn missing_source_leaves_overlay_empty() {
        let mut overlay = Overlay::new("STATES", "States", "no_such_file.map");
        overlay.active = true;
        load_overlay(&mut overlay, &local_source(""));
        assert!(overlay.is_empty());
        // the configured flag survives a failed load
        assert!(overlay.active);
    }
}
