//! Overlay registration and display configuration.
//!
//! Overlays are declared one per line in the legacy registry format, or as
//! structured entries inside [`DisplayConfig`]. Both feed [`RegistryEntry`],
//! so the two spellings mean the same thing.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::proj::{Pole, Projection};

use super::model::Overlay;

/// Registry lines must be longer than this to carry all required fields.
const MIN_LINE_LEN: usize = 20;

/// One overlay declaration:
/// `<code> <control_label> <file_name> <on_and_width> <detail_min> <detail_max> <color...>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    pub code: String,
    pub control_label: String,
    /// Map file name or URL, resolved by the map source.
    pub file_name: String,
    /// Single integer doubling as the default-on flag (non-zero = on) and
    /// the line width (non-positive values draw one pixel wide).
    pub on_and_width: i32,
    /// Visible-span thresholds in km across the screen.
    pub detail_min: f64,
    pub detail_max: f64,
    pub color: String,
}

impl Default for RegistryEntry {
    fn default() -> Self {
        Self {
            code: String::new(),
            control_label: String::new(),
            file_name: String::new(),
            on_and_width: 0,
            detail_min: 0.0,
            detail_max: 100_000.0, // draw at any zoom unless narrowed
            color: "white".to_string(),
        }
    }
}

impl RegistryEntry {
    /// Builds the overlay shell this entry declares. Geometry is loaded
    /// separately by the map source.
    pub fn to_overlay(&self, replace_underscores: bool) -> Overlay {
        let label = if replace_underscores {
            self.control_label.replace('_', " ")
        } else {
            self.control_label.clone()
        };
        let mut overlay = Overlay::new(&self.code, &label, &self.file_name);
        overlay.default_on = self.on_and_width != 0;
        overlay.active = overlay.default_on;
        overlay.line_width = if self.on_and_width > 0 {
            self.on_and_width as u32
        } else {
            1
        };
        overlay.detail_thresh_min = self.detail_min;
        overlay.detail_thresh_max = self.detail_max;
        overlay.color = self.color.clone();
        overlay
    }
}

/// Parses one registry line. Comment lines and lines not longer than 20
/// characters produce `None`; so do lines with fewer than 7 fields, with a
/// warning.
pub fn parse_registry_line(line: &str) -> Option<RegistryEntry> {
    if line.len() <= MIN_LINE_LEN || line.starts_with('#') {
        return None;
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 7 {
        log::warn!(
            "registry line has {} of 7 required fields: {}",
            fields.len(),
            line
        );
        return None;
    }
    Some(RegistryEntry {
        code: fields[0].to_string(),
        control_label: fields[1].to_string(),
        file_name: fields[2].to_string(),
        on_and_width: fields[3].parse().unwrap_or(0),
        detail_min: fields[4].parse().unwrap_or(0.0),
        detail_max: fields[5].parse().unwrap_or(100_000.0),
        color: fields[6..].join(" "),
    })
}

/// Parses a whole registry file into overlay shells, in declaration order.
pub fn parse_overlay_registry(text: &str, replace_underscores: bool) -> Vec<Overlay> {
    text.lines()
        .filter_map(parse_registry_line)
        .map(|entry| entry.to_overlay(replace_underscores))
        .collect()
}

/// Display configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Projection name: CARTESIAN, LAT_LON, LAMBERT, STEREOGRAPHIC,
    /// POLAR_STEREO, MERCATOR, TRANS_MERCATOR, ALBERS or LAMBERT_AZIM.
    pub projection: String,
    pub origin_lat: f64,
    pub origin_lon: f64,
    /// Flat-projection rotation from true north, degrees.
    pub rotation: f64,
    /// Standard parallels for LAMBERT and ALBERS.
    pub lambert_lat1: f64,
    pub lambert_lat2: f64,
    /// Tangent point for the stereographic kinds.
    pub tangent_lat: f64,
    pub tangent_lon: f64,
    pub central_scale: f64,
    /// "north" or "south", for POLAR_STEREO.
    pub pole: String,
    /// Width over height of the display window.
    pub aspect_ratio: f64,
    /// Comma-separated map directory list; entries may be URLs.
    pub map_dirs: String,
    /// Empty string disables the proxy.
    pub http_proxy_url: String,
    pub http_timeout_sec: f64,
    /// Replace underscores in control labels with spaces.
    pub replace_underscores: bool,
    /// Display units per kilometre and the matching label.
    pub units_per_km: f64,
    pub units_label: String,
    /// Negative spacing selects the automatic tick interval.
    pub range_ring_spacing: f64,
    pub max_ring_range: f64,
    pub azimuth_interval: f64,
    pub azimuth_radius: f64,
    /// Outermost pan/zoom limits, local units.
    pub limit_min_x: f64,
    pub limit_min_y: f64,
    pub limit_max_x: f64,
    pub limit_max_y: f64,
    /// Initial visible domain, local units.
    pub domain_min_x: f64,
    pub domain_min_y: f64,
    pub domain_max_x: f64,
    pub domain_max_y: f64,
    pub overlays: Vec<RegistryEntry>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            projection: "CARTESIAN".to_string(),
            origin_lat: 39.8783, // KFTG radar, east of Denver
            origin_lon: -104.7568,
            rotation: 0.0,
            lambert_lat1: 20.0,
            lambert_lat2: 60.0,
            tangent_lat: 0.0,
            tangent_lon: 0.0,
            central_scale: 1.0,
            pole: "north".to_string(),
            aspect_ratio: 1.0,
            map_dirs: "maps".to_string(),
            http_proxy_url: String::new(),
            http_timeout_sec: 10.0,
            replace_underscores: true,
            units_per_km: 1.0,
            units_label: "km".to_string(),
            range_ring_spacing: -1.0, // auto
            max_ring_range: 1000.0,
            azimuth_interval: 30.0,
            azimuth_radius: 200.0,
            limit_min_x: -1000.0,
            limit_min_y: -1000.0,
            limit_max_x: 1000.0,
            limit_max_y: 1000.0,
            domain_min_x: -200.0,
            domain_min_y: -200.0,
            domain_max_x: 200.0,
            domain_max_y: 200.0,
            overlays: Vec::new(),
        }
    }
}

impl DisplayConfig {
    /// Loads configuration from a JSON file, falling back to defaults when
    /// the file is absent or unreadable.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::info!("no config at {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("failed to parse {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Saves configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("failed to serialize display config: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(path, json) {
            log::warn!("failed to save {}: {}", path.display(), e);
        }
    }

    /// Instantiates the configured projection.
    pub fn build_projection(&self) -> Result<Projection, LoadError> {
        let name = self.projection.trim().to_ascii_uppercase();
        let proj = match name.as_str() {
            "CARTESIAN" | "FLAT" => {
                Projection::flat(self.origin_lat, self.origin_lon, self.rotation)
            }
            "LAT_LON" | "LATLON" => Projection::latlon(self.origin_lat, self.origin_lon),
            "LAMBERT" => {
                self.check_parallels()?;
                Projection::lambert_conformal(
                    self.origin_lat,
                    self.origin_lon,
                    self.lambert_lat1,
                    self.lambert_lat2,
                )
            }
            "STEREOGRAPHIC" => Projection::oblique_stereo(
                self.origin_lat,
                self.origin_lon,
                self.tangent_lat,
                self.tangent_lon,
                self.central_scale,
            ),
            "POLAR_STEREO" => Projection::polar_stereo(
                self.origin_lat,
                self.origin_lon,
                self.tangent_lon,
                self.pole_kind()?,
                self.central_scale,
            ),
            "MERCATOR" => Projection::mercator(self.origin_lat, self.origin_lon),
            "TRANS_MERCATOR" | "TRANSVERSE_MERCATOR" => Projection::transverse_mercator(
                self.origin_lat,
                self.origin_lon,
                self.central_scale,
            ),
            "ALBERS" => {
                self.check_parallels()?;
                Projection::albers(
                    self.origin_lat,
                    self.origin_lon,
                    self.lambert_lat1,
                    self.lambert_lat2,
                )
            }
            "LAMBERT_AZIM" | "LAMBERT_AZIMUTHAL" => {
                Projection::lambert_azimuthal(self.origin_lat, self.origin_lon)
            }
            other => {
                return Err(LoadError::Config(format!(
                    "unknown projection name: {other}"
                )))
            }
        };
        Ok(proj)
    }

    /// HTTP fetch timeout, never negative.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.http_timeout_sec.max(0.0))
    }

    /// Symmetric parallels make the cone constant zero and the conic
    /// projections undefined.
    fn check_parallels(&self) -> Result<(), LoadError> {
        if (self.lambert_lat1 + self.lambert_lat2).abs() < 1e-6 {
            return Err(LoadError::Config(format!(
                "standard parallels {} and {} cancel out",
                self.lambert_lat1, self.lambert_lat2
            )));
        }
        Ok(())
    }

    fn pole_kind(&self) -> Result<Pole, LoadError> {
        if self.pole.eq_ignore_ascii_case("north") {
            Ok(Pole::North)
        } else if self.pole.eq_ignore_ascii_case("south") {
            Ok(Pole::South)
        } else {
            Err(LoadError::Config(format!(
                "pole must be north or south, got {}",
                self.pole
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_line_parses_into_overlay() {
        let line = "STATES State_Boundaries usa_states.map 1 0 100000 white";
        let entry = parse_registry_line(line).unwrap();
        assert_eq!(entry.code, "STATES");
        assert_eq!(entry.file_name, "usa_states.map");
        assert_eq!(entry.on_and_width, 1);

        let overlay = entry.to_overlay(true);
        assert_eq!(overlay.control_label, "State Boundaries");
        assert!(overlay.default_on);
        assert!(overlay.active);
        assert_eq!(overlay.line_width, 1);
        assert_eq!(overlay.detail_thresh_max, 100_000.0);
        assert_eq!(overlay.color, "white");
    }

    #[test]
    fn on_and_width_field_does_double_duty() {
        let wide = parse_registry_line("COUNTY County_Lines counties.map 3 0 300 gray50")
            .unwrap()
            .to_overlay(false);
        assert!(wide.active);
        assert_eq!(wide.line_width, 3);

        let off = parse_registry_line("COUNTY County_Lines counties.map 0 0 300 gray50")
            .unwrap()
            .to_overlay(false);
        assert!(!off.active);
        assert_eq!(off.line_width, 1);

        // negative values count as on but fall back to a one-pixel line
        let neg = parse_registry_line("COUNTY County_Lines counties.map -2 0 300 gray50")
            .unwrap()
            .to_overlay(false);
        assert!(neg.active);
        assert_eq!(neg.line_width, 1);
    }

    #[test]
    fn short_and_comment_lines_are_skipped() {
        // exactly 20 characters: not longer than the minimum, skipped
        assert!(parse_registry_line("AA BB cc.map 1 0 1 w").is_none());
        assert!(parse_registry_line("# STATES State_Boundaries usa.map 1 0 1 red").is_none());
        assert!(parse_registry_line("").is_none());
    }

    #[test]
    fn lines_missing_fields_are_skipped() {
        assert!(parse_registry_line("STATES State_Boundaries usa_states.map 1 0 100000").is_none());
    }

    #[test]
    fn trailing_fields_join_into_the_color() {
        let entry =
            parse_registry_line("RINGS Range_Rings rings.map 1 0 1000 light steel blue").unwrap();
        assert_eq!(entry.color, "light steel blue");
    }

    #[test]
    fn registry_text_yields_overlays_in_order() {
        let text = "\
# wxmap overlay registry
STATES State_Boundaries usa_states.map 1 0 100000 white
COUNTY County_Lines counties.shp 0 0 300 gray50
";
        let overlays = parse_overlay_registry(text, true);
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[0].code, "STATES");
        assert_eq!(overlays[1].file_name, "counties.shp");
        assert!(!overlays[1].active);
    }

    #[test]
    fn default_config_builds_a_flat_projection() {
        let config = DisplayConfig::default();
        let proj = config.build_projection().unwrap();
        assert_eq!(proj.kind_name(), "flat");
        assert_eq!(proj.origin(), (39.8783, -104.7568));
    }

    #[test]
    fn partial_json_keeps_the_remaining_defaults() {
        let config: DisplayConfig = serde_json::from_str(r#"{"projection": "MERCATOR"}"#).unwrap();
        assert_eq!(config.projection, "MERCATOR");
        assert_eq!(config.origin_lat, 39.8783);
        assert_eq!(config.max_ring_range, 1000.0);
        assert!(config.build_projection().is_ok());
    }

    #[test]
    fn symmetric_parallels_are_rejected() {
        let config = DisplayConfig {
            projection: "LAMBERT".to_string(),
            lambert_lat1: -30.0,
            lambert_lat2: 30.0,
            ..DisplayConfig::default()
        };
        assert!(matches!(
            config.build_projection(),
            Err(LoadError::Config(_))
        ));
    }

    #[test]
    fn polar_stereo_reads_the_pole_name() {
        let mut config = DisplayConfig {
            projection: "POLAR_STEREO".to_string(),
            pole: "South".to_string(),
            ..DisplayConfig::default()
        };
        let proj = config.build_projection().unwrap();
        assert!(proj.is_stereographic());

        config.pole = "up".to_string();
        assert!(matches!(
            config.build_projection(),
            Err(LoadError::Config(_))
        ));
    }

    #[test]
    fn unknown_projection_names_are_config_errors() {
        let config = DisplayConfig {
            projection: "GNOMONIC".to_string(),
            ..DisplayConfig::default()
        };
        assert!(matches!(
            config.build_projection(),
            Err(LoadError::Config(_))
        ));
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut config = DisplayConfig::default();
        config.overlays.push(RegistryEntry {
            code: "STATES".to_string(),
            control_label: "State Boundaries".to_string(),
            file_name: "usa_states.map".to_string(),
            on_and_width: 2,
            detail_min: 0.0,
            detail_max: 100_000.0,
            color: "white".to_string(),
        });
        let json = serde_json::to_string(&config).unwrap();
        let back: DisplayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.overlays.len(), 1);
        assert_eq!(back.overlays[0].code, "STATES");
        assert_eq!(back.map_dirs, config.map_dirs);
    }
}
