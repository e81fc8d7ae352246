#![warn(clippy::all)]

//! Overlay loading demo.
//!
//! Loads a display configuration (JSON, written with defaults on first
//! run), fetches and parses the configured overlays, runs one reproject
//! pass, and reports what would be drawn.
//!
//! Usage: `wxmap [config.json] [registry-file]`

use std::path::Path;
use std::{env, fs};

use wxmap::display::{
    generate_azimuth_lines, generate_range_rings, DisplayContext, Domain, RingOptions,
};
use wxmap::overlay::{
    load_overlay, parse_overlay_registry, DisplayConfig, LocalVertex, MapSource, Overlay,
};
use wxmap::LoadError;

fn main() -> Result<(), LoadError> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "wxmap.json".to_string());
    let registry_path = args.next();

    let config_path = Path::new(&config_path);
    let config = DisplayConfig::load(config_path);
    if !config_path.exists() {
        config.save(config_path);
        log::info!("wrote default configuration to {}", config_path.display());
    }

    let proj = config.build_projection()?;
    log::info!(
        "projection {} at ({}, {})",
        proj.kind_name(),
        config.origin_lat,
        config.origin_lon
    );

    let mut overlays: Vec<Overlay> = config
        .overlays
        .iter()
        .map(|entry| entry.to_overlay(config.replace_underscores))
        .collect();
    if let Some(path) = registry_path {
        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })?;
        overlays.extend(parse_overlay_registry(&text, config.replace_underscores));
    }

    let source = MapSource::new(
        &config.map_dirs,
        &config.http_proxy_url,
        config.http_timeout(),
    )?;
    for overlay in &mut overlays {
        load_overlay(overlay, &source);
    }

    let limits = Domain::new(
        config.limit_min_x,
        config.limit_min_y,
        config.limit_max_x,
        config.limit_max_y,
    );
    let mut ctx = DisplayContext::new(proj, limits, config.aspect_ratio);
    for overlay in overlays {
        ctx.add_overlay(overlay);
    }
    ctx.set_domain(Domain::new(
        config.domain_min_x,
        config.domain_min_y,
        config.domain_max_x,
        config.domain_max_y,
    ));

    println!(
        "domain x [{}, {}] y [{}, {}], {:.0} km across",
        ctx.domain().min_x,
        ctx.domain().max_x,
        ctx.domain().min_y,
        ctx.domain().max_y,
        ctx.km_across()
    );
    for overlay in &ctx.overlays {
        let (drawn, clipped) = vertex_counts(overlay);
        println!(
            "{:10} {:24} {} polylines ({} drawn / {} clipped vertices), {} icons, {} labels{}",
            overlay.code,
            overlay.file_name,
            overlay.polylines.len(),
            drawn,
            clipped,
            overlay.icons.len(),
            overlay.labels.len(),
            if overlay.should_render(ctx.km_across()) {
                ""
            } else {
                " [hidden at this zoom]"
            }
        );
    }

    let opts = RingOptions {
        spacing: config.range_ring_spacing,
        max_ring_range: config.max_ring_range,
        azimuth_interval: config.azimuth_interval,
        azimuth_radius: config.azimuth_radius,
        units_per_km: config.units_per_km,
        units_label: config.units_label.clone(),
        zero_origin_valid: false,
    };
    let rings = generate_range_rings(
        ctx.proj(),
        ctx.domain(),
        config.origin_lat,
        config.origin_lon,
        &opts,
    );
    let azimuths = generate_azimuth_lines(ctx.proj(), config.origin_lat, config.origin_lon, &opts);
    if let Some(outer) = rings.first() {
        println!(
            "{} range rings out to {} plus {} azimuth lines",
            rings.len(),
            outer.label,
            azimuths.len()
        );
    }

    Ok(())
}

fn vertex_counts(overlay: &Overlay) -> (usize, usize) {
    let mut drawn = 0;
    let mut clipped = 0;
    for poly in &overlay.polylines {
        for v in &poly.local {
            match v {
                LocalVertex::At(_) => drawn += 1,
                LocalVertex::Clipped => clipped += 1,
                LocalVertex::PenUp => {}
            }
        }
    }
    (drawn, clipped)
}
