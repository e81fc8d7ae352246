//! Parser for the line-oriented map text format.
//!
//! Records are keyword-led: `MAP_NAME`, `ICONDEF`, `ICON`, `POLYLINE`,
//! `LABEL`, `SIMPLELABEL`, with `TRANSFORM` and `PROJECTION` accepted but
//! ignored. Malformed records are logged and skipped; the parser never
//! fails a whole file.

use geo_types::Coord;

use super::model::{IconDef, IconInstance, IconPoint, Label, MapVertex, Overlay, Polyline};

/// Icon x value that encodes a pen-up in the text format.
const ICON_PEN_UP: i16 = 32767;

/// Parses map text into `overlay`, appending to whatever geometry it
/// already holds.
pub fn parse_rap_map(overlay: &mut Overlay, text: &str) {
    let mut lines = text.lines();

    while let Some(raw) = lines.next() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();

        match fields[0] {
            "MAP_NAME" => {
                overlay.map_name = fields[1..].join(" ");
            }
            "TRANSFORM" | "PROJECTION" => {
                log::debug!("{}: ignoring {} record", overlay.file_name, fields[0]);
            }
            "ICONDEF" => parse_icondef(overlay, &fields, &mut lines),
            "ICON" => parse_icon(overlay, &fields),
            "POLYLINE" => parse_polyline(overlay, &fields, &mut lines),
            "LABEL" => parse_label(overlay, &fields),
            "SIMPLELABEL" => parse_simplelabel(overlay, &fields),
            other => {
                log::debug!("{}: unrecognized record {}", overlay.file_name, other);
            }
        }
    }
}

fn parse_icondef<'a>(
    overlay: &mut Overlay,
    fields: &[&str],
    lines: &mut impl Iterator<Item = &'a str>,
) {
    let (name, count) = match (fields.get(1), fields.get(2).and_then(|f| f.parse::<i64>().ok())) {
        (Some(name), Some(count)) if count > 0 => (name.to_string(), count),
        _ => {
            log::warn!("{}: bad ICONDEF record: {}", overlay.file_name, fields.join(" "));
            return;
        }
    };

    // the declared count comes from the file and only bounds the read
    // loop; the vec grows as rows actually parse
    let mut points = Vec::new();
    for _ in 0..count {
        let Some(line) = lines.next() else {
            log::warn!("{}: ICONDEF {} truncated at end of file", overlay.file_name, name);
            break;
        };
        let mut nums = line.split_whitespace().map(|f| f.parse::<i16>());
        match (nums.next(), nums.next()) {
            (Some(Ok(x)), Some(Ok(y))) => {
                if x == ICON_PEN_UP {
                    points.push(IconPoint::PenUp);
                } else {
                    points.push(IconPoint::Offset { x, y });
                }
            }
            _ => {
                log::warn!("{}: bad point in ICONDEF {}: {}", overlay.file_name, name, line);
            }
        }
    }
    overlay.add_icon_def(IconDef { name, points });
}

fn parse_icon(overlay: &mut Overlay, fields: &[&str]) {
    if fields.len() < 6 {
        log::warn!("{}: bad ICON record: {}", overlay.file_name, fields.join(" "));
        return;
    }
    let name = fields[1];
    let parsed = (
        fields[2].parse::<f64>(),
        fields[3].parse::<f64>(),
        fields[4].parse::<i32>(),
        fields[5].parse::<i32>(),
    );
    let (Ok(lat), Ok(lon), Ok(text_x), Ok(text_y)) = parsed else {
        log::warn!("{}: bad ICON record: {}", overlay.file_name, fields.join(" "));
        return;
    };
    let Some(icon) = overlay.icon_def(name) else {
        log::warn!("{}: ICON references undefined icondef {}", overlay.file_name, name);
        return;
    };
    overlay.icons.push(IconInstance {
        icon,
        lat,
        lon,
        text_x,
        text_y,
        label: fields[6..].join(" "),
        local: None,
    });
}

fn parse_polyline<'a>(
    overlay: &mut Overlay,
    fields: &[&str],
    lines: &mut impl Iterator<Item = &'a str>,
) {
    let (label, count) = match (fields.get(1), fields.get(2).and_then(|f| f.parse::<i64>().ok())) {
        (Some(label), Some(count)) if count > 0 => (label.to_string(), count),
        _ => {
            log::warn!("{}: bad POLYLINE record: {}", overlay.file_name, fields.join(" "));
            return;
        }
    };

    let mut poly = Polyline::new(label);
    for _ in 0..count {
        let Some(line) = lines.next() else {
            log::warn!(
                "{}: POLYLINE {} truncated at end of file",
                overlay.file_name,
                poly.label
            );
            break;
        };
        let mut nums = line.split_whitespace().map(|f| f.parse::<f64>());
        match (nums.next(), nums.next()) {
            // coordinates are stored exactly as given; clip sentinels are a
            // derived-coordinate convention, not a source one
            (Some(Ok(lat)), Some(Ok(lon))) => {
                poly.vertices.push(MapVertex::Point(Coord { x: lon, y: lat }));
            }
            _ => {
                log::warn!(
                    "{}: bad point in POLYLINE {}: {}",
                    overlay.file_name,
                    poly.label,
                    line
                );
            }
        }
    }
    overlay.polylines.push(poly);
}

fn parse_label(overlay: &mut Overlay, fields: &[&str]) {
    if fields.len() < 8 {
        log::warn!("{}: bad LABEL record: {}", overlay.file_name, fields.join(" "));
        return;
    }
    let parsed: Result<Vec<f64>, _> = fields[1..8].iter().map(|f| f.parse::<f64>()).collect();
    let Ok(v) = parsed else {
        log::warn!("{}: bad LABEL record: {}", overlay.file_name, fields.join(" "));
        return;
    };
    overlay.labels.push(Label {
        min_lat: v[0],
        min_lon: v[1],
        max_lat: v[2],
        max_lon: v[3],
        rotation: v[4],
        attach_lat: v[5],
        attach_lon: v[6],
        text: fields[8..].join(" "),
        local: None,
    });
}

fn parse_simplelabel(overlay: &mut Overlay, fields: &[&str]) {
    if fields.len() < 3 {
        log::warn!(
            "{}: bad SIMPLELABEL record: {}",
            overlay.file_name,
            fields.join(" ")
        );
        return;
    }
    let (Ok(lat), Ok(lon)) = (fields[1].parse::<f64>(), fields[2].parse::<f64>()) else {
        log::warn!(
            "{}: bad SIMPLELABEL record: {}",
            overlay.file_name,
            fields.join(" ")
        );
        return;
    };
    overlay.labels.push(Label {
        min_lat: lat,
        min_lon: lon,
        max_lat: lat,
        max_lon: lon,
        rotation: 0.0,
        attach_lat: lat,
        attach_lon: lon,
        text: fields[3..].join(" "),
        local: None,
    });
}
