//! ESRI shapefile import.
//!
//! Arc and polygon records become polylines, with a pen-up vertex at every
//! part or ring boundary so disjoint pieces stay in one record. Point
//! records become icon instances sharing one lazily created box glyph.
//! Everything else is counted and skipped.

use std::io::Cursor;

use geo_types::Coord;

use crate::error::LoadError;

use super::model::{IconDef, IconInstance, IconPoint, MapVertex, Overlay, Polyline};

/// Name of the glyph shared by imported point shapes.
const POINT_ICON_NAME: &str = "shape_point";

/// Parses `.shp` bytes into `overlay`, appending to whatever geometry it
/// already holds. Individual bad records are logged and skipped; only an
/// unreadable file header fails the load.
pub fn parse_shapefile(overlay: &mut Overlay, shp_bytes: &[u8]) -> Result<(), LoadError> {
    let mut reader =
        shapefile::ShapeReader::new(Cursor::new(shp_bytes)).map_err(|source| LoadError::Shapefile {
            name: overlay.file_name.clone(),
            source,
        })?;

    let mut unsupported = 0usize;
    for result in reader.iter_shapes() {
        match result {
            Ok(shape) => add_shape(overlay, shape, &mut unsupported),
            Err(e) => {
                log::warn!("{}: skipping unreadable shape record: {}", overlay.file_name, e);
            }
        }
    }
    if unsupported > 0 {
        log::info!(
            "{}: skipped {} shapes of unsupported types",
            overlay.file_name,
            unsupported
        );
    }
    Ok(())
}

fn add_shape(overlay: &mut Overlay, shape: shapefile::Shape, unsupported: &mut usize) {
    match shape {
        shapefile::Shape::Polyline(arc) => {
            overlay
                .polylines
                .push(polyline_from_parts(arc.parts(), |p| Coord { x: p.x, y: p.y }));
        }
        shapefile::Shape::PolylineM(arc) => {
            overlay
                .polylines
                .push(polyline_from_parts(arc.parts(), |p| Coord { x: p.x, y: p.y }));
        }
        shapefile::Shape::PolylineZ(arc) => {
            overlay
                .polylines
                .push(polyline_from_parts(arc.parts(), |p| Coord { x: p.x, y: p.y }));
        }
        shapefile::Shape::Polygon(poly) => {
            overlay
                .polylines
                .push(polyline_from_rings(poly.rings(), |p| Coord { x: p.x, y: p.y }));
        }
        shapefile::Shape::Point(p) => add_point(overlay, p.x, p.y),
        shapefile::Shape::PointM(p) => add_point(overlay, p.x, p.y),
        shapefile::Shape::PointZ(p) => add_point(overlay, p.x, p.y),
        other => {
            *unsupported += 1;
            log::debug!(
                "{}: unsupported shape type {}",
                overlay.file_name,
                other.shapetype()
            );
        }
    }
}

/// Copies part vertex runs into one polyline, separated by pen-ups.
fn polyline_from_parts<P>(parts: &[Vec<P>], to_coord: impl Fn(&P) -> Coord<f64>) -> Polyline {
    let mut poly = Polyline::default();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            poly.vertices.push(MapVertex::PenUp);
        }
        for p in part {
            poly.vertices.push(MapVertex::Point(to_coord(p)));
        }
    }
    poly
}

/// Copies ring vertex runs into one polyline, separated by pen-ups.
fn polyline_from_rings<P>(
    rings: &[shapefile::PolygonRing<P>],
    to_coord: impl Fn(&P) -> Coord<f64>,
) -> Polyline {
    let mut poly = Polyline::default();
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            poly.vertices.push(MapVertex::PenUp);
        }
        for p in ring.points() {
            poly.vertices.push(MapVertex::Point(to_coord(p)));
        }
    }
    poly
}

fn add_point(overlay: &mut Overlay, lon: f64, lat: f64) {
    let icon = match overlay.icon_def(POINT_ICON_NAME) {
        Some(def) => def,
        None => overlay.add_icon_def(default_point_icon()),
    };
    overlay.icons.push(IconInstance {
        icon,
        lat,
        lon,
        text_x: 0,
        text_y: 0,
        label: String::new(),
        local: None,
    });
}

/// Small box outline drawn for point shapes with no glyph of their own.
fn default_point_icon() -> IconDef {
    IconDef {
        name: POINT_ICON_NAME.to_string(),
        points: vec![
            IconPoint::Offset { x: -2, y: -2 },
            IconPoint::Offset { x: 2, y: -2 },
            IconPoint::Offset { x: 2, y: 2 },
            IconPoint::Offset { x: -2, y: 2 },
            IconPoint::Offset { x: -2, y: -2 },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::{Point, PolygonRing, Shape};
    use std::sync::Arc;

    #[test]
    fn arc_parts_import_with_pen_up_between() {
        let arc = shapefile::Polyline::with_parts(vec![
            vec![
                Point::new(-104.0, 39.0),
                Point::new(-104.5, 39.5),
                Point::new(-105.0, 40.0),
            ],
            vec![
                Point::new(-100.0, 35.0),
                Point::new(-100.5, 35.5),
                Point::new(-101.0, 36.0),
            ],
        ]);

        let mut overlay = Overlay::default();
        let mut unsupported = 0;
        add_shape(&mut overlay, Shape::Polyline(arc), &mut unsupported);

        let poly = &overlay.polylines[0];
        assert_eq!(poly.num_points(), 7);
        assert_eq!(poly.vertices[3], MapVertex::PenUp);
        assert_eq!(
            poly.vertices[0],
            MapVertex::Point(Coord { x: -104.0, y: 39.0 })
        );
        assert_eq!(
            poly.vertices[4],
            MapVertex::Point(Coord { x: -100.0, y: 35.0 })
        );
        assert_eq!(unsupported, 0);
    }

    #[test]
    fn polygon_rings_break_at_boundaries() {
        // closed rings, outer clockwise, inner counter-clockwise
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        let inner = vec![
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(1.0, 2.0),
            Point::new(1.0, 1.0),
        ];
        let polygon = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(outer),
            PolygonRing::Inner(inner),
        ]);

        let mut overlay = Overlay::default();
        let mut unsupported = 0;
        add_shape(&mut overlay, Shape::Polygon(polygon), &mut unsupported);

        let poly = &overlay.polylines[0];
        assert_eq!(poly.num_points(), 11);
        assert_eq!(poly.vertices[5], MapVertex::PenUp);
    }

    #[test]
    fn points_share_one_lazy_box_glyph() {
        let mut overlay = Overlay::default();
        let mut unsupported = 0;
        add_shape(
            &mut overlay,
            Shape::Point(Point::new(-104.99, 39.74)),
            &mut unsupported,
        );
        add_shape(
            &mut overlay,
            Shape::Point(Point::new(-105.27, 40.01)),
            &mut unsupported,
        );

        assert_eq!(overlay.icons.len(), 2);
        assert_eq!(overlay.num_icon_defs(), 1);
        assert!(Arc::ptr_eq(&overlay.icons[0].icon, &overlay.icons[1].icon));
        assert_eq!(overlay.icons[0].lat, 39.74);
        assert_eq!(overlay.icons[0].lon, -104.99);
    }

    #[test]
    fn unsupported_shapes_are_counted_not_fatal() {
        let mut overlay = Overlay::default();
        let mut unsupported = 0;
        add_shape(
            &mut overlay,
            Shape::Multipoint(shapefile::Multipoint::new(vec![
                Point::new(1.0, 2.0),
                Point::new(3.0, 4.0),
            ])),
            &mut unsupported,
        );
        assert_eq!(unsupported, 1);
        assert!(overlay.is_empty());
    }

    #[test]
    fn whole_file_parses_from_bytes() {
        let bytes = minimal_point_shp(-104.0, 39.0);
        let mut overlay = Overlay::default();
        parse_shapefile(&mut overlay, &bytes).unwrap();
        assert_eq!(overlay.icons.len(), 1);
        assert_eq!(overlay.icons[0].lon, -104.0);
    }

    #[test]
    fn garbage_bytes_fail_the_load() {
        let mut overlay = Overlay::default();
        assert!(parse_shapefile(&mut overlay, b"not a shapefile").is_err());
    }

    /// Hand-built single-record point shapefile: 100-byte header, then one
    /// record of a point shape.
    fn minimal_point_shp(x: f64, y: f64) -> Vec<u8> {
        let mut b = vec![0u8; 100];
        b[0..4].copy_from_slice(&9994i32.to_be_bytes()); // file code
        // file length in 16-bit words: header + record header + content
        let total_words = (100 + 8 + 20) / 2;
        b[24..28].copy_from_slice(&(total_words as i32).to_be_bytes());
        b[28..32].copy_from_slice(&1000i32.to_le_bytes()); // version
        b[32..36].copy_from_slice(&1i32.to_le_bytes()); // point type
        b[36..44].copy_from_slice(&x.to_le_bytes());
        b[44..52].copy_from_slice(&y.to_le_bytes());
        b[52..60].copy_from_slice(&x.to_le_bytes());
        b[60..68].copy_from_slice(&y.to_le_bytes());

        b.extend_from_slice(&1i32.to_be_bytes()); // record number
        b.extend_from_slice(&10i32.to_be_bytes()); // content words
        b.extend_from_slice(&1i32.to_le_bytes()); // shape type
        b.extend_from_slice(&x.to_le_bytes());
        b.extend_from_slice(&y.to_le_bytes());
        b
    }
}
