use std::io::Read;

use geojson::{GeoJson, Geometry, Value as Shape};

use crate::error::Error;
use crate::types::{Bounds, Coordinate};

/// Find the tightest bounds around an iterator of complete coordinates. Incomplete
/// coordinates are skipped; `None` when nothing is left.
pub fn enclosing_bounds<'a, I: Iterator<Item = &'a Coordinate>>(iter: I) -> Option<Bounds> {
    let (count, sw_lat, sw_lng, ne_lat, ne_lng) =
        iter.filter_map(Coordinate::pair)
            .fold((0usize, f64::MAX, f64::MAX, f64::MIN, f64::MIN),
                  |(n, sw_lat, sw_lng, ne_lat, ne_lng), (lat, lng)| {
                (n + 1,
                 f64::min(sw_lat, lat),
                 f64::min(sw_lng, lng),
                 f64::max(ne_lat, lat),
                 f64::max(ne_lng, lng))
            });
    if count == 0 {
        None
    } else {
        Some(Bounds::new(sw_lat, sw_lng, ne_lat, ne_lng))
    }
}

/// Collect every position of a GeoJSON document: a FeatureCollection, a single
/// Feature or a bare Geometry. Positions are `[lng, lat, ...]`.
pub fn coordinates_from_geojson<R: Read>(reader: R) -> Result<Vec<Coordinate>, Error> {
    let json: GeoJson = serde_json::from_reader(reader)?;
    let mut coordinates = Vec::new();
    match json {
        GeoJson::FeatureCollection(ref collection) => {
            for feature in &collection.features {
                if let Some(ref geometry) = feature.geometry {
                    collect_positions(geometry, &mut coordinates);
                }
            }
        }
        GeoJson::Feature(ref feature) => {
            if let Some(ref geometry) = feature.geometry {
                collect_positions(geometry, &mut coordinates);
            }
        }
        GeoJson::Geometry(ref geometry) => collect_positions(geometry, &mut coordinates),
    }
    Ok(coordinates)
}

fn collect_positions(geometry: &Geometry, out: &mut Vec<Coordinate>) {
    let mut push = |pos: &Vec<f64>| {
        if pos.len() >= 2 {
            out.push(Coordinate::new(pos[1], pos[0]));
        }
    };
    match geometry.value {
        Shape::Point(ref pos) => push(pos),
        Shape::MultiPoint(ref line) | Shape::LineString(ref line) => line.iter().for_each(push),
        Shape::MultiLineString(ref lines) | Shape::Polygon(ref lines) => {
            lines.iter().flat_map(|l| l.iter()).for_each(push)
        }
        Shape::MultiPolygon(ref polygons) => {
            polygons.iter().flat_map(|p| p.iter()).flat_map(|l| l.iter()).for_each(push)
        }
        Shape::GeometryCollection(ref geometries) => {
            for g in geometries {
                collect_positions(g, out);
            }
        }
    }
}

impl Coordinate {
    /// GeoJSON Point, when both components are known.
    pub fn to_geometry(&self) -> Option<Geometry> {
        self.pair().map(|(lat, lng)| Geometry::new(Shape::Point(vec![lng, lat])))
    }
}

impl Bounds {
    /// Closed GeoJSON Polygon ring, counter-clockwise from the south-west corner.
    pub fn to_geometry(&self) -> Option<Geometry> {
        self.corners().map(|(sw_lat, sw_lng, ne_lat, ne_lng)| {
            let ring = vec![vec![sw_lng, sw_lat],
                            vec![ne_lng, sw_lat],
                            vec![ne_lng, ne_lat],
                            vec![sw_lng, ne_lat],
                            vec![sw_lng, sw_lat]];
            Geometry::new(Shape::Polygon(vec![ring]))
        })
    }
}
