//! What a field or entry shows: a summary label and a map container description.
//! Drawing the map itself is left to the host's map library.

use crate::types::{Bounds, Coordinate, GeoState};

/// Shown by a bounds field until all four corners are known.
pub const BOUNDS_PLACEHOLDER: &str = "Select the area bounds";

/// Shown by a display entry when the record holds no usable value.
pub const NO_COORDINATES: &str = "No coordinates available";

/// Description of the element the map library mounts into.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MapContainer {
    pub id: String,
    pub height: u32,
    pub zoom: u8,
    pub center: Option<(f64, f64)>,
    pub bounds: Option<Bounds>,
    pub interactive: bool,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub container: Option<MapContainer>,
}

/// `"lat, lng"` with 6 decimals, once both components are known.
pub fn coordinate_label(c: &Coordinate) -> Option<String> {
    c.pair().map(|(lat, lng)| format!("{:.6}, {:.6}", lat, lng))
}

/// `"SW: lat, lng – NE: lat, lng"` with 6 decimals, once all corners are known.
pub fn bounds_label(b: &Bounds) -> Option<String> {
    b.corners().map(|(sw_lat, sw_lng, ne_lat, ne_lng)| {
        format!("SW: {:.6}, {:.6} – NE: {:.6}, {:.6}", sw_lat, sw_lng, ne_lat, ne_lng)
    })
}

/// Label for any geographic value.
pub trait Summary: GeoState {
    fn label(&self) -> Option<String>;
}

impl Summary for Coordinate {
    fn label(&self) -> Option<String> {
        coordinate_label(self)
    }
}

impl Summary for Bounds {
    fn label(&self) -> Option<String> {
        bounds_label(self)
    }
}
