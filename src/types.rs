use serde_json::{Map, Value};

use crate::mode::{BoundsPaths, LegacyPaths, PointPaths};
use crate::normalize::normalize_opt;

/// Represent a single map point in degrees. Either component may be missing while a
/// form is being filled in.
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Represent an axis-aligned rectangle by its south-west and north-east corners.
/// Corner orientation is not checked; see [`Bounds::is_oriented`].
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub sw_lat: Option<f64>,
    pub sw_lng: Option<f64>,
    pub ne_lat: Option<f64>,
    pub ne_lng: Option<f64>,
}

/// Initial map view: where to center and which rectangle to draw.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub bounds: Bounds,
    pub zoom: u8,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Both components, when present.
    pub fn pair(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

impl Bounds {
    pub fn new(sw_lat: f64, sw_lng: f64, ne_lat: f64, ne_lng: f64) -> Bounds {
        Bounds {
            sw_lat: Some(sw_lat),
            sw_lng: Some(sw_lng),
            ne_lat: Some(ne_lat),
            ne_lng: Some(ne_lng),
        }
    }

    /// All four corners, when present, as `(sw_lat, sw_lng, ne_lat, ne_lng)`.
    pub fn corners(&self) -> Option<(f64, f64, f64, f64)> {
        match (self.sw_lat, self.sw_lng, self.ne_lat, self.ne_lng) {
            (Some(a), Some(b), Some(c), Some(d)) => Some((a, b, c, d)),
            _ => None,
        }
    }

    /// Midpoint of the rectangle.
    pub fn center(&self) -> Option<(f64, f64)> {
        self.corners()
            .map(|(sw_lat, sw_lng, ne_lat, ne_lng)| ((sw_lat + ne_lat) / 2.0, (sw_lng + ne_lng) / 2.0))
    }

    /// A square of `half_side` degrees around `center`.
    pub fn around(center: (f64, f64), half_side: f64) -> Bounds {
        let (lat, lng) = center;
        Bounds::new(lat - half_side, lng - half_side, lat + half_side, lng + half_side)
    }

    /// True when the south-west corner really is south and west of the north-east one.
    /// Nothing in this crate rejects or reorders bounds that fail this check.
    pub fn is_oriented(&self) -> bool {
        match self.corners() {
            Some((sw_lat, sw_lng, ne_lat, ne_lng)) => sw_lat <= ne_lat && sw_lng <= ne_lng,
            None => false,
        }
    }
}

/// A geographic value that can live in form state, either as one JSON object or
/// as one scalar per component.
pub trait GeoState: Sized + Copy + PartialEq {
    /// Legacy-mode paths, one per component.
    type Paths: LegacyPaths;

    /// JSON keys, in component order.
    const KEYS: &'static [&'static str];

    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    fn from_parts(parts: &[Option<f64>]) -> Self;

    fn parts(&self) -> Vec<Option<f64>>;

    fn empty() -> Self {
        Self::from_parts(&[])
    }

    fn is_empty(&self) -> bool {
        self.parts().iter().all(Option::is_none)
    }

    fn is_complete(&self) -> bool {
        self.parts().iter().all(Option::is_some)
    }

    /// Build from a JSON object holding every key in [`GeoState::KEYS`] with a
    /// non-null value. Returns `None` for any other shape.
    fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if Self::KEYS.iter().any(|k| map.get(*k).map_or(true, Value::is_null)) {
            return None;
        }
        let parts: Vec<Option<f64>> = Self::KEYS.iter().map(|k| normalize_opt(map.get(*k))).collect();
        Some(Self::from_parts(&parts))
    }

    /// The JSON-mode representation. Missing components are written as null.
    fn to_json(&self) -> Value {
        let map: Map<String, Value> = Self::KEYS
            .iter()
            .zip(self.parts())
            .map(|(k, v)| ((*k).to_owned(), to_json_number(v)))
            .collect();
        Value::Object(map)
    }
}

pub(crate) fn to_json_number(v: Option<f64>) -> Value {
    v.map_or(Value::Null, Value::from)
}

fn part(parts: &[Option<f64>], i: usize) -> Option<f64> {
    parts.get(i).cloned().unwrap_or(None)
}

impl GeoState for Coordinate {
    type Paths = PointPaths;
    const KEYS: &'static [&'static str] = &["latitude", "longitude"];
    const KIND: &'static str = "coordinate";

    fn from_parts(parts: &[Option<f64>]) -> Coordinate {
        Coordinate {
            latitude: part(parts, 0),
            longitude: part(parts, 1),
        }
    }

    fn parts(&self) -> Vec<Option<f64>> {
        vec![self.latitude, self.longitude]
    }
}

impl GeoState for Bounds {
    type Paths = BoundsPaths;
    const KEYS: &'static [&'static str] = &["sw_lat", "sw_lng", "ne_lat", "ne_lng"];
    const KIND: &'static str = "bounds";

    fn from_parts(parts: &[Option<f64>]) -> Bounds {
        Bounds {
            sw_lat: part(parts, 0),
            sw_lng: part(parts, 1),
            ne_lat: part(parts, 2),
            ne_lng: part(parts, 3),
        }
    }

    fn parts(&self) -> Vec<Option<f64>> {
        vec![self.sw_lat, self.sw_lng, self.ne_lat, self.ne_lng]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_shape_requires_every_key() {
        assert_eq!(
            Coordinate::from_json(&json!({ "latitude": 40.4168, "longitude": -3.7038 })),
            Some(Coordinate::new(40.4168, -3.7038))
        );
        assert_eq!(Coordinate::from_json(&json!({ "latitude": 40.4168 })), None);
        assert_eq!(
            Coordinate::from_json(&json!({ "latitude": 40.4168, "longitude": null })),
            None
        );
        assert_eq!(Coordinate::from_json(&json!([40.4168, -3.7038])), None);
        assert_eq!(
            Bounds::from_json(&json!({ "sw_lat": "40.0", "sw_lng": -4, "ne_lat": 41.0, "ne_lng": -3.0 })),
            Some(Bounds::new(40.0, -4.0, 41.0, -3.0))
        );
    }

    #[test]
    fn to_json_writes_nulls_for_missing_parts() {
        let c = Coordinate {
            latitude: Some(1.5),
            longitude: None,
        };
        assert_eq!(c.to_json(), json!({ "latitude": 1.5, "longitude": null }));
    }

    #[test]
    fn serde_uses_storage_keys() {
        let b = Bounds::new(40.0, -4.0, 41.0, -3.0);
        assert_eq!(
            serde_json::to_value(b).unwrap(),
            json!({ "sw_lat": 40.0, "sw_lng": -4.0, "ne_lat": 41.0, "ne_lng": -3.0 })
        );
        assert_eq!(serde_json::to_value(b).unwrap(), b.to_json());
    }

    #[test]
    fn bounds_geometry_helpers() {
        let b = Bounds::new(40.0, -4.0, 41.0, -3.0);
        assert_eq!(b.center(), Some((40.5, -3.5)));
        assert!(b.is_oriented());
        assert!(!Bounds::new(41.0, -4.0, 40.0, -3.0).is_oriented());
        assert_eq!(Bounds::default().center(), None);
    }

    #[test]
    fn completeness() {
        assert!(Coordinate::empty().is_empty());
        assert!(!Coordinate::empty().is_complete());
        assert!(Coordinate::new(1.0, 2.0).is_complete());
        assert!(!Bounds {
            sw_lat: Some(1.0),
            ..Bounds::default()
        }
        .is_complete());
    }
}
