//! Defaults, the debug switch, and field definitions read from JSON.

use std::env;
use std::io::Read;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ConfigError, Error, ValidationError};
use crate::field::{MapBoundsEntry, MapBoundsField, MapEntry, MapField};
use crate::render::RenderOutput;
use crate::store::StateStore;

/// Map height of form fields, in pixels.
pub const FIELD_HEIGHT: u32 = 400;
/// Map height of display entries, in pixels.
pub const ENTRY_HEIGHT: u32 = 300;
pub const POINT_ZOOM: u8 = 15;
pub const BOUNDS_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 20;
/// Where an empty bounds field opens.
pub const DEFAULT_CENTER: (f64, f64) = (36.9990019, -6.5478919);
/// Half side, in degrees, of the rectangle drawn around the default center.
pub const DEFAULT_BOUNDS_HALF_SIDE: f64 = 0.01;
/// Delay before the bounds overlay is forced into edit mode.
pub const EDIT_MODE_DELAY: Duration = Duration::from_millis(500);

/// Environment variable that turns on debug logging of the map shells.
pub const DEBUG_ENV_VAR: &str = "APP_DEBUG_MAP";
/// URL query key that turns on debug logging of the map shells.
pub const DEBUG_QUERY_KEY: &str = "map_debug";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DebugSettings {
    pub enabled: bool,
}

impl DebugSettings {
    /// Enabled by a `map_debug` query key or a truthy `APP_DEBUG_MAP`.
    pub fn resolve(query: Option<&str>) -> DebugSettings {
        let from_env = env::var(DEBUG_ENV_VAR).map(|v| is_truthy(&v)).unwrap_or(false);
        DebugSettings { enabled: from_env || query.map_or(false, query_has_debug) }
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Whether the query string has a `map_debug` key, with or without a value.
fn query_has_debug(query: &str) -> bool {
    query
        .trim_start_matches('?')
        .split('&')
        .any(|pair| pair.split('=').next() == Some(DEBUG_QUERY_KEY))
}

/// A field or entry described as JSON, e.g.
/// `{"kind": "point_field", "name": "map", "latitude": "lat", "longitude": "lng"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDefinition {
    PointField {
        name: String,
        latitude: Option<String>,
        longitude: Option<String>,
        height: Option<u32>,
        zoom: Option<u8>,
        #[serde(default)]
        show_paste_button: bool,
        show_label: Option<bool>,
        #[serde(default)]
        read_only: bool,
        #[serde(default)]
        required: bool,
    },
    BoundsField {
        name: String,
        #[serde(flatten)]
        paths: BoundsPathNames,
        height: Option<u32>,
        zoom: Option<u8>,
        show_label: Option<bool>,
        default_center: Option<(f64, f64)>,
        #[serde(default)]
        disabled: bool,
        #[serde(default)]
        required: bool,
    },
    PointEntry {
        name: String,
        latitude: Option<String>,
        longitude: Option<String>,
        height: Option<u32>,
        zoom: Option<u8>,
        show_label: Option<bool>,
    },
    BoundsEntry {
        name: String,
        #[serde(flatten)]
        paths: BoundsPathNames,
        height: Option<u32>,
        zoom: Option<u8>,
        show_label: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundsPathNames {
    pub south_west_lat: Option<String>,
    pub south_west_lng: Option<String>,
    pub north_east_lat: Option<String>,
    pub north_east_lng: Option<String>,
}

/// A built component, ready to resolve state.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    PointField(MapField),
    BoundsField(MapBoundsField),
    PointEntry(MapEntry),
    BoundsEntry(MapBoundsEntry),
}

impl Component {
    /// The resolved value as JSON: a coordinate or bounds object for fields, and
    /// the same or null for entries.
    pub fn resolve_json(&self, store: &dyn StateStore) -> Value {
        let value = match *self {
            Component::PointField(ref f) => serde_json::to_value(f.coordinates(store)),
            Component::BoundsField(ref f) => serde_json::to_value(f.bounds(store)),
            Component::PointEntry(ref e) => serde_json::to_value(e.coordinates(store)),
            Component::BoundsEntry(ref e) => serde_json::to_value(e.bounds(store)),
        };
        value.unwrap_or(Value::Null)
    }

    pub fn render(&self, store: &dyn StateStore) -> RenderOutput {
        match *self {
            Component::PointField(ref f) => f.render(store),
            Component::BoundsField(ref f) => f.render(store),
            Component::PointEntry(ref e) => e.render(store),
            Component::BoundsEntry(ref e) => e.render(store),
        }
    }

    /// Entries display data and are never validated.
    pub fn validate(&self, store: &dyn StateStore) -> Result<(), ValidationError> {
        match *self {
            Component::PointField(ref f) => f.validate(store),
            Component::BoundsField(ref f) => f.validate(store),
            Component::PointEntry(_) | Component::BoundsEntry(_) => Ok(()),
        }
    }
}

impl FieldDefinition {
    pub fn from_reader<R: Read>(reader: R) -> Result<FieldDefinition, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn build(&self) -> Result<Component, ConfigError> {
        Ok(match *self {
            FieldDefinition::PointField { ref name, ref latitude, ref longitude, height, zoom,
                                          show_paste_button, show_label, read_only, required } => {
                let mut b = MapField::make(name)
                    .height(height.unwrap_or(FIELD_HEIGHT))
                    .zoom(zoom.unwrap_or(POINT_ZOOM))
                    .show_paste_button(show_paste_button)
                    .show_label(show_label.unwrap_or(true))
                    .read_only(read_only)
                    .required(required);
                if let Some(ref p) = *latitude {
                    b = b.latitude(p);
                }
                if let Some(ref p) = *longitude {
                    b = b.longitude(p);
                }
                Component::PointField(b.build()?)
            }
            FieldDefinition::BoundsField { ref name, ref paths, height, zoom, show_label,
                                           default_center, disabled, required } => {
                let (lat, lng) = default_center.unwrap_or(DEFAULT_CENTER);
                let mut b = MapBoundsField::make(name)
                    .height(height.unwrap_or(FIELD_HEIGHT))
                    .zoom(zoom.unwrap_or(BOUNDS_ZOOM))
                    .show_label(show_label.unwrap_or(true))
                    .default_center(lat, lng)
                    .disabled(disabled)
                    .required(required);
                if let Some(ref p) = paths.south_west_lat {
                    b = b.south_west_lat(p);
                }
                if let Some(ref p) = paths.south_west_lng {
                    b = b.south_west_lng(p);
                }
                if let Some(ref p) = paths.north_east_lat {
                    b = b.north_east_lat(p);
                }
                if let Some(ref p) = paths.north_east_lng {
                    b = b.north_east_lng(p);
                }
                Component::BoundsField(b.build()?)
            }
            FieldDefinition::PointEntry { ref name, ref latitude, ref longitude, height, zoom,
                                          show_label } => {
                let mut b = MapEntry::make(name)
                    .height(height.unwrap_or(ENTRY_HEIGHT))
                    .zoom(zoom.unwrap_or(POINT_ZOOM))
                    .show_label(show_label.unwrap_or(true));
                if let Some(ref p) = *latitude {
                    b = b.latitude(p);
                }
                if let Some(ref p) = *longitude {
                    b = b.longitude(p);
                }
                Component::PointEntry(b.build()?)
            }
            FieldDefinition::BoundsEntry { ref name, ref paths, height, zoom, show_label } => {
                let mut b = MapBoundsEntry::make(name)
                    .height(height.unwrap_or(ENTRY_HEIGHT))
                    .zoom(zoom.unwrap_or(BOUNDS_ZOOM))
                    .show_label(show_label.unwrap_or(true));
                if let Some(ref p) = paths.south_west_lat {
                    b = b.south_west_lat(p);
                }
                if let Some(ref p) = paths.south_west_lng {
                    b = b.south_west_lng(p);
                }
                if let Some(ref p) = paths.north_east_lat {
                    b = b.north_east_lat(p);
                }
                if let Some(ref p) = paths.north_east_lng {
                    b = b.north_east_lng(p);
                }
                Component::BoundsEntry(b.build()?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_flag_enables_debug() {
        assert!(query_has_debug("?map_debug=1"));
        assert!(query_has_debug("page=2&map_debug"));
        assert!(!query_has_debug("map_debugger=1"));
        assert!(!query_has_debug(""));
    }

    #[test]
    fn truthy_values() {
        for v in &["1", "true", "TRUE", " yes ", "on"] {
            assert!(is_truthy(v), "{}", v);
        }
        for v in &["0", "false", "", "nope"] {
            assert!(!is_truthy(v), "{}", v);
        }
    }

    #[test]
    fn builds_legacy_point_field_from_json() {
        let def = FieldDefinition::from_reader(
            r#"{"kind": "point_field", "name": "map", "latitude": "ubicacion.latitud",
                "longitude": "ubicacion.longitud", "read_only": true}"#
                .as_bytes(),
        )
        .unwrap();
        match def.build().unwrap() {
            Component::PointField(field) => {
                assert!(field.is_legacy_mode());
                assert!(!field.is_interactive());
                assert_eq!(field.height(), FIELD_HEIGHT);
            }
            other => panic!("unexpected component {:?}", other),
        }
    }

    #[test]
    fn builds_bounds_entry_from_json() {
        let def = FieldDefinition::from_reader(
            r#"{"kind": "bounds_entry", "name": "area", "south_west_lat": "sw_lat",
                "south_west_lng": "sw_lng", "north_east_lat": "ne_lat",
                "north_east_lng": "ne_lng", "zoom": 10}"#
                .as_bytes(),
        )
        .unwrap();
        match def.build().unwrap() {
            Component::BoundsEntry(entry) => {
                assert!(entry.is_legacy_mode());
                assert_eq!(entry.zoom(), 10);
                assert_eq!(entry.height(), ENTRY_HEIGHT);
            }
            other => panic!("unexpected component {:?}", other),
        }
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        assert!(FieldDefinition::from_reader(r#"{"kind": "polygon", "name": "x"}"#.as_bytes()).is_err());
        let def = FieldDefinition::from_reader(r#"{"kind": "bounds_field", "name": "a..b"}"#.as_bytes())
            .unwrap();
        assert!(def.build().is_err());
    }

    #[test]
    fn components_dispatch_to_their_field() {
        use crate::store::MemoryStore;
        use serde_json::json;

        let def = FieldDefinition::from_reader(r#"{"kind": "point_entry", "name": "location"}"#.as_bytes())
            .unwrap();
        let component = def.build().unwrap();
        let store = MemoryStore::from_value(json!({
            "location": { "latitude": 40.4168, "longitude": -3.7038 }
        }));
        assert_eq!(component.resolve_json(&store),
                   json!({ "latitude": 40.4168, "longitude": -3.7038 }));
        assert_eq!(component.resolve_json(&MemoryStore::new()), Value::Null);
        assert_eq!(component.validate(&MemoryStore::new()), Ok(()));
        assert_eq!(component.render(&store).label.as_deref(), Some("40.416800, -3.703800"));
    }
}
