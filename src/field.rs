//! Form fields and read-only display entries for points and bounds.
//!
//! Each component is configured through a builder and frozen by `build()`. The
//! storage mode is decided there: legacy mode when every component path was
//! given, JSON mode on the component's own name otherwise.

use serde_json::Value;
use tracing::warn;

use crate::config::{BOUNDS_ZOOM, DEFAULT_BOUNDS_HALF_SIDE, DEFAULT_CENTER, ENTRY_HEIGHT,
                    FIELD_HEIGHT, MAX_ZOOM, POINT_ZOOM};
use crate::error::{ConfigError, StoreError, ValidationError, WriteError};
use crate::mode::{BoundsPaths, LegacyPaths, PointPaths, StorageMode};
use crate::path::DotPath;
use crate::render::{MapContainer, RenderOutput, Summary, BOUNDS_PLACEHOLDER, NO_COORDINATES};
use crate::resolve::resolve;
use crate::store::StateStore;
use crate::types::{Bounds, Coordinate, GeoState, MapView};
use crate::write::write;

/// Interactive point picker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
    name: DotPath,
    mode: StorageMode<PointPaths>,
    height: u32,
    zoom: u8,
    show_paste_button: bool,
    show_label: bool,
    interactive: bool,
    required: bool,
}

#[derive(Debug, Clone)]
pub struct MapFieldBuilder {
    name: String,
    latitude: Option<String>,
    longitude: Option<String>,
    height: u32,
    zoom: u8,
    show_paste_button: bool,
    show_label: bool,
    interactive: bool,
    required: bool,
}

impl MapField {
    pub fn make(name: &str) -> MapFieldBuilder {
        MapFieldBuilder {
            name: name.to_owned(),
            latitude: None,
            longitude: None,
            height: FIELD_HEIGHT,
            zoom: POINT_ZOOM,
            show_paste_button: false,
            show_label: true,
            interactive: true,
            required: false,
        }
    }

    pub fn name(&self) -> &DotPath {
        &self.name
    }

    pub fn mode(&self) -> &StorageMode<PointPaths> {
        &self.mode
    }

    pub fn is_legacy_mode(&self) -> bool {
        self.mode.is_legacy_mode()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn should_show_paste_button(&self) -> bool {
        self.show_paste_button
    }

    pub fn should_show_label(&self) -> bool {
        self.show_label
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Current coordinates, never failing. Unreadable state yields nulls.
    pub fn coordinates(&self, store: &dyn StateStore) -> Coordinate {
        resolve(&self.mode, store)
    }

    pub fn set_coordinates(
        &self,
        store: &mut dyn StateStore,
        coordinates: &Coordinate,
    ) -> Result<(), WriteError> {
        write(&self.mode, coordinates, store)
    }

    /// In JSON mode, reset a stored value that is not a complete coordinate object.
    pub fn hydrate(&self, store: &mut dyn StateStore) -> Result<(), StoreError> {
        match self.mode {
            StorageMode::Json(ref path) => {
                let valid = store.get(path)?.map_or(false, |v| Coordinate::from_json(&v).is_some());
                if !valid {
                    store.set(path, Value::Null)?;
                }
                Ok(())
            }
            StorageMode::Legacy(_) => Ok(()),
        }
    }

    /// Value to persist under the field's own name. Legacy-mode fields are virtual
    /// and persist nothing.
    pub fn dehydrate(&self, store: &dyn StateStore) -> Option<Value> {
        match self.mode {
            StorageMode::Json(ref path) => store.get(path).ok().flatten().filter(|v| !v.is_null()),
            StorageMode::Legacy(_) => None,
        }
    }

    pub fn validate(&self, store: &dyn StateStore) -> Result<(), ValidationError> {
        if !self.required {
            return Ok(());
        }
        check_required::<Coordinate>(&self.name, &self.mode, store)
    }

    /// The element the map mounts into, centered on the current coordinates.
    pub fn container(&self, store: &dyn StateStore) -> MapContainer {
        MapContainer {
            id: format!("map-{}", self.name),
            height: self.height,
            zoom: self.zoom,
            center: self.coordinates(store).pair(),
            bounds: None,
            interactive: self.interactive,
        }
    }

    pub fn render(&self, store: &dyn StateStore) -> RenderOutput {
        RenderOutput {
            label: if self.show_label { self.coordinates(store).label() } else { None },
            placeholder: None,
            container: Some(self.container(store)),
        }
    }
}

impl MapFieldBuilder {
    /// Path of the latitude value. Dot notation reaches nested values.
    pub fn latitude(mut self, path: &str) -> MapFieldBuilder {
        self.latitude = Some(path.to_owned());
        self
    }

    /// Path of the longitude value. Dot notation reaches nested values.
    pub fn longitude(mut self, path: &str) -> MapFieldBuilder {
        self.longitude = Some(path.to_owned());
        self
    }

    pub fn height(mut self, height: u32) -> MapFieldBuilder {
        self.height = height;
        self
    }

    pub fn zoom(mut self, zoom: u8) -> MapFieldBuilder {
        self.zoom = zoom;
        self
    }

    pub fn show_paste_button(mut self, show: bool) -> MapFieldBuilder {
        self.show_paste_button = show;
        self
    }

    pub fn show_label(mut self, show: bool) -> MapFieldBuilder {
        self.show_label = show;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> MapFieldBuilder {
        self.interactive = interactive;
        self
    }

    /// Same as `interactive(!read_only)`.
    pub fn read_only(mut self, read_only: bool) -> MapFieldBuilder {
        self.interactive = !read_only;
        self
    }

    pub fn required(mut self, required: bool) -> MapFieldBuilder {
        self.required = required;
        self
    }

    pub fn build(self) -> Result<MapField, ConfigError> {
        check_display(self.height, self.zoom)?;
        let name = parse_path("name", &self.name)?;
        let mode = point_mode(&name,
                              parse_opt("latitude", self.latitude)?,
                              parse_opt("longitude", self.longitude)?);
        Ok(MapField {
            name,
            mode,
            height: self.height,
            zoom: self.zoom,
            show_paste_button: self.show_paste_button,
            show_label: self.show_label,
            interactive: self.interactive,
            required: self.required,
        })
    }
}

/// Editable rectangle picker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapBoundsField {
    name: DotPath,
    mode: StorageMode<BoundsPaths>,
    height: u32,
    zoom: u8,
    show_label: bool,
    default_center: (f64, f64),
    disabled: bool,
    required: bool,
}

#[derive(Debug, Clone)]
pub struct MapBoundsFieldBuilder {
    name: String,
    paths: [Option<String>; 4],
    height: u32,
    zoom: u8,
    show_label: bool,
    default_center: (f64, f64),
    disabled: bool,
    required: bool,
}

impl MapBoundsField {
    pub fn make(name: &str) -> MapBoundsFieldBuilder {
        MapBoundsFieldBuilder {
            name: name.to_owned(),
            paths: [None, None, None, None],
            height: FIELD_HEIGHT,
            zoom: BOUNDS_ZOOM,
            show_label: true,
            default_center: DEFAULT_CENTER,
            disabled: false,
            required: false,
        }
    }

    pub fn name(&self) -> &DotPath {
        &self.name
    }

    pub fn mode(&self) -> &StorageMode<BoundsPaths> {
        &self.mode
    }

    pub fn is_legacy_mode(&self) -> bool {
        self.mode.is_legacy_mode()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn should_show_label(&self) -> bool {
        self.show_label
    }

    pub fn default_center(&self) -> (f64, f64) {
        self.default_center
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn bounds(&self, store: &dyn StateStore) -> Bounds {
        resolve(&self.mode, store)
    }

    pub fn set_bounds(&self, store: &mut dyn StateStore, bounds: &Bounds) -> Result<(), WriteError> {
        write(&self.mode, bounds, store)
    }

    /// Stored JSON-mode values are kept as they are; an empty object becomes null.
    pub fn hydrate(&self, store: &mut dyn StateStore) -> Result<(), StoreError> {
        match self.mode {
            StorageMode::Json(ref path) => {
                if let Some(Value::Object(ref map)) = store.get(path)? {
                    if map.is_empty() {
                        store.set(path, Value::Null)?;
                    }
                }
                Ok(())
            }
            StorageMode::Legacy(_) => Ok(()),
        }
    }

    /// Non-empty JSON objects are persisted; everything else persists as nothing.
    pub fn dehydrate(&self, store: &dyn StateStore) -> Option<Value> {
        match self.mode {
            StorageMode::Json(ref path) => match store.get(path) {
                Ok(Some(Value::Object(map))) if !map.is_empty() => Some(Value::Object(map)),
                _ => None,
            },
            StorageMode::Legacy(_) => None,
        }
    }

    pub fn validate(&self, store: &dyn StateStore) -> Result<(), ValidationError> {
        if !self.required {
            return Ok(());
        }
        check_required::<Bounds>(&self.name, &self.mode, store)
    }

    /// Where the map opens: centered on complete bounds, or on the default center
    /// with a small square filling in whichever corners are missing.
    pub fn initial_view(&self, store: &dyn StateStore) -> MapView {
        let bounds = self.bounds(store);
        match bounds.center() {
            Some(center) => MapView {
                center,
                bounds,
                zoom: self.zoom,
            },
            None => {
                let fallback = Bounds::around(self.default_center, DEFAULT_BOUNDS_HALF_SIDE);
                MapView {
                    center: self.default_center,
                    bounds: Bounds {
                        sw_lat: bounds.sw_lat.or(fallback.sw_lat),
                        sw_lng: bounds.sw_lng.or(fallback.sw_lng),
                        ne_lat: bounds.ne_lat.or(fallback.ne_lat),
                        ne_lng: bounds.ne_lng.or(fallback.ne_lng),
                    },
                    zoom: self.zoom,
                }
            }
        }
    }

    pub fn container(&self, store: &dyn StateStore) -> MapContainer {
        let view = self.initial_view(store);
        MapContainer {
            id: format!("map-bounds-{}", self.name),
            height: self.height,
            zoom: view.zoom,
            center: Some(view.center),
            bounds: Some(view.bounds),
            interactive: !self.disabled,
        }
    }

    pub fn render(&self, store: &dyn StateStore) -> RenderOutput {
        let label = self.bounds(store).label();
        RenderOutput {
            placeholder: if self.show_label && label.is_none() {
                Some(BOUNDS_PLACEHOLDER.to_owned())
            } else {
                None
            },
            label: if self.show_label { label } else { None },
            container: Some(self.container(store)),
        }
    }
}

impl MapBoundsFieldBuilder {
    /// Path of the south-west latitude. Dot notation reaches nested values.
    pub fn south_west_lat(mut self, path: &str) -> MapBoundsFieldBuilder {
        self.paths[0] = Some(path.to_owned());
        self
    }

    pub fn south_west_lng(mut self, path: &str) -> MapBoundsFieldBuilder {
        self.paths[1] = Some(path.to_owned());
        self
    }

    pub fn north_east_lat(mut self, path: &str) -> MapBoundsFieldBuilder {
        self.paths[2] = Some(path.to_owned());
        self
    }

    pub fn north_east_lng(mut self, path: &str) -> MapBoundsFieldBuilder {
        self.paths[3] = Some(path.to_owned());
        self
    }

    pub fn height(mut self, height: u32) -> MapBoundsFieldBuilder {
        self.height = height;
        self
    }

    pub fn zoom(mut self, zoom: u8) -> MapBoundsFieldBuilder {
        self.zoom = zoom;
        self
    }

    pub fn show_label(mut self, show: bool) -> MapBoundsFieldBuilder {
        self.show_label = show;
        self
    }

    pub fn default_center(mut self, lat: f64, lng: f64) -> MapBoundsFieldBuilder {
        self.default_center = (lat, lng);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> MapBoundsFieldBuilder {
        self.disabled = disabled;
        self
    }

    pub fn required(mut self, required: bool) -> MapBoundsFieldBuilder {
        self.required = required;
        self
    }

    pub fn build(self) -> Result<MapBoundsField, ConfigError> {
        check_display(self.height, self.zoom)?;
        let name = parse_path("name", &self.name)?;
        let mode = bounds_mode(&name, self.paths)?;
        Ok(MapBoundsField {
            name,
            mode,
            height: self.height,
            zoom: self.zoom,
            show_label: self.show_label,
            default_center: self.default_center,
            disabled: self.disabled,
            required: self.required,
        })
    }
}

/// Read-only point display.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    name: DotPath,
    mode: StorageMode<PointPaths>,
    height: u32,
    zoom: u8,
    show_label: bool,
}

#[derive(Debug, Clone)]
pub struct MapEntryBuilder {
    name: String,
    latitude: Option<String>,
    longitude: Option<String>,
    height: u32,
    zoom: u8,
    show_label: bool,
}

impl MapEntry {
    pub fn make(name: &str) -> MapEntryBuilder {
        MapEntryBuilder {
            name: name.to_owned(),
            latitude: None,
            longitude: None,
            height: ENTRY_HEIGHT,
            zoom: POINT_ZOOM,
            show_label: true,
        }
    }

    pub fn name(&self) -> &DotPath {
        &self.name
    }

    pub fn mode(&self) -> &StorageMode<PointPaths> {
        &self.mode
    }

    pub fn is_legacy_mode(&self) -> bool {
        self.mode.is_legacy_mode()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn should_show_label(&self) -> bool {
        self.show_label
    }

    /// Coordinates of the record, only when both are present.
    pub fn coordinates(&self, store: &dyn StateStore) -> Option<Coordinate> {
        Some(resolve::<Coordinate>(&self.mode, store)).filter(|c| c.is_complete())
    }

    pub fn render(&self, store: &dyn StateStore) -> RenderOutput {
        match self.coordinates(store) {
            Some(c) => RenderOutput {
                label: if self.show_label { c.label() } else { None },
                placeholder: None,
                container: Some(MapContainer {
                    id: format!("map-{}", self.name),
                    height: self.height,
                    zoom: self.zoom,
                    center: c.pair(),
                    bounds: None,
                    interactive: false,
                }),
            },
            None => empty_entry(),
        }
    }
}

impl MapEntryBuilder {
    pub fn latitude(mut self, path: &str) -> MapEntryBuilder {
        self.latitude = Some(path.to_owned());
        self
    }

    pub fn longitude(mut self, path: &str) -> MapEntryBuilder {
        self.longitude = Some(path.to_owned());
        self
    }

    pub fn height(mut self, height: u32) -> MapEntryBuilder {
        self.height = height;
        self
    }

    pub fn zoom(mut self, zoom: u8) -> MapEntryBuilder {
        self.zoom = zoom;
        self
    }

    pub fn show_label(mut self, show: bool) -> MapEntryBuilder {
        self.show_label = show;
        self
    }

    pub fn build(self) -> Result<MapEntry, ConfigError> {
        check_display(self.height, self.zoom)?;
        let name = parse_path("name", &self.name)?;
        let mode = point_mode(&name,
                              parse_opt("latitude", self.latitude)?,
                              parse_opt("longitude", self.longitude)?);
        Ok(MapEntry {
            name,
            mode,
            height: self.height,
            zoom: self.zoom,
            show_label: self.show_label,
        })
    }
}

/// Read-only rectangle display.
#[derive(Debug, Clone, PartialEq)]
pub struct MapBoundsEntry {
    name: DotPath,
    mode: StorageMode<BoundsPaths>,
    height: u32,
    zoom: u8,
    show_label: bool,
}

#[derive(Debug, Clone)]
pub struct MapBoundsEntryBuilder {
    name: String,
    paths: [Option<String>; 4],
    height: u32,
    zoom: u8,
    show_label: bool,
}

impl MapBoundsEntry {
    pub fn make(name: &str) -> MapBoundsEntryBuilder {
        MapBoundsEntryBuilder {
            name: name.to_owned(),
            paths: [None, None, None, None],
            height: ENTRY_HEIGHT,
            zoom: BOUNDS_ZOOM,
            show_label: true,
        }
    }

    pub fn name(&self) -> &DotPath {
        &self.name
    }

    pub fn mode(&self) -> &StorageMode<BoundsPaths> {
        &self.mode
    }

    pub fn is_legacy_mode(&self) -> bool {
        self.mode.is_legacy_mode()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn should_show_label(&self) -> bool {
        self.show_label
    }

    /// Bounds of the record, only when all four corners are present.
    pub fn bounds(&self, store: &dyn StateStore) -> Option<Bounds> {
        Some(resolve::<Bounds>(&self.mode, store)).filter(|b| b.is_complete())
    }

    pub fn render(&self, store: &dyn StateStore) -> RenderOutput {
        match self.bounds(store) {
            Some(b) => RenderOutput {
                label: if self.show_label { b.label() } else { None },
                placeholder: None,
                container: Some(MapContainer {
                    id: format!("map-bounds-{}", self.name),
                    height: self.height,
                    zoom: self.zoom,
                    center: b.center(),
                    bounds: Some(b),
                    interactive: false,
                }),
            },
            None => empty_entry(),
        }
    }
}

impl MapBoundsEntryBuilder {
    pub fn south_west_lat(mut self, path: &str) -> MapBoundsEntryBuilder {
        self.paths[0] = Some(path.to_owned());
        self
    }

    pub fn south_west_lng(mut self, path: &str) -> MapBoundsEntryBuilder {
        self.paths[1] = Some(path.to_owned());
        self
    }

    pub fn north_east_lat(mut self, path: &str) -> MapBoundsEntryBuilder {
        self.paths[2] = Some(path.to_owned());
        self
    }

    pub fn north_east_lng(mut self, path: &str) -> MapBoundsEntryBuilder {
        self.paths[3] = Some(path.to_owned());
        self
    }

    pub fn height(mut self, height: u32) -> MapBoundsEntryBuilder {
        self.height = height;
        self
    }

    pub fn zoom(mut self, zoom: u8) -> MapBoundsEntryBuilder {
        self.zoom = zoom;
        self
    }

    pub fn show_label(mut self, show: bool) -> MapBoundsEntryBuilder {
        self.show_label = show;
        self
    }

    pub fn build(self) -> Result<MapBoundsEntry, ConfigError> {
        check_display(self.height, self.zoom)?;
        let name = parse_path("name", &self.name)?;
        let mode = bounds_mode(&name, self.paths)?;
        Ok(MapBoundsEntry {
            name,
            mode,
            height: self.height,
            zoom: self.zoom,
            show_label: self.show_label,
        })
    }
}

fn empty_entry() -> RenderOutput {
    RenderOutput {
        label: None,
        placeholder: Some(NO_COORDINATES.to_owned()),
        container: None,
    }
}

fn parse_path(option: &'static str, raw: &str) -> Result<DotPath, ConfigError> {
    DotPath::parse(raw).map_err(|source| ConfigError::Path { option, source })
}

fn parse_opt(option: &'static str, raw: Option<String>) -> Result<Option<DotPath>, ConfigError> {
    raw.map(|r| parse_path(option, &r)).transpose()
}

fn check_display(height: u32, zoom: u8) -> Result<(), ConfigError> {
    if height == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "height",
            value: height.to_string(),
            reason: "must be positive",
        });
    }
    if zoom > MAX_ZOOM {
        return Err(ConfigError::InvalidParameter {
            name: "zoom",
            value: zoom.to_string(),
            reason: "exceeds the maximum zoom level",
        });
    }
    Ok(())
}

fn point_mode(
    name: &DotPath,
    latitude: Option<DotPath>,
    longitude: Option<DotPath>,
) -> StorageMode<PointPaths> {
    let partial = latitude.is_some() || longitude.is_some();
    match PointPaths::from_options(latitude, longitude) {
        Some(paths) => StorageMode::Legacy(paths),
        None => {
            if partial {
                warn!(field = %name, "only one of latitude/longitude configured, using json mode");
            }
            StorageMode::Json(name.clone())
        }
    }
}

fn bounds_mode(
    name: &DotPath,
    paths: [Option<String>; 4],
) -> Result<StorageMode<BoundsPaths>, ConfigError> {
    let configured = paths.iter().filter(|p| p.is_some()).count();
    let [sw_lat, sw_lng, ne_lat, ne_lng] = paths;
    let legacy = BoundsPaths::from_options(
        parse_opt("south_west_lat", sw_lat)?,
        parse_opt("south_west_lng", sw_lng)?,
        parse_opt("north_east_lat", ne_lat)?,
        parse_opt("north_east_lng", ne_lng)?,
    );
    Ok(match legacy {
        Some(paths) => StorageMode::Legacy(paths),
        None => {
            if configured > 0 {
                warn!(field = %name, configured, "incomplete bounds paths, using json mode");
            }
            StorageMode::Json(name.clone())
        }
    })
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Submit-time check of a required field. Legacy mode needs every raw value set;
/// JSON mode needs a non-empty object holding every key with a non-null value.
/// Unreadable state fails.
fn check_required<S: GeoState>(
    name: &DotPath,
    mode: &StorageMode<S::Paths>,
    store: &dyn StateStore,
) -> Result<(), ValidationError> {
    let fail = || ValidationError::Required { field: name.to_string() };
    match *mode {
        StorageMode::Legacy(ref paths) => {
            for path in paths.paths() {
                let value = store.get(path).map_err(|_| fail())?;
                if is_blank(value.as_ref()) {
                    return Err(fail());
                }
            }
            Ok(())
        }
        StorageMode::Json(ref path) => {
            let value = store.get(path).map_err(|_| fail())?.ok_or_else(fail)?;
            let complete = match value {
                Value::Object(ref map) if !map.is_empty() => {
                    S::KEYS.iter().all(|k| map.get(*k).map_or(false, |v| !v.is_null()))
                }
                _ => false,
            };
            if complete { Ok(()) } else { Err(fail()) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn point_field_defaults() {
        let field = MapField::make("location").build().unwrap();
        assert!(!field.is_legacy_mode());
        assert_eq!(field.height(), 400);
        assert_eq!(field.zoom(), 15);
        assert!(!field.should_show_paste_button());
        assert!(field.should_show_label());
        assert!(field.is_interactive());
        assert!(!field.is_required());
    }

    #[test]
    fn read_only_is_inverse_of_interactive() {
        let field = MapField::make("location").read_only(true).build().unwrap();
        assert!(!field.is_interactive());
        let field = MapField::make("location").read_only(false).build().unwrap();
        assert!(field.is_interactive());
    }

    #[test]
    fn point_field_needs_both_paths_for_legacy_mode() {
        let field = MapField::make("map").latitude("ubicacion.latitud").build().unwrap();
        assert!(!field.is_legacy_mode());
        assert_eq!(field.mode(), &StorageMode::Json(DotPath::parse("map").unwrap()));

        let field = MapField::make("map")
            .latitude("address.coordinates.latitude")
            .longitude("address.coordinates.longitude")
            .build()
            .unwrap();
        assert!(field.is_legacy_mode());
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            MapField::make("map").latitude("a..b").longitude("c").build(),
            Err(ConfigError::Path { option: "latitude", .. })
        ));
        assert!(matches!(
            MapEntry::make("map").zoom(25).build(),
            Err(ConfigError::InvalidParameter { name: "zoom", .. })
        ));
        assert!(MapBoundsField::make("bounds").height(0).build().is_err());
    }

    #[test]
    fn legacy_point_field_reads_and_writes_separate_values() {
        let field = MapField::make("map").latitude("latitude").longitude("longitude").build().unwrap();
        let mut store = MemoryStore::from_value(json!({ "latitude": "40.4168", "longitude": -3.7038 }));
        assert_eq!(field.coordinates(&store), Coordinate::new(40.4168, -3.7038));
        field.set_coordinates(&mut store, &Coordinate::new(1.0, 2.0)).unwrap();
        assert_eq!(store.value(), Some(&json!({ "latitude": 1.0, "longitude": 2.0 })));
        assert_eq!(field.dehydrate(&store), None);
    }

    #[test]
    fn json_point_field_hydrates_malformed_state_to_null() {
        let field = MapField::make("location").build().unwrap();
        let mut store = MemoryStore::from_value(json!({ "location": { "latitude": 1.0 } }));
        field.hydrate(&mut store).unwrap();
        assert_eq!(store.value(), Some(&json!({ "location": null })));
        assert_eq!(field.dehydrate(&store), None);

        let mut store = MemoryStore::from_value(json!({
            "location": { "latitude": 1.0, "longitude": 2.0 }
        }));
        field.hydrate(&mut store).unwrap();
        assert_eq!(
            field.dehydrate(&store),
            Some(json!({ "latitude": 1.0, "longitude": 2.0 }))
        );
    }

    #[test]
    fn required_point_field() {
        let field = MapField::make("location").required(true).build().unwrap();
        let empty = MemoryStore::new();
        assert_eq!(
            field.validate(&empty),
            Err(ValidationError::Required { field: "location".into() })
        );
        let full = MemoryStore::from_value(json!({ "location": { "latitude": 1.0, "longitude": 2.0 } }));
        assert_eq!(field.validate(&full), Ok(()));
        let optional = MapField::make("location").build().unwrap();
        assert_eq!(optional.validate(&empty), Ok(()));
    }

    #[test]
    fn required_legacy_bounds_field_rejects_blank_values() {
        let field = MapBoundsField::make("area_bounds")
            .south_west_lat("sw_lat")
            .south_west_lng("sw_lng")
            .north_east_lat("ne_lat")
            .north_east_lng("ne_lng")
            .required(true)
            .build()
            .unwrap();
        let store = MemoryStore::from_value(json!({
            "sw_lat": 40.0, "sw_lng": -4.0, "ne_lat": "", "ne_lng": -3.0
        }));
        assert!(field.validate(&store).is_err());
        let store = MemoryStore::from_value(json!({
            "sw_lat": 40.0, "sw_lng": -4.0, "ne_lat": 41.0, "ne_lng": -3.0
        }));
        assert_eq!(field.validate(&store), Ok(()));
        assert!(field.validate(&MemoryStore::uninitialized()).is_err());
    }

    #[test]
    fn required_json_bounds_field_needs_every_key() {
        let field = MapBoundsField::make("bounds").required(true).build().unwrap();
        let store = MemoryStore::from_value(json!({ "bounds": { "sw_lat": 40.0 } }));
        assert!(field.validate(&store).is_err());
        let store = MemoryStore::from_value(json!({ "bounds": {} }));
        assert!(field.validate(&store).is_err());
        let store = MemoryStore::from_value(json!({
            "bounds": { "sw_lat": 40.0, "sw_lng": -4.0, "ne_lat": 41.0, "ne_lng": -3.0 }
        }));
        assert_eq!(field.validate(&store), Ok(()));
    }

    #[test]
    fn bounds_field_defaults_and_initial_view() {
        let field = MapBoundsField::make("bounds").build().unwrap();
        assert_eq!(field.zoom(), 13);
        assert_eq!(field.height(), 400);
        assert_eq!(field.default_center(), DEFAULT_CENTER);

        let view = field.initial_view(&MemoryStore::new());
        assert_eq!(view.center, DEFAULT_CENTER);
        assert_eq!(view.bounds, Bounds::around(DEFAULT_CENTER, 0.01));

        let store = MemoryStore::from_value(json!({
            "bounds": { "sw_lat": 40.0, "sw_lng": -4.0, "ne_lat": 41.0, "ne_lng": -3.0 }
        }));
        let view = field.initial_view(&store);
        assert_eq!(view.center, (40.5, -3.5));
        assert_eq!(view.bounds, Bounds::new(40.0, -4.0, 41.0, -3.0));
    }

    #[test]
    fn bounds_field_renders_placeholder_until_complete() {
        let field = MapBoundsField::make("bounds").default_center(10.0, 20.0).build().unwrap();
        let out = field.render(&MemoryStore::new());
        assert_eq!(out.label, None);
        assert_eq!(out.placeholder.as_deref(), Some(BOUNDS_PLACEHOLDER));
        let container = out.container.unwrap();
        assert_eq!(container.id, "map-bounds-bounds");
        assert_eq!(container.center, Some((10.0, 20.0)));
        assert!(container.interactive);
    }

    #[test]
    fn bounds_field_dehydrates_only_non_empty_objects() {
        let field = MapBoundsField::make("bounds").build().unwrap();
        let mut store = MemoryStore::from_value(json!({ "bounds": {} }));
        assert_eq!(field.dehydrate(&store), None);
        field.hydrate(&mut store).unwrap();
        assert_eq!(store.value(), Some(&json!({ "bounds": null })));
    }

    #[test]
    fn entries_only_show_complete_values() {
        let entry = MapEntry::make("map").latitude("lat").longitude("lng").build().unwrap();
        assert_eq!(entry.height(), 300);
        let store = MemoryStore::from_value(json!({ "lat": "40.0", "lng": "" }));
        assert_eq!(entry.coordinates(&store), None);
        let out = entry.render(&store);
        assert_eq!(out.placeholder.as_deref(), Some(NO_COORDINATES));
        assert!(out.container.is_none());

        let store = MemoryStore::from_value(json!({ "lat": "40.0", "lng": "-3.5" }));
        let out = entry.render(&store);
        assert_eq!(out.label.as_deref(), Some("40.000000, -3.500000"));
        assert!(!out.container.unwrap().interactive);
    }

    #[test]
    fn bounds_entry_normalizes_values() {
        let entry = MapBoundsEntry::make("area")
            .south_west_lat("area.sw.lat")
            .south_west_lng("area.sw.lng")
            .north_east_lat("area.ne.lat")
            .north_east_lng("area.ne.lng")
            .show_label(false)
            .build()
            .unwrap();
        assert_eq!(entry.zoom(), 13);
        let store = MemoryStore::from_value(json!({
            "area": { "sw": { "lat": "40.0", "lng": "-4" }, "ne": { "lat": 41, "lng": -3.0 } }
        }));
        assert_eq!(entry.bounds(&store), Some(Bounds::new(40.0, -4.0, 41.0, -3.0)));
        assert_eq!(entry.render(&store).label, None);
        assert_eq!(entry.bounds(&MemoryStore::uninitialized()), None);
    }
}
