//! Client-side reactive state for the map widgets.
//!
//! A shell mirrors the last known value, listens for edits coming from the map
//! library and writes them back into form state. Shells are `Idle` until mounted
//! against an available map library and `Active` afterwards; a shell that could
//! not be activated on its first mount stays `Idle`.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{DebugSettings, EDIT_MODE_DELAY};
use crate::error::{MapError, WriteError};
use crate::field::{MapBoundsField, MapField};
use crate::mode::{BoundsPaths, PointPaths, StorageMode};
use crate::normalize::{normalize, round6};
use crate::render::{MapContainer, Summary};
use crate::store::StateStore;
use crate::types::{Bounds, Coordinate};
use crate::write::write;

/// Event name the point map emits after the user moves the marker.
pub const COORDINATES_UPDATED: &str = "map-coordinates-updated";

/// Identifier the map library assigns to a drawn layer.
pub type LayerId = u64;

/// The external map library, injected so its absence can be handled and tested.
pub trait MapLibrary {
    fn is_available(&self) -> bool;

    fn init_map(&mut self, container: &MapContainer) -> Result<(), MapError>;

    /// Draw an editable rectangle and return its layer id.
    fn add_rectangle(&mut self, bounds: &Bounds) -> Result<LayerId, MapError>;

    fn enable_edit_mode(&mut self) -> Result<(), MapError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    Active,
}

/// A browser event: the payload is the event detail.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    pub name: String,
    pub detail: Value,
}

/// An event from the component framework's bus. Parameters usually arrive
/// wrapped in a one-element array.
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    pub name: String,
    pub params: Value,
}

/// The one internal command both transports are converted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellCommand {
    SetCoordinates(Coordinate),
}

/// Pull a coordinate out of an event payload. Both keys must be present; an
/// explicit null is accepted and clears that component.
pub fn coordinate_payload(data: &Value) -> Option<Coordinate> {
    let map = data.as_object()?;
    let latitude = map.get("latitude")?;
    let longitude = map.get("longitude")?;
    Some(Coordinate {
        latitude: normalize(latitude),
        longitude: normalize(longitude),
    })
}

/// Converts browser events into shell commands.
#[derive(Debug, Clone)]
pub struct WindowAdapter {
    tx: Sender<ShellCommand>,
}

impl WindowAdapter {
    /// Queue a command for `event`. Returns whether the event was accepted.
    pub fn dispatch(&self, event: &WindowEvent) -> bool {
        if event.name != COORDINATES_UPDATED {
            return false;
        }
        send(&self.tx, coordinate_payload(&event.detail))
    }
}

/// Converts framework bus events into shell commands.
#[derive(Debug, Clone)]
pub struct BusAdapter {
    tx: Sender<ShellCommand>,
}

impl BusAdapter {
    pub fn dispatch(&self, event: &BusEvent) -> bool {
        if event.name != COORDINATES_UPDATED {
            return false;
        }
        let data = match event.params {
            Value::Array(ref items) => items.first(),
            ref other => Some(other),
        };
        send(&self.tx, data.and_then(coordinate_payload))
    }
}

fn send(tx: &Sender<ShellCommand>, payload: Option<Coordinate>) -> bool {
    match payload {
        Some(c) => tx.send(ShellCommand::SetCoordinates(c)).is_ok(),
        None => {
            debug!("ignoring {} event without latitude and longitude", COORDINATES_UPDATED);
            false
        }
    }
}

/// Shell of the point picker.
pub struct PointShell {
    mode: StorageMode<PointPaths>,
    coordinates: Coordinate,
    container: MapContainer,
    state: ShellState,
    mounted: bool,
    debug: DebugSettings,
    tx: Sender<ShellCommand>,
    rx: Receiver<ShellCommand>,
}

impl PointShell {
    /// Seed the shell from the field's current state.
    pub fn new(field: &MapField, store: &dyn StateStore, debug: DebugSettings) -> PointShell {
        let (tx, rx) = channel();
        PointShell {
            mode: field.mode().clone(),
            coordinates: field.coordinates(store),
            container: field.container(store),
            state: ShellState::Idle,
            mounted: false,
            debug,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn coordinates(&self) -> Coordinate {
        self.coordinates
    }

    pub fn label(&self) -> Option<String> {
        self.coordinates.label()
    }

    pub fn window_adapter(&self) -> WindowAdapter {
        WindowAdapter { tx: self.tx.clone() }
    }

    pub fn bus_adapter(&self) -> BusAdapter {
        BusAdapter { tx: self.tx.clone() }
    }

    /// Activate against `library`. Only the first call has any effect.
    pub fn mount(&mut self, library: &mut dyn MapLibrary) -> ShellState {
        if self.mounted {
            return self.state;
        }
        self.mounted = true;
        self.state = activate(library, &self.container);
        self.state
    }

    /// Apply every queued command in arrival order. Returns how many were written.
    /// Commands reaching an idle shell are dropped.
    pub fn pump(&mut self, store: &mut dyn StateStore) -> usize {
        let mut applied = 0;
        while let Ok(ShellCommand::SetCoordinates(c)) = self.rx.try_recv() {
            if self.state == ShellState::Idle {
                if self.debug.enabled {
                    debug!(container = %self.container.id, "shell idle, dropping update");
                }
                continue;
            }
            if self.debug.enabled {
                debug!(latitude = ?c.latitude, longitude = ?c.longitude, "updating coordinates");
            }
            self.coordinates = c;
            match write(&self.mode, &c, store) {
                Ok(()) => applied += 1,
                Err(e) => warn!(error = %e, "could not store coordinates"),
            }
        }
        applied
    }
}

/// A layer reported by the map library after an edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditedLayer {
    pub id: LayerId,
    pub south_west: (f64, f64),
    pub north_east: (f64, f64),
}

/// The map library's "shape edited" event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeEdited {
    pub layers: Vec<EditedLayer>,
}

/// Shell of the rectangle picker.
pub struct BoundsShell {
    mode: StorageMode<BoundsPaths>,
    bounds: Bounds,
    container: MapContainer,
    disabled: bool,
    state: ShellState,
    mounted: bool,
    debug: DebugSettings,
    rectangle: Option<LayerId>,
    edit_mode_due: Option<Duration>,
}

impl BoundsShell {
    /// Seed the shell from the field's initial view.
    pub fn new(field: &MapBoundsField, store: &dyn StateStore, debug: DebugSettings) -> BoundsShell {
        let view = field.initial_view(store);
        BoundsShell {
            mode: field.mode().clone(),
            bounds: view.bounds,
            container: field.container(store),
            disabled: field.is_disabled(),
            state: ShellState::Idle,
            mounted: false,
            debug,
            rectangle: None,
            edit_mode_due: None,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn label(&self) -> Option<String> {
        self.bounds.label()
    }

    pub fn rectangle(&self) -> Option<LayerId> {
        self.rectangle
    }

    /// Activate, draw the rectangle and, unless disabled, schedule the one-shot
    /// switch into edit mode. Only the first call has any effect.
    pub fn mount(&mut self, library: &mut dyn MapLibrary) -> ShellState {
        if self.mounted {
            if self.debug.enabled {
                debug!(container = %self.container.id, "map already initialized");
            }
            return self.state;
        }
        self.mounted = true;
        if activate(library, &self.container) == ShellState::Idle {
            return self.state;
        }
        match library.add_rectangle(&self.bounds) {
            Ok(id) => self.rectangle = Some(id),
            Err(e) => {
                warn!(error = %e, container = %self.container.id, "could not draw bounds rectangle");
                return self.state;
            }
        }
        if !self.disabled {
            self.edit_mode_due = Some(EDIT_MODE_DELAY);
        }
        self.state = ShellState::Active;
        if self.debug.enabled {
            debug!(container = %self.container.id, "bounds map initialized");
        }
        self.state
    }

    /// Let `elapsed` time pass. Fires the pending edit-mode switch once it is due.
    pub fn advance(&mut self, elapsed: Duration, library: &mut dyn MapLibrary) {
        let remaining = match self.edit_mode_due {
            Some(remaining) => remaining,
            None => return,
        };
        if elapsed < remaining {
            self.edit_mode_due = Some(remaining - elapsed);
            return;
        }
        self.edit_mode_due = None;
        if let Err(e) = library.enable_edit_mode() {
            debug!(error = %e, "edit mode not enabled");
        }
    }

    pub fn edit_mode_pending(&self) -> bool {
        self.edit_mode_due.is_some()
    }

    /// Store the tracked rectangle's new corners, rounded to 6 decimals, in one
    /// write. Returns whether the event touched the tracked rectangle.
    pub fn on_shape_edited(
        &mut self,
        event: &ShapeEdited,
        store: &mut dyn StateStore,
    ) -> Result<bool, WriteError> {
        if self.state == ShellState::Idle {
            return Ok(false);
        }
        let layer = match event.layers.iter().find(|l| Some(l.id) == self.rectangle) {
            Some(layer) => layer,
            None => return Ok(false),
        };
        let bounds = Bounds::new(round6(layer.south_west.0),
                                 round6(layer.south_west.1),
                                 round6(layer.north_east.0),
                                 round6(layer.north_east.1));
        if self.debug.enabled {
            debug!(?bounds, "updating bounds");
        }
        self.bounds = bounds;
        write(&self.mode, &bounds, store)?;
        Ok(true)
    }
}

fn activate(library: &mut dyn MapLibrary, container: &MapContainer) -> ShellState {
    let initialized = if library.is_available() {
        library.init_map(container)
    } else {
        Err(MapError::MissingLibrary)
    };
    match initialized {
        Ok(()) => ShellState::Active,
        Err(e) => {
            warn!(error = %e, container = %container.id, "map stays inactive");
            ShellState::Idle
        }
    }
}
