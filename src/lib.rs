//! Geographic form-field state: a single lat/lng point or a rectangular bounding box,
//! kept in host form state either as one JSON object ("JSON mode") or as separately
//! named scalar values reached through dot-paths ("legacy mode").
//!
//! ```
//! use geofield::{Coordinate, MapField, MemoryStore};
//!
//! let field = MapField::make("map")
//!     .latitude("ubicacion.latitud")
//!     .longitude("ubicacion.longitud")
//!     .build()
//!     .unwrap();
//! let mut store = MemoryStore::new();
//! field.set_coordinates(&mut store, &Coordinate::new(40.4168, -3.7038)).unwrap();
//! assert_eq!(field.coordinates(&store), Coordinate::new(40.4168, -3.7038));
//! ```

#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod error;
pub mod field;
pub mod mode;
pub mod normalize;
pub mod path;
pub mod render;
pub mod resolve;
pub mod shell;
pub mod store;
mod types;
pub mod util;
pub mod write;

pub use config::{Component, DebugSettings, FieldDefinition};
pub use error::{Error, Result};
pub use field::{MapBoundsEntry, MapBoundsField, MapEntry, MapField};
pub use mode::{BoundsPaths, PointPaths, StorageMode};
pub use normalize::{normalize, parse_pasted};
pub use path::DotPath;
pub use render::{MapContainer, RenderOutput, Summary};
pub use resolve::{resolve, try_resolve};
pub use shell::{BoundsShell, MapLibrary, PointShell, ShellState};
pub use store::{MemoryStore, StateStore};
pub use types::*;
pub use write::write;
