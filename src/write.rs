//! Writing coordinates and bounds back into form state.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, WriteError};
use crate::mode::{LegacyPaths, StorageMode};
use crate::path::DotPath;
use crate::store::StateStore;
use crate::types::{to_json_number, GeoState};

/// Write `value` through `mode`.
///
/// JSON mode replaces the whole object at its path in a single store write.
/// Legacy mode stages every component first and then writes them in component
/// order. If a write fails part way, the paths already written are restored to
/// what they held before and `WriteError::Partial` is returned.
///
/// Writing the same value twice leaves the store exactly as writing it once.
pub fn write<S: GeoState>(
    mode: &StorageMode<S::Paths>,
    value: &S,
    store: &mut dyn StateStore,
) -> Result<(), WriteError> {
    match *mode {
        StorageMode::Json(ref path) => {
            store.set(path, value.to_json())?;
            debug!(path = %path, kind = S::KIND, "wrote json value");
            Ok(())
        }
        StorageMode::Legacy(ref paths) => {
            let staged: Vec<(&DotPath, Value)> = paths
                .paths()
                .into_iter()
                .zip(value.parts().into_iter().map(to_json_number))
                .collect();
            commit(store, staged)
        }
    }
}

fn commit(store: &mut dyn StateStore, staged: Vec<(&DotPath, Value)>) -> Result<(), WriteError> {
    let total = staged.len();
    let mut snapshots = Vec::with_capacity(total);
    for &(path, _) in &staged {
        snapshots.push(snapshot(&*store, path)?);
    }

    for (applied, (path, value)) in staged.iter().enumerate() {
        if let Err(source) = store.set(path, value.clone()) {
            if applied == 0 {
                return Err(WriteError::Store(source));
            }
            rollback(store, &snapshots[..applied]);
            return Err(WriteError::Partial {
                applied,
                total,
                source,
            });
        }
    }
    debug!(paths = total, "wrote legacy values");
    Ok(())
}

/// The outermost part of the tree a write to some path can change, and what it
/// held before.
struct Snapshot {
    path: DotPath,
    value: Option<Value>,
}

/// Walk down `path` until the first ancestor that is missing, is not a container,
/// or is an array the next segment does not index. A write replaces or creates
/// everything from there down.
fn snapshot(store: &dyn StateStore, path: &DotPath) -> Result<Snapshot, StoreError> {
    let segments = path.segments();
    let mut len = 1;
    loop {
        let ancestor = path.ancestor(len);
        let value = store.get(&ancestor)?;
        let descend = match (value.as_ref(), segments.get(len)) {
            (Some(Value::Object(_)), Some(_)) => true,
            (Some(Value::Array(items)), Some(next)) => {
                next.parse::<usize>().map_or(false, |i| i < items.len())
            }
            _ => false,
        };
        if !descend {
            return Ok(Snapshot {
                path: ancestor,
                value,
            });
        }
        len += 1;
    }
}

fn rollback(store: &mut dyn StateStore, snapshots: &[Snapshot]) {
    for snapshot in snapshots.iter().rev() {
        let restored = match snapshot.value {
            Some(ref old) => store.set(&snapshot.path, old.clone()),
            None => store.remove(&snapshot.path),
        };
        if let Err(e) = restored {
            warn!(path = %snapshot.path, error = %e, "could not restore value after failed write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{BoundsPaths, PointPaths};
    use crate::resolve::try_resolve;
    use crate::store::MemoryStore;
    use crate::types::{Bounds, Coordinate};
    use serde_json::json;

    fn p(s: &str) -> DotPath {
        DotPath::parse(s).unwrap()
    }

    fn point_paths() -> StorageMode<PointPaths> {
        StorageMode::Legacy(PointPaths {
            latitude: p("ubicacion.latitud"),
            longitude: p("ubicacion.longitud"),
        })
    }

    /// Fails every write to one path.
    struct FailingStore {
        inner: MemoryStore,
        fail_on: DotPath,
    }

    impl StateStore for FailingStore {
        fn get(&self, path: &DotPath) -> Result<Option<Value>, StoreError> {
            self.inner.get(path)
        }

        fn set(&mut self, path: &DotPath, value: Value) -> Result<(), StoreError> {
            if *path == self.fail_on {
                return Err(StoreError::Rejected {
                    path: path.to_string(),
                    reason: "read-only".into(),
                });
            }
            self.inner.set(path, value)
        }

        fn remove(&mut self, path: &DotPath) -> Result<(), StoreError> {
            self.inner.remove(path)
        }
    }

    fn area_paths() -> StorageMode<BoundsPaths> {
        StorageMode::Legacy(BoundsPaths {
            sw_lat: p("area.sw_lat"),
            sw_lng: p("area.sw_lng"),
            ne_lat: p("area.ne_lat"),
            ne_lng: p("area.ne_lng"),
        })
    }

    #[test]
    fn json_mode_replaces_whole_value() {
        let mut store = MemoryStore::from_value(json!({
            "bounds": { "sw_lat": 1.0, "extra": true }
        }));
        let mode: StorageMode<BoundsPaths> = StorageMode::Json(p("bounds"));
        write(&mode, &Bounds::new(40.0, -4.0, 41.0, -3.0), &mut store).unwrap();
        assert_eq!(
            store.value(),
            Some(&json!({
                "bounds": { "sw_lat": 40.0, "sw_lng": -4.0, "ne_lat": 41.0, "ne_lng": -3.0 }
            }))
        );
    }

    #[test]
    fn legacy_mode_writes_each_path() {
        let mut store = MemoryStore::new();
        write(&point_paths(), &Coordinate::new(40.416775, -3.70379), &mut store).unwrap();
        assert_eq!(
            store.value(),
            Some(&json!({ "ubicacion": { "latitud": 40.416775, "longitud": -3.70379 } }))
        );
    }

    #[test]
    fn round_trips_in_both_modes() {
        let mut store = MemoryStore::new();
        let c = Coordinate::new(40.4168, -3.7038);
        let json_mode: StorageMode<PointPaths> = StorageMode::Json(p("location"));
        write(&json_mode, &c, &mut store).unwrap();
        assert_eq!(try_resolve::<Coordinate>(&json_mode, &store), Ok(c));
        write(&point_paths(), &c, &mut store).unwrap();
        assert_eq!(try_resolve::<Coordinate>(&point_paths(), &store), Ok(c));
    }

    #[test]
    fn repeated_writes_are_idempotent() {
        let mut once = MemoryStore::new();
        let mut twice = MemoryStore::new();
        let c = Coordinate::new(1.25, 2.5);
        write(&point_paths(), &c, &mut once).unwrap();
        write(&point_paths(), &c, &mut twice).unwrap();
        write(&point_paths(), &c, &mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn failed_legacy_write_rolls_back() {
        let mut store = FailingStore {
            inner: MemoryStore::from_value(json!({ "sw_lat": 1.0, "sw_lng": 2.0 })),
            fail_on: p("ne_lat"),
        };
        let mode = StorageMode::Legacy(BoundsPaths {
            sw_lat: p("sw_lat"),
            sw_lng: p("sw_lng"),
            ne_lat: p("ne_lat"),
            ne_lng: p("ne_lng"),
        });
        let err = write(&mode, &Bounds::new(40.0, -4.0, 41.0, -3.0), &mut store).unwrap_err();
        match err {
            WriteError::Partial { applied, total, .. } => {
                assert_eq!(applied, 2);
                assert_eq!(total, 4);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(
            store.inner.value(),
            Some(&json!({ "sw_lat": 1.0, "sw_lng": 2.0 }))
        );
    }

    #[test]
    fn rollback_removes_paths_that_did_not_exist() {
        let mut store = FailingStore {
            inner: MemoryStore::from_value(json!({ "title": "t" })),
            fail_on: p("area.ne_lat"),
        };
        let err = write(&area_paths(), &Bounds::new(40.0, -4.0, 41.0, -3.0), &mut store);
        assert!(matches!(err, Err(WriteError::Partial { applied: 2, .. })));
        assert_eq!(store.inner.value(), Some(&json!({ "title": "t" })));
    }

    #[test]
    fn rollback_restores_replaced_intermediates() {
        let before = json!({ "area": "unknown", "points": [ { "lat": 1.0 } ] });
        let mut store = FailingStore {
            inner: MemoryStore::from_value(before.clone()),
            fail_on: p("area.ne_lat"),
        };
        assert!(write(&area_paths(), &Bounds::new(1.0, 2.0, 3.0, 4.0), &mut store).is_err());
        assert_eq!(store.inner.value(), Some(&before));

        store.fail_on = p("points.3.lng");
        let mode = StorageMode::Legacy(PointPaths {
            latitude: p("points.3.lat"),
            longitude: p("points.3.lng"),
        });
        assert!(write(&mode, &Coordinate::new(1.0, 2.0), &mut store).is_err());
        assert_eq!(store.inner.value(), Some(&before));
    }

    #[test]
    fn rollback_keeps_untouched_siblings() {
        let mut store = FailingStore {
            inner: MemoryStore::from_value(json!({ "area": { "sw_lat": 1.0, "label": "x" } })),
            fail_on: p("area.ne_lat"),
        };
        assert!(write(&area_paths(), &Bounds::new(40.0, -4.0, 41.0, -3.0), &mut store).is_err());
        assert_eq!(
            store.inner.value(),
            Some(&json!({ "area": { "sw_lat": 1.0, "label": "x" } }))
        );
    }

    #[test]
    fn uninitialized_store_fails_before_writing() {
        let mut store = MemoryStore::uninitialized();
        assert_eq!(
            write(&point_paths(), &Coordinate::new(1.0, 2.0), &mut store),
            Err(WriteError::Store(StoreError::Uninitialized))
        );
    }
}
