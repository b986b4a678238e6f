//! Reading coordinates and bounds out of form state.

use tracing::debug;

use crate::error::ResolveError;
use crate::mode::{LegacyPaths, StorageMode};
use crate::normalize::normalize_opt;
use crate::store::StateStore;
use crate::types::GeoState;

/// Resolve a value through `mode`.
///
/// In JSON mode an absent or null value resolves to the all-null value, while any
/// other value must be an object holding every key of `S`. In legacy mode every
/// path is read and normalized independently; missing paths yield `None`.
pub fn try_resolve<S: GeoState>(
    mode: &StorageMode<S::Paths>,
    store: &dyn StateStore,
) -> Result<S, ResolveError> {
    match *mode {
        StorageMode::Json(ref path) => match store.get(path)? {
            None => Ok(S::empty()),
            Some(ref v) if v.is_null() => Ok(S::empty()),
            Some(v) => S::from_json(&v).ok_or_else(|| ResolveError::MalformedShape {
                path: path.to_string(),
                expected: S::KIND,
            }),
        },
        StorageMode::Legacy(ref paths) => {
            let mut parts = Vec::with_capacity(S::KEYS.len());
            for path in paths.paths() {
                parts.push(normalize_opt(store.get(path)?.as_ref()));
            }
            Ok(S::from_parts(&parts))
        }
    }
}

/// Lenient [`try_resolve`]: any failure is logged and becomes the all-null value,
/// so a broken record never breaks rendering.
pub fn resolve<S: GeoState>(mode: &StorageMode<S::Paths>, store: &dyn StateStore) -> S {
    match try_resolve(mode, store) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, kind = S::KIND, "falling back to empty value");
            S::empty()
        }
    }
}
