use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::path::{data_forget, data_get, data_set, DotPath};

/// Host form state, addressed by dot-paths. Implementations own persistence.
pub trait StateStore {
    /// Value at `path`, or `None` when any segment is missing.
    fn get(&self, path: &DotPath) -> Result<Option<Value>, StoreError>;

    /// Replace the value at `path`.
    fn set(&mut self, path: &DotPath, value: Value) -> Result<(), StoreError>;

    /// Remove the value at `path`, if any.
    fn remove(&mut self, path: &DotPath) -> Result<(), StoreError>;
}

/// An in-memory JSON tree, e.g. a record decoded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore {
    root: Option<Value>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            root: Some(Value::Object(Map::new())),
        }
    }

    pub fn from_value(root: Value) -> MemoryStore {
        MemoryStore { root: Some(root) }
    }

    /// A store whose backing record does not exist yet. Every access fails.
    pub fn uninitialized() -> MemoryStore {
        MemoryStore { root: None }
    }

    pub fn value(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.root
    }
}

impl Default for MemoryStore {
    fn default() -> MemoryStore {
        MemoryStore::new()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, path: &DotPath) -> Result<Option<Value>, StoreError> {
        let root = self.root.as_ref().ok_or(StoreError::Uninitialized)?;
        Ok(data_get(root, path).cloned())
    }

    fn set(&mut self, path: &DotPath, value: Value) -> Result<(), StoreError> {
        let root = self.root.as_mut().ok_or(StoreError::Uninitialized)?;
        data_set(root, path, value);
        Ok(())
    }

    fn remove(&mut self, path: &DotPath) -> Result<(), StoreError> {
        let root = self.root.as_mut().ok_or(StoreError::Uninitialized)?;
        data_forget(root, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_and_writes_nested_paths() {
        let mut store = MemoryStore::new();
        let path = DotPath::parse("location.lat").unwrap();
        assert_eq!(store.get(&path), Ok(None));
        store.set(&path, json!(40.0)).unwrap();
        assert_eq!(store.get(&path), Ok(Some(json!(40.0))));
        assert_eq!(store.value(), Some(&json!({ "location": { "lat": 40.0 } })));
        store.remove(&path).unwrap();
        store.remove(&path).unwrap();
        assert_eq!(store.get(&path), Ok(None));
        assert_eq!(store.value(), Some(&json!({ "location": {} })));
    }

    #[test]
    fn uninitialized_store_fails() {
        let mut store = MemoryStore::uninitialized();
        let path = DotPath::parse("lat").unwrap();
        assert_eq!(store.get(&path), Err(StoreError::Uninitialized));
        assert_eq!(store.set(&path, json!(1.0)), Err(StoreError::Uninitialized));
        assert_eq!(store.remove(&path), Err(StoreError::Uninitialized));
    }
}
