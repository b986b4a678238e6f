use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::PathError;

/// An address into nested key-value data, e.g. `address.coordinates.latitude`.
/// Segments are traversed left to right.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotPath {
    raw: String,
    segments: Vec<String>,
}

impl DotPath {
    /// Parse a dot-separated path. Empty paths and empty segments are rejected.
    pub fn parse(raw: &str) -> Result<DotPath, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = raw.split('.').map(str::to_owned).collect();
        if let Some(position) = segments.iter().position(|s| s.is_empty()) {
            return Err(PathError::EmptySegment {
                path: raw.to_owned(),
                position,
            });
        }
        Ok(DotPath {
            raw: raw.to_owned(),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The first `len` segments of this path, e.g. `a.b` for `a.b.c` and 2.
    /// `len` is clamped to `1..=segments().len()`.
    pub fn ancestor(&self, len: usize) -> DotPath {
        let segments = self.segments[..len.clamp(1, self.segments.len())].to_vec();
        DotPath {
            raw: segments.join("."),
            segments,
        }
    }
}

impl FromStr for DotPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<DotPath, PathError> {
        DotPath::parse(s)
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Look up `path` in `root`. Objects are indexed by key and arrays by numeric index.
/// Returns `None` as soon as any segment is missing or lands on a scalar.
pub fn data_get<'a>(root: &'a Value, path: &DotPath) -> Option<&'a Value> {
    path.segments.iter().try_fold(root, |node, segment| match *node {
        Value::Object(ref map) => map.get(segment),
        Value::Array(ref items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `path` in `root`, replacing the leaf as a whole. Missing
/// intermediates are created as objects and scalar intermediates are replaced.
///
/// An array accepts an existing index or the index one past its end. Any other
/// segment turns the array into an object keyed by element index, so existing
/// elements are kept.
pub fn data_set(root: &mut Value, path: &DotPath, value: Value) {
    let mut node = root;
    for segment in &path.segments {
        node = slot_mut(node, segment);
    }
    *node = value;
}

/// Remove the value at `path`. Missing paths are left alone.
pub fn data_forget(root: &mut Value, path: &DotPath) {
    let (last, parents) = match path.segments.split_last() {
        Some(split) => split,
        None => return,
    };
    let mut node = root;
    for segment in parents {
        node = match *node {
            Value::Object(ref mut map) => match map.get_mut(segment) {
                Some(child) => child,
                None => return,
            },
            Value::Array(ref mut items) => match segment_index(items, segment) {
                Some(i) => &mut items[i],
                None => return,
            },
            _ => return,
        };
    }
    match *node {
        Value::Object(ref mut map) => {
            map.remove(last);
        }
        Value::Array(ref mut items) => {
            if let Some(i) = segment_index(items, last) {
                items.remove(i);
            }
        }
        _ => {}
    }
}

fn slot_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    if let Value::Array(ref mut items) = *node {
        match segment.parse::<usize>() {
            Ok(i) if i == items.len() => items.push(Value::Null),
            Ok(i) if i < items.len() => {}
            _ => {
                let keyed: Map<String, Value> =
                    items.drain(..).enumerate().map(|(i, v)| (i.to_string(), v)).collect();
                *node = Value::Object(keyed);
            }
        }
    }
    if let Some(i) = node.as_array().and_then(|items| segment_index(items, segment)) {
        return &mut node[i];
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    &mut node[segment]
}

/// Index of an existing array element addressed by `segment`.
fn segment_index(items: &[Value], segment: &str) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|&i| i < items.len())
}
