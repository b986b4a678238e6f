//! Error types for geofield

use thiserror::Error;

/// A dot-path could not be parsed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("empty segment at position {position} in path `{path}`")]
    EmptySegment { path: String, position: usize },
}

/// Failure reported by a state store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("state store is not initialized")]
    Uninitialized,

    #[error("state store rejected write at `{path}`: {reason}")]
    Rejected { path: String, reason: String },
}

/// Why a coordinate or bounds value could not be resolved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("value at `{path}` is not a {expected} object")]
    MalformedShape { path: String, expected: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a write into the state store did not complete.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WriteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Some paths were written before the failure; they have been rolled back.
    #[error("write failed after {applied} of {total} paths: {source}")]
    Partial {
        applied: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
}

/// A field or entry was configured incorrectly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid path for `{option}`: {source}")]
    Path {
        option: &'static str,
        #[source]
        source: PathError,
    },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Host-level validation failure at submit time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("the {field} field is required")]
    Required { field: String },
}

/// The external map library failed or is missing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("map library is not loaded")]
    MissingLibrary,

    #[error("map library error: {0}")]
    Library(String),
}

/// Main error type for geofield operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for geofield operations
pub type Result<T> = std::result::Result<T, Error>;
