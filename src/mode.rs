use crate::path::DotPath;

/// Where a field keeps its value: one structured JSON value, or one scalar per
/// component at independently named paths. Chosen once when the field is built.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageMode<L> {
    Json(DotPath),
    Legacy(L),
}

impl<L: LegacyPaths> StorageMode<L> {
    pub fn is_legacy_mode(&self) -> bool {
        match *self {
            StorageMode::Legacy(_) => true,
            StorageMode::Json(_) => false,
        }
    }

    /// Every path this mode touches, in write order.
    pub fn paths(&self) -> Vec<&DotPath> {
        match *self {
            StorageMode::Json(ref path) => vec![path],
            StorageMode::Legacy(ref paths) => paths.paths(),
        }
    }
}

/// A fixed set of legacy-mode paths, in component order.
pub trait LegacyPaths {
    fn paths(&self) -> Vec<&DotPath>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointPaths {
    pub latitude: DotPath,
    pub longitude: DotPath,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundsPaths {
    pub sw_lat: DotPath,
    pub sw_lng: DotPath,
    pub ne_lat: DotPath,
    pub ne_lng: DotPath,
}

impl LegacyPaths for PointPaths {
    fn paths(&self) -> Vec<&DotPath> {
        vec![&self.latitude, &self.longitude]
    }
}

impl LegacyPaths for BoundsPaths {
    fn paths(&self) -> Vec<&DotPath> {
        vec![&self.sw_lat, &self.sw_lng, &self.ne_lat, &self.ne_lng]
    }
}

impl PointPaths {
    /// Both paths, if both were configured.
    pub fn from_options(latitude: Option<DotPath>, longitude: Option<DotPath>) -> Option<PointPaths> {
        Some(PointPaths {
            latitude: latitude?,
            longitude: longitude?,
        })
    }
}

impl BoundsPaths {
    /// All four paths, if all four were configured.
    pub fn from_options(
        sw_lat: Option<DotPath>,
        sw_lng: Option<DotPath>,
        ne_lat: Option<DotPath>,
        ne_lng: Option<DotPath>,
    ) -> Option<BoundsPaths> {
        Some(BoundsPaths {
            sw_lat: sw_lat?,
            sw_lng: sw_lng?,
            ne_lat: ne_lat?,
            ne_lng: ne_lng?,
        })
    }
}
