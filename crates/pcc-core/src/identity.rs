//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers carried by decision documents.
//! You cannot pass a correlation id where an asset id is expected.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier attached to one decision document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Generate a fresh random correlation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Namespaced identifier of the asset a run is about, e.g. `tender:pack/ssa_v_2024`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Wrap an asset id verbatim.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive `tender:<kind>/<stem>` from an input path.
    ///
    /// The stem is the file name without its final extension, lowercased,
    /// with spaces replaced by underscores.
    pub fn from_source_path(path: &Path, kind: &str) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = stem.replace(' ', "_").to_lowercase();
        Self(format!("tender:{kind}/{stem}"))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_unique() {
        assert_ne!(CorrelationId::new(), CorrelationId::new());
    }

    #[test]
    fn correlation_id_serializes_as_plain_uuid() {
        let id = CorrelationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }

    #[test]
    fn asset_id_from_source_path() {
        let id = AssetId::from_source_path(Path::new("/in/Renhold Facility 2024.zip"), "pack");
        assert_eq!(id.as_str(), "tender:pack/renhold_facility_2024");
        let offer = AssetId::from_source_path(Path::new("offer.jsonl"), "offer");
        assert_eq!(offer.to_string(), "tender:offer/offer");
    }
}
