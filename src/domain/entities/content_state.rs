//! Content-state snapshot entity
//!
//! The snapshot is the only artifact carried across builds. One record exists
//! per addressable asset included in the most recent completed, state-saving
//! build; a content-update build reads it to decide which assets may keep
//! their prior bundle identity. It's a pure data structure - I/O is handled by
//! the `ContentStateStore` port.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Guid + content hash of one asset at build time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetState {
    /// Stable asset identifier
    pub guid: String,
    /// Content hash of the asset
    pub hash: String,
}

impl AssetState {
    pub fn new(guid: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            hash: hash.into(),
        }
    }
}

/// Snapshot record for one addressable asset
///
/// Equality of `asset` plus `dependencies` is what "unchanged" means for the
/// content-update diff; the bundle assignment and group are carried data, not
/// part of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAssetState {
    /// The asset's own state
    pub asset: AssetState,
    /// States of the assets it depends on, in a fixed order
    pub dependencies: Vec<AssetState>,
    /// Internal id of the bundle this asset was served from
    pub bundle_file_id: String,
    /// Name of the owning group at build time
    pub group_name: String,
}

impl CachedAssetState {
    /// Whether the asset content (including dependency hashes) matches
    /// another record
    pub fn content_matches(&self, other: &CachedAssetState) -> bool {
        self.asset == other.asset && self.dependencies == other.dependencies
    }
}

/// The persisted cross-build snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentState {
    /// Format version
    pub version: u32,
    /// Tool version that produced the snapshot
    pub tool_version: String,
    /// Player/content version string supplied by the caller
    pub player_version: String,
    /// Remote catalog load path recorded at build time, empty when none
    pub remote_catalog_load_path: String,
    /// One record per asset, keyed by guid
    cached_infos: BTreeMap<String, CachedAssetState>,
}

impl ContentState {
    /// Current snapshot format version
    pub const VERSION: u32 = 1;

    pub fn new(player_version: impl Into<String>) -> Self {
        Self {
            version: Self::VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            player_version: player_version.into(),
            remote_catalog_load_path: String::new(),
            cached_infos: BTreeMap::new(),
        }
    }

    pub fn with_remote_catalog_load_path(mut self, path: impl Into<String>) -> Self {
        self.remote_catalog_load_path = path.into();
        self
    }

    pub fn len(&self) -> usize {
        self.cached_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached_infos.is_empty()
    }

    /// Record a state, replacing any prior record for the same guid
    pub fn set(&mut self, state: CachedAssetState) {
        self.cached_infos.insert(state.asset.guid.clone(), state);
    }

    /// Look up the record for a guid
    pub fn get(&self, guid: &str) -> Option<&CachedAssetState> {
        self.cached_infos.get(guid)
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.cached_infos.contains_key(guid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CachedAssetState)> {
        self.cached_infos.iter().map(|(k, v)| (k.as_str(), v))
    }
}
