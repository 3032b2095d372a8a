//! Bundle build definitions and build-engine result types

use std::collections::BTreeMap;
use std::path::PathBuf;

/// A named set of asset paths destined for one physical bundle
#[derive(Debug, Clone, PartialEq)]
pub struct BundleBuildDefinition {
    /// Bundle name; starts as the raw logical name, replaced with the hashed
    /// physical filename by the namer
    pub bundle_name: String,
    /// Source asset paths, in pack order
    pub asset_paths: Vec<PathBuf>,
    /// Addressable name per asset, parallel to `asset_paths`
    pub addressable_names: Vec<String>,
    /// Raw names of bundles this bundle's content depends on
    pub dependencies: Vec<String>,
}

impl BundleBuildDefinition {
    pub fn new(bundle_name: impl Into<String>) -> Self {
        Self {
            bundle_name: bundle_name.into(),
            asset_paths: Vec::new(),
            addressable_names: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn add_asset(&mut self, path: impl Into<PathBuf>, addressable_name: impl Into<String>) {
        self.asset_paths.push(path.into());
        self.addressable_names.push(addressable_name.into());
    }
}

/// Per-bundle metadata returned by the external build engine
#[derive(Debug, Clone, PartialEq)]
pub struct BundleDetails {
    /// Content hash of the built bundle
    pub hash: String,
    /// CRC32 of the built bundle
    pub crc: u32,
    /// Path of the produced file in the staging area
    pub file_name: PathBuf,
    /// Raw names of dependency bundles
    pub dependencies: Vec<String>,
    /// Size of the produced file in bytes; 0 when it could not be read
    pub size: u64,
}

/// Results for one engine invocation, keyed by raw bundle name
#[derive(Debug, Clone, Default)]
pub struct BuildEngineResults {
    bundles: BTreeMap<String, BundleDetails>,
}

impl BuildEngineResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw_name: impl Into<String>, details: BundleDetails) {
        self.bundles.insert(raw_name.into(), details);
    }

    pub fn get(&self, raw_name: &str) -> Option<&BundleDetails> {
        self.bundles.get(raw_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BundleDetails)> {
        self.bundles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

/// Bidirectional mapping between raw engine bundle names and final published
/// filenames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleRenameMap {
    raw_to_final: BTreeMap<String, String>,
    final_to_raw: BTreeMap<String, String>,
}

impl BundleRenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: impl Into<String>, final_name: impl Into<String>) {
        let raw = raw.into();
        let final_name = final_name.into();
        self.final_to_raw.insert(final_name.clone(), raw.clone());
        self.raw_to_final.insert(raw, final_name);
    }

    pub fn final_name(&self, raw: &str) -> Option<&str> {
        self.raw_to_final.get(raw).map(|s| s.as_str())
    }

    pub fn raw_name(&self, final_name: &str) -> Option<&str> {
        self.final_to_raw.get(final_name).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.raw_to_final.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.raw_to_final.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_to_final.is_empty()
    }
}
