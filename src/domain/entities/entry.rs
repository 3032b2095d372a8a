//! Addressable entry entity
//!
//! An entry is a named, keyed reference to a source asset, independent of
//! where that asset is stored. Folder entries expand recursively into leaf
//! entries at build time; the catalog only ever sees leaves.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Resolved kind of the asset behind an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetKind {
    /// Regular loadable asset
    #[default]
    Standard,
    /// Scene asset; always packed into a separate bundle from plain assets
    Scene,
    /// Folder/collection entry; expands into its children
    Folder,
    /// Asset type could not be resolved (dropped or fatal per settings)
    Unresolved,
}

impl AssetKind {
    /// Resolve a kind from an asset path.
    ///
    /// Scenes are identified by extension; a path with no extension that is
    /// not a folder entry cannot be resolved.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("scene") => AssetKind::Scene,
            Some(_) => AssetKind::Standard,
            None => AssetKind::Unresolved,
        }
    }
}

/// An addressable asset entry
///
/// Belongs to exactly one group. Labels are kept sorted so every iteration
/// over them is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    /// Primary key string ("address")
    address: String,
    /// Stable asset identifier
    guid: String,
    /// Source asset path
    asset_path: PathBuf,
    /// Label set, sorted
    labels: BTreeSet<String>,
    kind: AssetKind,
    is_sub_asset: bool,
    is_in_resources: bool,
    /// Guids of assets this entry's content depends on
    depends_on: Vec<String>,
    /// Child entries for folder/collection entries
    children: Vec<AssetEntry>,
}

impl AssetEntry {
    /// Create a new leaf entry, resolving its kind from the asset path
    pub fn new(
        address: impl Into<String>,
        guid: impl Into<String>,
        asset_path: impl Into<PathBuf>,
    ) -> Self {
        let asset_path = asset_path.into();
        let kind = AssetKind::from_path(&asset_path);
        Self {
            address: address.into(),
            guid: guid.into(),
            asset_path,
            labels: BTreeSet::new(),
            kind,
            is_sub_asset: false,
            is_in_resources: false,
            depends_on: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a folder entry from child entries
    pub fn folder(
        address: impl Into<String>,
        guid: impl Into<String>,
        asset_path: impl Into<PathBuf>,
        children: Vec<AssetEntry>,
    ) -> Self {
        Self {
            address: address.into(),
            guid: guid.into(),
            asset_path: asset_path.into(),
            labels: BTreeSet::new(),
            kind: AssetKind::Folder,
            is_sub_asset: false,
            is_in_resources: false,
            depends_on: Vec::new(),
            children,
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_kind(mut self, kind: AssetKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_sub_asset(mut self, is_sub_asset: bool) -> Self {
        self.is_sub_asset = is_sub_asset;
        self
    }

    pub fn with_in_resources(mut self, is_in_resources: bool) -> Self {
        self.is_in_resources = is_in_resources;
        self
    }

    pub fn with_depends_on<I, S>(mut self, guids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = guids.into_iter().map(Into::into).collect();
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn asset_path(&self) -> &Path {
        &self.asset_path
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn is_scene(&self) -> bool {
        self.kind == AssetKind::Scene
    }

    pub fn is_folder(&self) -> bool {
        self.kind == AssetKind::Folder
    }

    pub fn is_sub_asset(&self) -> bool {
        self.is_sub_asset
    }

    pub fn is_in_resources(&self) -> bool {
        self.is_in_resources
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn children(&self) -> &[AssetEntry] {
        &self.children
    }

    /// Concatenation of the label set in its fixed sorted order.
    ///
    /// Used as the bucket key for label-based packing.
    pub fn label_key(&self) -> String {
        let mut key = String::new();
        for l in &self.labels {
            key.push_str(l);
        }
        key
    }

    /// Recursively collect the leaf entries reachable from this entry.
    ///
    /// A leaf entry yields itself; a folder entry yields the leaves of its
    /// children and never itself.
    pub fn gather_leaves<'a>(&'a self, out: &mut Vec<&'a AssetEntry>) {
        if self.is_folder() {
            for child in &self.children {
                child.gather_leaves(out);
            }
        } else {
            out.push(self);
        }
    }
}
