//! Asset group entity and its schema set
//!
//! A group is a named collection of entries plus a schema set describing how
//! the build packs and names them. Build logic branches on schema kind, not on
//! arbitrary subclass behavior, so the schema set is a closed tagged enum.

use crate::domain::entities::AssetEntry;

/// Policy governing how a group's entries map onto physical bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackingMode {
    /// All entries in the group form one bundle (scenes split out)
    #[default]
    Together,
    /// Each top-level entry and everything it contains becomes its own bundle
    Separately,
    /// Entries bucketed by their concatenated label set, one bundle per bucket
    TogetherByLabel,
}

/// Source of the bundle-name seed ("group hash")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundleIdMode {
    /// Group guid alone
    #[default]
    GroupGuid,
    /// Hash of group guid + project id
    GroupGuidProjectId,
    /// Hash of group guid + project id + all member asset guids; bundle
    /// identity becomes sensitive to membership changes
    GroupGuidProjectIdEntriesHash,
}

/// Naming style of the final published bundle filename
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingStyle {
    /// Group-derived name with the content hash appended
    #[default]
    AppendHash,
    /// Group-derived name without a hash; collision-checked against every
    /// other final name before any file placement
    NoHash,
    /// Caller-supplied prefix in place of the group name, hash appended
    Custom(String),
    /// Filename is the content hash alone
    FileNameOnly,
}

/// Schema for groups packed into content bundles
#[derive(Debug, Clone, PartialEq)]
pub struct BundledSchema {
    /// Packing policy
    pub packing: PackingMode,
    /// Bundle-name seed source
    pub id_mode: BundleIdMode,
    /// Final filename style
    pub naming: NamingStyle,
    /// Build path template (profile variables in `{...}`)
    pub build_path: String,
    /// Load path template
    pub load_path: String,
    /// Record bundle CRCs in provider data
    pub use_crc: bool,
    /// Record bundle hashes in provider data (enables client caching)
    pub use_cache: bool,
    /// Excluded from the build entirely when false
    pub include_in_build: bool,
}

impl Default for BundledSchema {
    fn default() -> Self {
        Self {
            packing: PackingMode::default(),
            id_mode: BundleIdMode::default(),
            naming: NamingStyle::default(),
            build_path: String::new(),
            load_path: String::new(),
            use_crc: true,
            use_cache: true,
            include_in_build: true,
        }
    }
}

/// Closed set of schema kinds the build dispatches on
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSchema {
    /// Entries ship inside the player build and load through the legacy
    /// resources provider; no bundles are produced
    PlayerData,
    /// Entries are packed into content bundles
    BundledAssets(BundledSchema),
    /// Marks the group's content static for content-update purposes
    ContentUpdate { static_content: bool },
}

/// A named collection of addressable entries plus a schema set
#[derive(Debug, Clone, PartialEq)]
pub struct AssetGroup {
    name: String,
    guid: String,
    schemas: Vec<GroupSchema>,
    entries: Vec<AssetEntry>,
}

impl AssetGroup {
    pub fn new(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
            schemas: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: GroupSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn with_entries(mut self, entries: Vec<AssetEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn add_entry(&mut self, entry: AssetEntry) {
        self.entries.push(entry);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn schemas(&self) -> &[GroupSchema] {
        &self.schemas
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    /// The bundled schema, if this group has one
    pub fn bundled_schema(&self) -> Option<&BundledSchema> {
        self.schemas.iter().find_map(|s| match s {
            GroupSchema::BundledAssets(b) => Some(b),
            _ => None,
        })
    }

    /// Whether this group's content is marked static for update builds
    pub fn static_content(&self) -> bool {
        self.schemas.iter().any(|s| match s {
            GroupSchema::ContentUpdate { static_content } => *static_content,
            _ => false,
        })
    }

    /// Group name normalized the way bundle names are built from it:
    /// lower-cased, spaces stripped, separators forward-slashed.
    pub fn bundle_name_prefix(&self) -> String {
        self.name
            .to_lowercase()
            .replace(' ', "")
            .replace('\\', "/")
            .replace("//", "/")
    }
}
