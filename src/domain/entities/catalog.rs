//! Content catalog entities
//!
//! The catalog is the serialized key→location(+dependencies) index used at
//! runtime to resolve an addressable key. It is created fresh per build and
//! discarded after serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A lookup key on a catalog entry.
///
/// Dependency lists may hold non-string keys too; only `Text` keys
/// participate in primary-key renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationKey {
    /// String key (address, guid, label, bundle name)
    Text(String),
    /// Numeric key (sub-asset index)
    Index(u32),
}

impl LocationKey {
    /// The string form of this key, if it is a text key
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LocationKey::Text(s) => Some(s.as_str()),
            LocationKey::Index(_) => None,
        }
    }
}

impl From<&str> for LocationKey {
    fn from(s: &str) -> Self {
        LocationKey::Text(s.to_string())
    }
}

impl From<String> for LocationKey {
    fn from(s: String) -> Self {
        LocationKey::Text(s)
    }
}

impl From<u32> for LocationKey {
    fn from(i: u32) -> Self {
        LocationKey::Index(i)
    }
}

/// One resolvable location in the catalog
///
/// `keys[0]` is the primary key: the stable identity referenced by other
/// entries' dependency lists. Dependency order affects load sequencing and is
/// preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Equivalent lookup keys; `keys[0]` is primary
    pub keys: Vec<LocationKey>,
    /// Resolved final load path
    pub internal_id: String,
    /// Provider id that loads this location
    pub provider: String,
    /// Current primary keys of entries this location depends on, in load order
    pub dependencies: Vec<LocationKey>,
    /// Opaque provider-specific payload
    #[serde(default)]
    pub data: Value,
}

impl CatalogEntry {
    pub fn new(
        keys: Vec<LocationKey>,
        internal_id: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            internal_id: internal_id.into(),
            provider: provider.into(),
            dependencies: Vec::new(),
            data: Value::Null,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<LocationKey>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// The primary key, when present and textual
    pub fn primary_key(&self) -> Option<&str> {
        self.keys.first().and_then(|k| k.as_text())
    }
}

/// In-memory content catalog for one build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// All resolvable locations
    pub entries: Vec<CatalogEntry>,
    /// Provider ids referenced by the entries, in registration order
    pub provider_ids: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, returning its slot
    pub fn push(&mut self, entry: CatalogEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Register a provider id once, preserving first-seen order
    pub fn register_provider(&mut self, provider_id: &str) {
        if !self.provider_ids.iter().any(|p| p == provider_id) {
            self.provider_ids.push(provider_id.to_string());
        }
    }

    /// Linear scan for the entry with the given primary key.
    ///
    /// Build stages that need repeated lookups go through `CatalogIndex`
    /// instead.
    pub fn find_by_primary_key(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.primary_key() == Some(key))
    }
}
