//! Primary-key remapping over the in-memory catalog
//!
//! Bundle filenames are renamed during post-processing, and every entry that
//! depends on a renamed bundle must keep referring to its current primary
//! key. `CatalogIndex` makes that retargeting proportional to the number of
//! dependers of a key rather than to catalog size.
//!
//! The index is build-scoped: constructed fresh at the start of catalog
//! post-processing and discarded with the build context. It is never cached
//! across builds.

use std::collections::HashMap;

use crate::domain::entities::{Catalog, CatalogEntry, LocationKey};
use crate::error::{PackError, PackResult};

/// Key→entry and key→dependers indices over one build's catalog
#[derive(Debug, Default)]
pub struct CatalogIndex {
    /// Primary key → slot in `catalog.entries`
    key_to_entry: HashMap<String, usize>,
    /// Primary key → slots of entries whose dependency list holds that key
    key_to_dependers: HashMap<String, Vec<usize>>,
}

impl CatalogIndex {
    /// Index a catalog. On duplicate primary keys the first entry wins, as
    /// later lookups during post-processing expect.
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = CatalogIndex::default();
        for (slot, entry) in catalog.entries.iter().enumerate() {
            if let Some(key) = entry.primary_key() {
                index.key_to_entry.entry(key.to_string()).or_insert(slot);
            }
            for dep in &entry.dependencies {
                // Only string keys participate in remapping
                if let Some(key) = dep.as_text() {
                    index
                        .key_to_dependers
                        .entry(key.to_string())
                        .or_default()
                        .push(slot);
                }
            }
        }
        index
    }

    /// Slot of the entry owning a primary key
    pub fn entry_slot(&self, key: &str) -> Option<usize> {
        self.key_to_entry.get(key).copied()
    }

    /// Number of entries whose dependency list currently holds this key
    pub fn depender_count(&self, key: &str) -> usize {
        self.key_to_dependers.get(key).map_or(0, Vec::len)
    }

    /// Append a new entry to the catalog and index its primary key
    pub fn insert_entry(&mut self, catalog: &mut Catalog, entry: CatalogEntry) -> usize {
        let primary = entry.primary_key().map(str::to_string);
        let slot = catalog.push(entry);
        if let Some(key) = primary {
            self.key_to_entry.entry(key).or_insert(slot);
        }
        slot
    }

    /// Replace one entry's dependency on `old_dep` with `new_dep`, keeping the
    /// depender indices consistent. Only the first exact match is replaced;
    /// other dependers of `old_dep` are untouched.
    pub fn retarget(
        &mut self,
        catalog: &mut Catalog,
        depender_key: &str,
        old_dep: &str,
        new_dep: &str,
    ) -> PackResult<()> {
        if old_dep == new_dep {
            return Ok(());
        }
        let slot = self
            .key_to_entry
            .get(depender_key)
            .copied()
            .ok_or_else(|| PackError::UnknownBundle {
                bundle: depender_key.to_string(),
            })?;

        let depender = &mut catalog.entries[slot];
        let Some(dep) = depender
            .dependencies
            .iter_mut()
            .find(|d| d.as_text() == Some(old_dep))
        else {
            return Err(PackError::UnknownBundle {
                bundle: old_dep.to_string(),
            });
        };
        *dep = LocationKey::Text(new_dep.to_string());

        if let Some(dependers) = self.key_to_dependers.get_mut(old_dep) {
            if let Some(pos) = dependers.iter().position(|&s| s == slot) {
                dependers.remove(pos);
            }
            if dependers.is_empty() {
                self.key_to_dependers.remove(old_dep);
            }
        }
        self.key_to_dependers
            .entry(new_dep.to_string())
            .or_default()
            .push(slot);
        Ok(())
    }

    /// Rename primary key `old_key` to `new_key` as one atomic transaction.
    ///
    /// Updates the entry's `keys[0]`, moves its index slot, and replaces the
    /// first exact string match of `old_key` in every depender's dependency
    /// list. Between transactions no dangling references exist.
    ///
    /// # Panics
    ///
    /// Panics when the located entry has no keys or a non-text/empty primary
    /// key. Every other lookup in the catalog depends on this index being
    /// valid, so that state is a programmer error, not a build failure.
    pub fn rename(
        &mut self,
        catalog: &mut Catalog,
        old_key: &str,
        new_key: &str,
    ) -> PackResult<()> {
        if old_key == new_key {
            return Ok(());
        }
        let slot = self
            .key_to_entry
            .get(old_key)
            .copied()
            .ok_or_else(|| PackError::UnknownBundle {
                bundle: old_key.to_string(),
            })?;

        {
            let entry = &mut catalog.entries[slot];
            assert!(
                !entry.keys.is_empty(),
                "corrupt catalog index: entry for '{old_key}' has no keys"
            );
            match entry.keys[0].as_text() {
                Some(k) if !k.is_empty() => {}
                _ => panic!("corrupt catalog index: entry for '{old_key}' has an invalid primary key"),
            }
            entry.keys[0] = LocationKey::Text(new_key.to_string());
        }

        self.key_to_entry.remove(old_key);
        assert!(
            self.key_to_entry
                .insert(new_key.to_string(), slot)
                .is_none(),
            "corrupt catalog index: primary key '{new_key}' already present"
        );

        let Some(dependers) = self.key_to_dependers.remove(old_key) else {
            return Ok(()); // nothing depends on it
        };
        for &depender_slot in &dependers {
            let depender = &mut catalog.entries[depender_slot];
            for dep in depender.dependencies.iter_mut() {
                if dep.as_text() == Some(old_key) {
                    *dep = LocationKey::Text(new_key.to_string());
                    break;
                }
            }
        }
        self.key_to_dependers.insert(new_key.to_string(), dependers);
        Ok(())
    }
}
