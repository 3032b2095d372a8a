//! Runtime type manifest
//!
//! Enumerates every runtime type referenced by generated provider data so an
//! external stripping tool can whitelist them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Whitelist of runtime types referenced by the build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeManifest {
    types: BTreeSet<String>,
}

impl TypeManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, type_name: impl Into<String>) {
        self.types.insert(type_name.into());
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
