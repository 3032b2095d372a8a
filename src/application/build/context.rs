//! Build Context
//!
//! Working state owned by one build run. Created at the start of the pipeline
//! and dropped with it; nothing in here survives across builds, which is what
//! keeps repeated builds in one process deterministic.

use std::collections::{BTreeMap, HashSet};

use crate::domain::entities::{BundleRenameMap, Catalog, TypeManifest};

/// Mutable state threaded through every pipeline stage
#[derive(Debug, Default)]
pub struct BuildContext {
    /// The catalog under construction
    pub catalog: Catalog,
    /// Raw→final bundle name pairs recorded during final naming
    pub rename_map: BundleRenameMap,
    /// Runtime types referenced by generated provider data
    pub type_manifest: TypeManifest,
    /// Logical bundle names handed out so far, across all groups
    pub handled_names: HashSet<String>,
    /// Leaf asset guid → raw name of the bundle it was packed into
    pub guid_to_bundle: BTreeMap<String, String>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }
}
