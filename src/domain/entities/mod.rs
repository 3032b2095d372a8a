//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `AssetEntry` / `AssetGroup` - long-lived editor state the build reads
//! - `Catalog` / `CatalogEntry` - per-build runtime lookup index
//! - `BundleBuildDefinition` - per-build packing output
//! - `ContentState` - the one artifact carried across builds

mod bundle;
mod catalog;
mod content_state;
mod entry;
mod group;
mod type_manifest;

pub use bundle::{BuildEngineResults, BundleBuildDefinition, BundleDetails, BundleRenameMap};
pub use catalog::{Catalog, CatalogEntry, LocationKey};
pub use content_state::{AssetState, CachedAssetState, ContentState};
pub use entry::{AssetEntry, AssetKind};
pub use group::{
    AssetGroup, BundleIdMode, BundledSchema, GroupSchema, NamingStyle, PackingMode,
};
pub use type_manifest::TypeManifest;
