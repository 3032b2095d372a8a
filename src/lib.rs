//! assetpack - addressable asset bundle compiler
//!
//! Compiles addressable asset groups into content bundles, a runtime catalog
//! mapping keys to resolved locations, and a content-state snapshot that lets
//! later builds ship only what changed.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{BuildOptions, BuildPipeline, BuildReport};
pub use config::ProjectManifest;
pub use error::{PackError, PackResult};
pub use infrastructure::{ArchiveEngine, JsonCatalogSerializer, JsonContentStateStore};
