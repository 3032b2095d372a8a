//! Infrastructure Layer
//!
//! Concrete implementations of the domain ports.

mod archive_engine;
mod catalog_json;
mod state_store;

pub use archive_engine::ArchiveEngine;
pub use catalog_json::JsonCatalogSerializer;
pub use state_store::JsonContentStateStore;
