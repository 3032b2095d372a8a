//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod build_engine;
pub mod catalog_serializer;
pub mod content_state_store;

pub use build_engine::BuildEngine;
pub use catalog_serializer::{validate_catalog_args, CatalogSerializer};
pub use content_state_store::{ContentStateStore, StateError, StateResult};
