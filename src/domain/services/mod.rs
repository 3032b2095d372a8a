//! Pure build services
//!
//! Each service is side-effect free: inputs in, catalog mutations or values
//! out. File and engine I/O stay behind the ports.

pub mod catalog_builder;
pub mod differ;
pub mod key_remapper;
pub mod namer;
pub mod packer;

pub use catalog_builder::CatalogBuilder;
pub use differ::{ContentDiffer, DiffCandidate, DiffOutcome};
pub use key_remapper::CatalogIndex;
pub use namer::{BundleNamer, FinalNameAllocator};
pub use packer::{PackedGroup, Packer};
