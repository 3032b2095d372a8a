//! CatalogSerializer port - pluggable catalog codec
//!
//! The in-memory catalog is handed to an external serializer at the end of a
//! successful build; the byte-level format (JSON, binary) is not the core's
//! concern.

use crate::domain::entities::Catalog;
use crate::error::{PackError, PackResult};

/// Catalog codec boundary
pub trait CatalogSerializer {
    /// Serialize the catalog to bytes
    fn serialize(&self, catalog: &Catalog) -> PackResult<Vec<u8>>;

    /// File extension the serialized form should carry (without dot)
    fn extension(&self) -> &'static str;
}

/// Validate serializer arguments before use; empty filenames and an empty
/// catalog with no providers are caller bugs surfaced as errors
pub fn validate_catalog_args(catalog: &Catalog, file_name: &str) -> PackResult<()> {
    if file_name.is_empty() {
        return Err(PackError::InvalidCatalogArgs {
            message: "catalog file name is empty".to_string(),
        });
    }
    if catalog.is_empty() && catalog.provider_ids.is_empty() {
        return Err(PackError::InvalidCatalogArgs {
            message: "catalog has no locations and no providers".to_string(),
        });
    }
    Ok(())
}
