//! JSON catalog serializer

use crate::domain::entities::Catalog;
use crate::domain::ports::CatalogSerializer;
use crate::error::PackResult;

/// Serializes the catalog as pretty-printed JSON
pub struct JsonCatalogSerializer;

impl JsonCatalogSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonCatalogSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSerializer for JsonCatalogSerializer {
    fn serialize(&self, catalog: &Catalog) -> PackResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(catalog)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
