//! BuildEngine port - abstraction over the external bundle build engine
//!
//! The engine consumes bundle build definitions and produces one physical
//! file plus hash/crc/dependency metadata per bundle. The core never
//! compresses or archives anything itself.

use std::path::Path;

use crate::domain::entities::{BuildEngineResults, BundleBuildDefinition};
use crate::error::PackResult;

/// External build engine boundary
///
/// Implementations must be deterministic: identical definitions over
/// identical asset content must produce byte-identical bundles and equal
/// metadata. The whole incremental scheme rests on that.
pub trait BuildEngine {
    /// Build every definition into `staging`, returning per-raw-bundle
    /// metadata keyed by the definition's bundle name.
    ///
    /// A failure aborts the build; partial results are discarded.
    fn build_bundles(
        &self,
        definitions: &[BundleBuildDefinition],
        staging: &Path,
    ) -> PackResult<BuildEngineResults>;
}
