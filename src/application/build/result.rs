//! Build Result
//!
//! Result types for build operations.

use std::path::PathBuf;
use std::time::Duration;

/// One freshly built bundle, as published
#[derive(Debug, Clone, PartialEq)]
pub struct BundleOutcome {
    /// Name of the group the bundle was packed from
    pub group: String,
    /// Published filename
    pub final_name: String,
    /// Destination the bundle file was placed at
    pub published_path: PathBuf,
    /// Content hash reported by the engine
    pub hash: String,
    /// CRC32 reported by the engine
    pub crc: u32,
}

/// Outcome of one build pipeline run
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Groups walked, including player-data and excluded groups
    pub groups_processed: usize,
    /// Freshly built bundles that were published
    pub bundles_built: usize,
    /// Previous-build bundles referenced again after the diff pass
    pub bundles_carried: usize,
    /// Freshly built bundles dropped because every asset reverted off them
    pub bundles_skipped: usize,
    /// Locations in the serialized catalog
    pub locations: usize,
    /// Assets reverted onto their previous bundle
    pub assets_reverted: usize,
    /// One record per freshly built bundle, in finalization order
    pub bundles: Vec<BundleOutcome>,
    /// Wall-clock time of the whole pipeline run
    pub duration: Duration,
    /// Non-fatal notes accumulated across all stages
    pub warnings: Vec<String>,
    /// Path of the written catalog, absent on dry runs
    pub catalog_path: Option<PathBuf>,
    /// Path of the written snapshot, absent on dry runs and update builds
    pub content_state_path: Option<PathBuf>,
    /// Whether publication was skipped
    pub dry_run: bool,
}

impl BuildReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            groups_processed: 0,
            bundles_built: 0,
            bundles_carried: 0,
            bundles_skipped: 0,
            locations: 0,
            assets_reverted: 0,
            bundles: Vec::new(),
            duration: Duration::ZERO,
            warnings: Vec::new(),
            catalog_path: None,
            content_state_path: None,
            dry_run,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Default for BuildReport {
    fn default() -> Self {
        Self::new(false)
    }
}
