//! Build use case
//!
//! The orchestration layer of the pipeline: packs groups, runs the engine,
//! diffs against a previous snapshot and publishes the outputs.

mod context;
mod options;
mod result;
#[cfg(test)]
mod tests;
mod use_case;

pub use context::BuildContext;
pub use options::BuildOptions;
pub use result::{BuildReport, BundleOutcome};
pub use use_case::{
    BuildPipeline, CATALOG_FILE_STEM, CONTENT_STATE_FILE_NAME, SETTINGS_FILE_NAME,
    TYPE_MANIFEST_FILE_NAME,
};
