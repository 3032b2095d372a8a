//! Error types for assetpack
//!
//! Uses `thiserror` for library errors. Every expected failure path returns a
//! `PackResult`; panics are reserved for corrupt internal index state (see
//! `CatalogIndex::rename`).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for assetpack operations
pub type PackResult<T> = Result<T, PackError>;

/// Main error type for assetpack operations
#[derive(Error, Debug)]
pub enum PackError {
    /// An address uses the reserved templating characters `[` and `]`
    #[error("address '{address}' cannot contain '[ ]'")]
    InvalidAddress { address: String },

    /// An entry's asset kind could not be resolved and the build is not
    /// configured to tolerate it
    #[error("cannot recognize file type for entry located at '{path}'")]
    UnsupportedAsset { path: PathBuf },

    /// A bundle name could not be resolved to a catalog entry during key
    /// propagation
    #[error("unable to find catalog entry for bundle '{bundle}'")]
    UnknownBundle { bundle: String },

    /// A bundled group schema has no build path configured
    #[error("group '{group}' has no build path configured")]
    MissingBuildPath { group: String },

    /// The external build engine signaled a failure
    #[error("build engine error: {message}")]
    Engine { message: String },

    /// The content-state snapshot could not be persisted
    #[error("content state snapshot error: {message}")]
    Snapshot { message: String },

    /// A bundle name collision could not be resolved within the retry bound
    #[error("unable to resolve a unique name for bundle '{name}'")]
    NameCollision { name: String },

    /// Catalog serialization was invoked with null/empty arguments
    #[error("invalid catalog arguments: {message}")]
    InvalidCatalogArgs { message: String },

    /// Project manifest error
    #[error("config error in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
