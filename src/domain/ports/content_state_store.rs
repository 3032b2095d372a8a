//! ContentStateStore port - abstraction for snapshot persistence
//!
//! This trait allows the domain layer to load/save content-state snapshots
//! without knowing the byte-level codec. A load failure is recoverable by
//! design: the caller falls back to a full build.

use std::path::Path;

use crate::domain::entities::ContentState;

/// Result type for snapshot operations
pub type StateResult<T> = Result<T, StateError>;

/// Snapshot operation errors
#[derive(Debug)]
pub enum StateError {
    /// No snapshot at the given path
    NotFound,
    /// Snapshot exists but could not be decoded
    InvalidFormat(String),
    /// Snapshot format version not understood by this tool
    VersionMismatch { found: u32, expected: u32 },
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::NotFound => write!(f, "content state not found"),
            StateError::InvalidFormat(msg) => write!(f, "invalid content state: {}", msg),
            StateError::VersionMismatch { found, expected } => write!(
                f,
                "content state version {} not supported (expected {})",
                found, expected
            ),
            StateError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for StateError {}

/// Abstract store for the cross-build content-state snapshot
pub trait ContentStateStore {
    /// Load a snapshot from path
    fn load(&self, path: &Path) -> StateResult<ContentState>;

    /// Save a snapshot to path, replacing any existing file
    fn save(&self, state: &ContentState, path: &Path) -> StateResult<()>;
}
