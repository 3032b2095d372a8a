//! JSON content-state store
//!
//! Persists the cross-build snapshot as pretty-printed JSON. Load failures
//! are typed so the caller can fall back to a full build instead of aborting.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::domain::entities::ContentState;
use crate::domain::ports::{ContentStateStore, StateError, StateResult};

/// Snapshot store backed by a JSON file
pub struct JsonContentStateStore;

impl JsonContentStateStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonContentStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStateStore for JsonContentStateStore {
    fn load(&self, path: &Path) -> StateResult<ContentState> {
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StateError::NotFound,
            _ => StateError::Io(err),
        })?;
        let state: ContentState = serde_json::from_slice(&bytes)
            .map_err(|err| StateError::InvalidFormat(err.to_string()))?;
        if state.version != ContentState::VERSION {
            return Err(StateError::VersionMismatch {
                found: state.version,
                expected: ContentState::VERSION,
            });
        }
        Ok(state)
    }

    fn save(&self, state: &ContentState, path: &Path) -> StateResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StateError::Io)?;
        }
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|err| StateError::InvalidFormat(err.to_string()))?;
        fs::write(path, bytes).map_err(StateError::Io)
    }
}
