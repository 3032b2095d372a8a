//! Build Options
//!
//! Configuration types for build operations.

use std::path::PathBuf;

/// Options for the build pipeline
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Project display name, recorded in the settings document
    pub project_name: String,
    /// Stable project identifier, folded into bundle-name seeds
    pub project_id: String,
    /// Player/content version recorded in the snapshot
    pub player_version: String,
    /// Directory receiving the catalog, settings, manifest and snapshot
    pub output_dir: PathBuf,
    /// Snapshot of the last state-saving build; when set the build runs as a
    /// content update and no new snapshot is written
    pub previous_state: Option<PathBuf>,
    /// Drop entries whose asset kind cannot be resolved instead of failing
    pub ignore_unsupported_files: bool,
    /// Also publish the catalog to `remote_catalog_build_path`
    pub build_remote_catalog: bool,
    /// Where the remote copy of the catalog is written
    pub remote_catalog_build_path: String,
    /// Load path clients use for the remote catalog, recorded in the snapshot
    pub remote_catalog_load_path: String,
    /// Stage and compute everything but publish nothing
    pub dry_run: bool,
}

impl BuildOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_name: String::new(),
            project_id: String::new(),
            player_version: "1.0".to_string(),
            output_dir: output_dir.into(),
            previous_state: None,
            ignore_unsupported_files: false,
            build_remote_catalog: false,
            remote_catalog_build_path: String::new(),
            remote_catalog_load_path: String::new(),
            dry_run: false,
        }
    }

    pub fn with_project(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.project_name = name.into();
        self.project_id = id.into();
        self
    }

    pub fn with_player_version(mut self, version: impl Into<String>) -> Self {
        self.player_version = version.into();
        self
    }

    pub fn with_previous_state(mut self, path: impl Into<PathBuf>) -> Self {
        self.previous_state = Some(path.into());
        self
    }

    pub fn with_ignore_unsupported_files(mut self, ignore: bool) -> Self {
        self.ignore_unsupported_files = ignore;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Directory the engine stages raw bundles into
    pub fn staging_dir(&self) -> PathBuf {
        self.output_dir.join(".staging")
    }
}
