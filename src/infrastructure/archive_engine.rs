//! Archive build engine
//!
//! A deterministic `BuildEngine` that packs each definition's assets into a
//! flat length-delimited archive. Identical definitions over identical asset
//! bytes produce byte-identical archives, equal hashes and equal CRCs, which
//! is what the incremental scheme requires of any engine implementation.

use std::fs;
use std::path::Path;

use crate::domain::entities::{BuildEngineResults, BundleBuildDefinition, BundleDetails};
use crate::domain::ports::BuildEngine;
use crate::domain::value_objects::ContentHash;
use crate::error::{PackError, PackResult};

const MAGIC: &[u8] = b"APAK1";

/// Deterministic flat-archive engine
pub struct ArchiveEngine;

impl ArchiveEngine {
    pub fn new() -> Self {
        Self
    }

    fn archive_definition(&self, definition: &BundleBuildDefinition) -> PackResult<Vec<u8>> {
        let mut bytes = Vec::from(MAGIC);
        for (path, addressable) in definition
            .asset_paths
            .iter()
            .zip(&definition.addressable_names)
        {
            let content = fs::read(path).map_err(|err| PackError::Engine {
                message: format!("cannot read asset '{}': {err}", path.display()),
            })?;
            append_chunk(&mut bytes, addressable.as_bytes());
            append_chunk(&mut bytes, &content);
        }
        Ok(bytes)
    }
}

impl Default for ArchiveEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn append_chunk(out: &mut Vec<u8>, chunk: &[u8]) {
    out.extend_from_slice(&(chunk.len() as u64).to_le_bytes());
    out.extend_from_slice(chunk);
}

impl BuildEngine for ArchiveEngine {
    fn build_bundles(
        &self,
        definitions: &[BundleBuildDefinition],
        staging: &Path,
    ) -> PackResult<BuildEngineResults> {
        fs::create_dir_all(staging)?;
        let mut results = BuildEngineResults::new();
        for definition in definitions {
            let bytes = self.archive_definition(definition)?;
            let file_name = staging.join(&definition.bundle_name);
            fs::write(&file_name, &bytes)?;
            results.insert(
                definition.bundle_name.clone(),
                BundleDetails {
                    hash: ContentHash::from_bytes(&bytes).short_hex().to_string(),
                    crc: crc32fast::hash(&bytes),
                    file_name,
                    dependencies: definition.dependencies.clone(),
                    size: bytes.len() as u64,
                },
            );
        }
        Ok(results)
    }
}
