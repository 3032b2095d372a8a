//! Content-state diff engine for content-update builds
//!
//! Given the snapshot persisted by the last state-saving build and the states
//! computed this build, the differ reverts every unchanged asset of a static
//! content group back onto the bundle it shipped in. Reverting happens before
//! final bundle naming, so fresh bundles that lose all of their dependers are
//! simply never published.

use std::collections::BTreeMap;

use crate::domain::entities::{CachedAssetState, Catalog, CatalogEntry, ContentState};
use crate::domain::services::catalog_builder::BUNDLE_PROVIDER;
use crate::domain::services::key_remapper::CatalogIndex;
use crate::domain::services::namer::FinalNameAllocator;
use crate::error::PackResult;

/// Everything the differ needs to know about one asset of the current build
#[derive(Debug, Clone)]
pub struct DiffCandidate {
    /// Current primary key of the asset's catalog entry
    pub address: String,
    /// State computed this build; the bundle assignment is still the raw name
    pub state: CachedAssetState,
    /// Raw build-time name of the bundle the asset was packed into
    pub raw_bundle: String,
    /// Expanded load path of the asset's group
    pub load_path: String,
}

/// What a diff pass did to the build
#[derive(Debug, Default)]
pub struct DiffOutcome {
    /// Records carried forward unmodified, keyed by guid
    pub reverted: BTreeMap<String, CachedAssetState>,
    /// Published names of previous-build bundles now referenced again
    pub carried_bundles: Vec<String>,
    /// Non-fatal notes (records that could not be honored)
    pub warnings: Vec<String>,
}

/// Pure diff service
pub struct ContentDiffer;

impl ContentDiffer {
    /// Revert unchanged candidates onto their previously recorded bundles.
    ///
    /// `candidates` holds the assets eligible for reverting (members of static
    /// content groups), keyed by guid. For each one whose content, including
    /// dependency hashes, matches the previous record, the asset's bundle
    /// dependency is retargeted from its fresh raw bundle to the previous
    /// build's published bundle, a carried-over location is created for that
    /// bundle when absent, and the published name is reserved so fresh names
    /// cannot collide with it.
    pub fn apply(
        previous: &ContentState,
        candidates: &BTreeMap<String, DiffCandidate>,
        catalog: &mut Catalog,
        index: &mut CatalogIndex,
        allocator: &mut FinalNameAllocator,
    ) -> PackResult<DiffOutcome> {
        let mut outcome = DiffOutcome::default();
        for (guid, candidate) in candidates {
            let Some(prior) = previous.get(guid) else {
                continue; // new asset
            };
            if !candidate.state.content_matches(prior) {
                continue; // changed asset keeps its fresh bundle
            }
            let Some(prior_bundle) = bundle_file_name(&prior.bundle_file_id) else {
                outcome.warnings.push(format!(
                    "snapshot record for '{}' has no bundle location; rebuilt in place",
                    candidate.address
                ));
                continue;
            };

            if index.entry_slot(prior_bundle).is_none() {
                let location = CatalogEntry::new(
                    vec![prior_bundle.into()],
                    format!("{}/{prior_bundle}", candidate.load_path),
                    BUNDLE_PROVIDER,
                );
                index.insert_entry(catalog, location);
                allocator.reserve(prior_bundle);
                outcome.carried_bundles.push(prior_bundle.to_string());
            }

            index.retarget(
                catalog,
                &candidate.address,
                &candidate.raw_bundle,
                prior_bundle,
            )?;
            outcome.reverted.insert(guid.clone(), prior.clone());
        }
        Ok(outcome)
    }

    /// Keys of freshly built bundle locations that no asset references after a
    /// diff pass, in catalog order. Their bundles are never published.
    pub fn orphaned_bundles(catalog: &Catalog, index: &CatalogIndex, raw_names: &[String]) -> Vec<String> {
        catalog
            .entries
            .iter()
            .filter_map(CatalogEntry::primary_key)
            .filter(|key| raw_names.iter().any(|raw| raw == key))
            .filter(|key| index.depender_count(key) == 0)
            .map(str::to_string)
            .collect()
    }
}

/// Final path segment of a recorded bundle location, if any
fn bundle_file_name(bundle_file_id: &str) -> Option<&str> {
    let normalized = bundle_file_id.trim_end_matches(['/', '\\']);
    if normalized.is_empty() {
        return None;
    }
    normalized
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
}
