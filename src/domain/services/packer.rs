//! Bundle packing service
//!
//! Pure domain logic turning one group's entries into bundle build
//! definitions according to the group's packing mode. No I/O; the external
//! build engine consumes the definitions later.

use std::collections::BTreeMap;

use crate::domain::entities::{
    AssetEntry, AssetGroup, AssetKind, BundleBuildDefinition, BundleIdMode, BundledSchema,
    PackingMode,
};
use crate::domain::value_objects::ContentHash;
use crate::error::{PackError, PackResult};

/// Result of packing one group
#[derive(Debug, Clone, Default)]
pub struct PackedGroup {
    /// Bundle definitions produced for the group, in deterministic order
    pub definitions: Vec<BundleBuildDefinition>,
    /// Full recursive set of leaf entries consumed by the definitions
    pub entries: Vec<AssetEntry>,
    /// Leaf guid → index into `definitions` for the bundle it landed in
    pub assignments: BTreeMap<String, usize>,
    /// Non-fatal notes (unsupported entries dropped under tolerant settings)
    pub warnings: Vec<String>,
}

/// Pure packing service
pub struct Packer;

impl Packer {
    /// Pack a group into bundle build definitions.
    ///
    /// `project_id` feeds the bundle-name seed for the project-scoped id
    /// modes. `ignore_unsupported` downgrades unresolvable asset kinds from
    /// fatal to dropped-with-warning.
    pub fn pack_group(
        group: &AssetGroup,
        schema: &BundledSchema,
        project_id: &str,
        ignore_unsupported: bool,
    ) -> PackResult<PackedGroup> {
        let mut packed = PackedGroup::default();

        match schema.packing {
            PackingMode::Together => {
                let mut leaves = Vec::new();
                for entry in group.entries() {
                    entry.gather_leaves(&mut leaves);
                }
                let seed = group_seed(schema.id_mode, group, project_id, &leaves);
                push_definitions(&mut packed, &leaves, &seed, "all", ignore_unsupported)?;
            }
            PackingMode::Separately => {
                for entry in group.entries() {
                    let mut leaves = Vec::new();
                    entry.gather_leaves(&mut leaves);
                    let seed = group_seed(schema.id_mode, group, project_id, &leaves);
                    push_definitions(
                        &mut packed,
                        &leaves,
                        &seed,
                        entry.address(),
                        ignore_unsupported,
                    )?;
                }
            }
            PackingMode::TogetherByLabel => {
                // BTreeMap so buckets come out in a fixed label order
                let mut buckets: BTreeMap<String, Vec<&AssetEntry>> = BTreeMap::new();
                for entry in group.entries() {
                    buckets.entry(entry.label_key()).or_default().push(entry);
                }
                for (label_key, bucket) in &buckets {
                    let mut leaves = Vec::new();
                    for entry in bucket {
                        entry.gather_leaves(&mut leaves);
                    }
                    let seed = group_seed(schema.id_mode, group, project_id, &leaves);
                    push_definitions(&mut packed, &leaves, &seed, label_key, ignore_unsupported)?;
                }
            }
        }

        Ok(packed)
    }
}

/// Compute the bundle-name seed for a set of member leaves
fn group_seed(
    mode: BundleIdMode,
    group: &AssetGroup,
    project_id: &str,
    leaves: &[&AssetEntry],
) -> String {
    match mode {
        BundleIdMode::GroupGuid => group.guid().to_string(),
        BundleIdMode::GroupGuidProjectId => {
            ContentHash::from_parts([group.guid(), project_id]).short_hex().to_string()
        }
        BundleIdMode::GroupGuidProjectIdEntriesHash => {
            // Sorted guids: the seed must not depend on entry declaration order
            let mut guids: Vec<&str> = leaves.iter().map(|e| e.guid()).collect();
            guids.sort_unstable();
            guids.dedup();
            let mut parts = vec![group.guid(), project_id];
            parts.extend(guids);
            ContentHash::from_parts(parts).short_hex().to_string()
        }
    }
}

/// Split a bucket of leaves into an asset bundle and a scene bundle and
/// append the resulting definitions
fn push_definitions(
    packed: &mut PackedGroup,
    leaves: &[&AssetEntry],
    seed: &str,
    suffix: &str,
    ignore_unsupported: bool,
) -> PackResult<()> {
    let mut scenes: Vec<&AssetEntry> = Vec::new();
    let mut assets: Vec<&AssetEntry> = Vec::new();

    for entry in leaves {
        validate_address(entry)?;
        match entry.kind() {
            AssetKind::Unresolved => {
                if ignore_unsupported {
                    packed.warnings.push(format!(
                        "cannot recognize file type for entry located at '{}'; entry ignored",
                        entry.asset_path().display()
                    ));
                } else {
                    return Err(PackError::UnsupportedAsset {
                        path: entry.asset_path().to_path_buf(),
                    });
                }
            }
            AssetKind::Scene => scenes.push(entry),
            AssetKind::Standard => assets.push(entry),
            // Folders were expanded by gather_leaves
            AssetKind::Folder => {}
        }
    }

    if !assets.is_empty() {
        append_definition(packed, &assets, format!("{seed}_assets_{suffix}.bundle"));
    }
    if !scenes.is_empty() {
        append_definition(packed, &scenes, format!("{seed}_scenes_{suffix}.bundle"));
    }
    Ok(())
}

fn append_definition(packed: &mut PackedGroup, members: &[&AssetEntry], name: String) {
    let normalized = name
        .to_lowercase()
        .replace(' ', "")
        .replace('\\', "/")
        .replace("//", "/");
    let slot = packed.definitions.len();
    let mut def = BundleBuildDefinition::new(normalized);
    for entry in members {
        def.add_asset(entry.asset_path(), entry.address());
        packed.assignments.insert(entry.guid().to_string(), slot);
        packed.entries.push((*entry).clone());
    }
    packed.definitions.push(def);
}

fn validate_address(entry: &AssetEntry) -> PackResult<()> {
    // '[' and ']' are reserved for sub-asset templating syntax
    if entry.address().contains('[') || entry.address().contains(']') {
        return Err(PackError::InvalidAddress {
            address: entry.address().to_string(),
        });
    }
    Ok(())
}
