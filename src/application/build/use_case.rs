//! Build Use Case
//!
//! Orchestrates the full build flow:
//! 1. Pack groups into bundle build definitions (deterministic group order)
//! 2. Assign unique raw bundle names
//! 3. Resolve inter-bundle dependencies
//! 4. Invoke the external build engine
//! 5. Diff against a previous snapshot (content-update builds)
//! 6. Allocate final names and finalize catalog locations
//! 7. Publish bundles, catalog, settings, type manifest and snapshot
//!
//! All business logic lives in the domain services; this use case only wires
//! the stages together. Everything is computed before anything is published,
//! so a failing stage leaves the output directory untouched.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::domain::entities::{
    AssetGroup, AssetKind, AssetState, BundleBuildDefinition, BundledSchema, CachedAssetState,
    ContentState, GroupSchema,
};
use crate::domain::ports::{
    validate_catalog_args, BuildEngine, CatalogSerializer, ContentStateStore,
};
use crate::domain::services::{
    BundleNamer, CatalogBuilder, CatalogIndex, ContentDiffer, DiffCandidate, FinalNameAllocator,
    PackedGroup, Packer,
};
use crate::domain::value_objects::ContentHash;
use crate::error::{PackError, PackResult};

use super::context::BuildContext;
use super::options::BuildOptions;
use super::result::{BuildReport, BundleOutcome};

/// Stem of the catalog file; the serializer supplies the extension
pub const CATALOG_FILE_STEM: &str = "catalog";
/// Settings document written next to the catalog
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Runtime type manifest written next to the catalog
pub const TYPE_MANIFEST_FILE_NAME: &str = "types.json";
/// The cross-build content-state snapshot
pub const CONTENT_STATE_FILE_NAME: &str = "assetpack_content_state.json";

/// Per-group working set carried between pipeline stages
struct GroupBuild<'a> {
    group: &'a AssetGroup,
    schema: &'a BundledSchema,
    packed: PackedGroup,
    logical_names: Vec<String>,
    load_path: String,
}

/// One bundle file to place into its group's build path
struct Publication {
    source: PathBuf,
    dest: PathBuf,
}

/// Build pipeline, parameterized by its ports
pub struct BuildPipeline<E, S, C>
where
    E: BuildEngine,
    S: ContentStateStore,
    C: CatalogSerializer,
{
    engine: E,
    state_store: S,
    catalog_serializer: C,
}

impl<E, S, C> BuildPipeline<E, S, C>
where
    E: BuildEngine,
    S: ContentStateStore,
    C: CatalogSerializer,
{
    pub fn new(engine: E, state_store: S, catalog_serializer: C) -> Self {
        Self {
            engine,
            state_store,
            catalog_serializer,
        }
    }

    /// Execute the build pipeline over the given groups
    pub fn execute(&self, groups: &[AssetGroup], options: &BuildOptions) -> PackResult<BuildReport> {
        let started = Instant::now();
        let mut report = BuildReport::new(options.dry_run);
        let mut ctx = BuildContext::new();

        // Dry runs stage into a throwaway directory so the output directory
        // stays untouched; the guard removes it on drop
        let _staging_guard;
        let staging_dir = if options.dry_run {
            let dir = tempfile::tempdir()?;
            let path = dir.path().to_path_buf();
            _staging_guard = Some(dir);
            path
        } else {
            _staging_guard = None;
            options.staging_dir()
        };

        // Group order is sorted by guid so the same project always builds the
        // same way regardless of manifest order
        let mut ordered: Vec<&AssetGroup> = groups.iter().collect();
        ordered.sort_by(|a, b| a.guid().cmp(b.guid()));

        let mut builds = self.pack_groups(&ordered, options, &mut ctx, &mut report)?;
        self.resolve_bundle_dependencies(&mut builds, &ctx, &mut report);

        for gb in &builds {
            CatalogBuilder::add_group_locations(&mut ctx.catalog, &gb.packed, &gb.load_path)?;
        }

        let all_definitions: Vec<BundleBuildDefinition> = builds
            .iter()
            .flat_map(|gb| gb.packed.definitions.iter().cloned())
            .collect();
        let results = if all_definitions.is_empty() {
            Default::default()
        } else {
            self.engine.build_bundles(&all_definitions, &staging_dir)?
        };

        let mut asset_states = compute_asset_states(&builds, &mut report);

        let mut index = CatalogIndex::build(&ctx.catalog);
        let mut allocator = FinalNameAllocator::new();
        let mut reverted: BTreeMap<String, CachedAssetState> = BTreeMap::new();
        let mut consumed_previous = false;

        if let Some(prev_path) = &options.previous_state {
            match self.state_store.load(prev_path) {
                Ok(previous) => {
                    consumed_previous = true;
                    let candidates = diff_candidates(&builds, &ctx, &asset_states);
                    let outcome = ContentDiffer::apply(
                        &previous,
                        &candidates,
                        &mut ctx.catalog,
                        &mut index,
                        &mut allocator,
                    )?;
                    report.assets_reverted = outcome.reverted.len();
                    report.bundles_carried = outcome.carried_bundles.len();
                    report.warnings.extend(outcome.warnings);
                    reverted = outcome.reverted;
                }
                Err(err) => {
                    report.warnings.push(format!(
                        "previous content state unusable ({err}); performing a full build"
                    ));
                }
            }
        }

        let raw_names: Vec<String> = all_definitions
            .iter()
            .map(|d| d.bundle_name.clone())
            .collect();
        let orphaned: HashSet<String> = if reverted.is_empty() {
            HashSet::new()
        } else {
            ContentDiffer::orphaned_bundles(&ctx.catalog, &index, &raw_names)
                .into_iter()
                .collect()
        };

        // Final naming, in the same deterministic order as packing
        let mut publications = Vec::new();
        for gb in &builds {
            for (def, logical) in gb.packed.definitions.iter().zip(&gb.logical_names) {
                let raw = def.bundle_name.as_str();
                if orphaned.contains(raw) {
                    report.bundles_skipped += 1;
                    continue;
                }
                let details = results.get(raw).ok_or_else(|| PackError::Engine {
                    message: format!("engine returned no result for bundle '{raw}'"),
                })?;
                let final_name = CatalogBuilder::finalize_bundle_location(
                    &mut ctx.catalog,
                    &mut index,
                    &mut allocator,
                    &mut ctx.rename_map,
                    gb.group,
                    gb.schema,
                    raw,
                    logical,
                    details,
                    &gb.load_path,
                )?;
                let dest = Path::new(&gb.schema.build_path).join(&final_name);
                report.bundles.push(BundleOutcome {
                    group: gb.group.name().to_string(),
                    final_name: final_name.clone(),
                    published_path: dest.clone(),
                    hash: details.hash.clone(),
                    crc: details.crc,
                });
                publications.push(Publication {
                    source: details.file_name.clone(),
                    dest,
                });
                report.bundles_built += 1;
            }
        }
        drop(index); // entry slots become stale once orphans are removed

        if !orphaned.is_empty() {
            ctx.catalog
                .entries
                .retain(|e| e.primary_key().is_none_or(|k| !orphaned.contains(k)));
        }
        report.locations = ctx.catalog.len();

        stamp_bundle_assignments(&mut asset_states, &reverted, &ctx);
        for provider in &ctx.catalog.provider_ids {
            ctx.type_manifest.add_type(provider.clone());
        }

        if options.dry_run {
            report.duration = started.elapsed();
            return Ok(report);
        }

        self.publish(
            &publications,
            &ctx,
            options,
            consumed_previous,
            &asset_states,
            &mut report,
        )?;

        if let Err(err) = fs::remove_dir_all(&staging_dir) {
            if err.kind() != std::io::ErrorKind::NotFound {
                report
                    .warnings
                    .push(format!("could not clean staging directory: {err}"));
            }
        }

        report.duration = started.elapsed();
        Ok(report)
    }

    /// Stage 1+2: pack every group and give its bundles unique raw names
    fn pack_groups<'a>(
        &self,
        ordered: &[&'a AssetGroup],
        options: &BuildOptions,
        ctx: &mut BuildContext,
        report: &mut BuildReport,
    ) -> PackResult<Vec<GroupBuild<'a>>> {
        let mut builds = Vec::new();
        for &group in ordered {
            report.groups_processed += 1;
            let Some(schema) = group.bundled_schema() else {
                if group
                    .schemas()
                    .iter()
                    .any(|s| matches!(s, GroupSchema::PlayerData))
                {
                    CatalogBuilder::add_player_data_locations(&mut ctx.catalog, group);
                }
                continue;
            };
            if !schema.include_in_build {
                continue;
            }
            if schema.build_path.is_empty() {
                return Err(PackError::MissingBuildPath {
                    group: group.name().to_string(),
                });
            }

            let mut packed = Packer::pack_group(
                group,
                schema,
                &options.project_id,
                options.ignore_unsupported_files,
            )?;
            report.warnings.append(&mut packed.warnings);
            let logical_names =
                BundleNamer::assign_unique_names(&mut packed.definitions, &mut ctx.handled_names)?;

            for entry in &packed.entries {
                ctx.type_manifest.add_type(kind_type_name(entry.kind()));
                if let Some(&def_index) = packed.assignments.get(entry.guid()) {
                    ctx.guid_to_bundle.insert(
                        entry.guid().to_string(),
                        packed.definitions[def_index].bundle_name.clone(),
                    );
                }
            }

            let load_path = if schema.load_path.is_empty() {
                schema.build_path.clone()
            } else {
                schema.load_path.clone()
            };
            builds.push(GroupBuild {
                group,
                schema,
                packed,
                logical_names,
                load_path: load_path.trim_end_matches('/').to_string(),
            });
        }
        Ok(builds)
    }

    /// Stage 3: derive inter-bundle dependencies from per-asset dependencies
    fn resolve_bundle_dependencies(
        &self,
        builds: &mut [GroupBuild<'_>],
        ctx: &BuildContext,
        report: &mut BuildReport,
    ) {
        for gb in builds {
            let mut dep_sets: Vec<BTreeSet<String>> = vec![BTreeSet::new(); gb.packed.definitions.len()];
            for entry in &gb.packed.entries {
                let Some(own_bundle) = ctx.guid_to_bundle.get(entry.guid()) else {
                    continue;
                };
                let Some(&def_index) = gb.packed.assignments.get(entry.guid()) else {
                    continue;
                };
                for dep_guid in entry.depends_on() {
                    match ctx.guid_to_bundle.get(dep_guid) {
                        Some(dep_bundle) if dep_bundle != own_bundle => {
                            dep_sets[def_index].insert(dep_bundle.clone());
                        }
                        Some(_) => {} // packed into the same bundle
                        None => report.warnings.push(format!(
                            "dependency '{dep_guid}' of '{}' is not addressable; ignored",
                            entry.address()
                        )),
                    }
                }
            }
            for (def, deps) in gb.packed.definitions.iter_mut().zip(dep_sets) {
                def.dependencies = deps.into_iter().collect();
            }
        }
    }

    /// Stage 7: place bundle files and write the catalog, settings, type
    /// manifest and (on full builds) the snapshot. Runs last; everything
    /// before this point only computes.
    fn publish(
        &self,
        publications: &[Publication],
        ctx: &BuildContext,
        options: &BuildOptions,
        consumed_previous: bool,
        asset_states: &BTreeMap<String, CachedAssetState>,
        report: &mut BuildReport,
    ) -> PackResult<()> {
        fs::create_dir_all(&options.output_dir)?;
        for publication in publications {
            if let Some(parent) = publication.dest.parent() {
                fs::create_dir_all(parent)?;
            }
            if needs_copy(&publication.source, &publication.dest) {
                fs::copy(&publication.source, &publication.dest)?;
            }
        }

        let catalog_file = format!("{CATALOG_FILE_STEM}.{}", self.catalog_serializer.extension());
        validate_catalog_args(&ctx.catalog, &catalog_file)?;
        let catalog_bytes = self.catalog_serializer.serialize(&ctx.catalog)?;
        let catalog_path = options.output_dir.join(&catalog_file);
        fs::write(&catalog_path, &catalog_bytes)?;
        report.catalog_path = Some(catalog_path);

        if options.build_remote_catalog {
            if options.remote_catalog_build_path.is_empty() {
                report
                    .warnings
                    .push("remote catalog requested but no remote build path configured".to_string());
            } else {
                let remote_dir = Path::new(&options.remote_catalog_build_path);
                fs::create_dir_all(remote_dir)?;
                fs::write(remote_dir.join(&catalog_file), &catalog_bytes)?;
            }
        }

        let settings = serde_json::json!({
            "projectName": options.project_name,
            "playerVersion": options.player_version,
            "builtAt": chrono::Utc::now().to_rfc3339(),
            "catalogPath": catalog_file,
            "remoteCatalogLoadPath": options.remote_catalog_load_path,
            "providerIds": ctx.catalog.provider_ids,
        });
        fs::write(
            options.output_dir.join(SETTINGS_FILE_NAME),
            serde_json::to_vec_pretty(&settings)?,
        )?;
        fs::write(
            options.output_dir.join(TYPE_MANIFEST_FILE_NAME),
            serde_json::to_vec_pretty(&ctx.type_manifest)?,
        )?;

        // A content-update build never moves the snapshot forward; only
        // state-saving (full) builds do
        if !consumed_previous {
            let mut snapshot = ContentState::new(&options.player_version)
                .with_remote_catalog_load_path(&options.remote_catalog_load_path);
            for state in asset_states.values() {
                snapshot.set(state.clone());
            }
            let state_path = options.output_dir.join(CONTENT_STATE_FILE_NAME);
            self.state_store
                .save(&snapshot, &state_path)
                .map_err(|err| PackError::Snapshot {
                    message: err.to_string(),
                })?;
            report.content_state_path = Some(state_path);
        }
        Ok(())
    }
}

/// Best-effort freshness check: the destination is considered current when
/// its size and modification time match the staged file exactly. Any
/// metadata failure means copy.
pub(super) fn needs_copy(source: &Path, dest: &Path) -> bool {
    let (Ok(src), Ok(dst)) = (fs::metadata(source), fs::metadata(dest)) else {
        return true;
    };
    if src.len() != dst.len() {
        return true;
    }
    match (src.modified(), dst.modified()) {
        (Ok(s), Ok(d)) => s != d,
        _ => true,
    }
}

/// Hash every packed asset and assemble its snapshot record; bundle
/// assignments are stamped after final naming
fn compute_asset_states(
    builds: &[GroupBuild<'_>],
    report: &mut BuildReport,
) -> BTreeMap<String, CachedAssetState> {
    let mut file_hashes: BTreeMap<String, ContentHash> = BTreeMap::new();
    for gb in builds {
        for entry in &gb.packed.entries {
            let hash = match fs::read(entry.asset_path()) {
                Ok(bytes) => ContentHash::from_bytes(&bytes),
                Err(err) => {
                    report.warnings.push(format!(
                        "cannot read asset '{}' ({err}); hashing its path instead",
                        entry.asset_path().display()
                    ));
                    let path = entry.asset_path().to_string_lossy();
                    ContentHash::from_parts(["unreadable", path.as_ref()])
                }
            };
            file_hashes.insert(entry.guid().to_string(), hash);
        }
    }

    let mut states = BTreeMap::new();
    for gb in builds {
        for entry in &gb.packed.entries {
            let dependencies: Vec<AssetState> = entry
                .depends_on()
                .iter()
                .filter_map(|dep| {
                    file_hashes
                        .get(dep)
                        .map(|h| AssetState::new(dep.as_str(), h.as_str()))
                })
                .collect();
            let own_hash = &file_hashes[entry.guid()];
            states.insert(
                entry.guid().to_string(),
                CachedAssetState {
                    asset: AssetState::new(entry.guid(), own_hash.as_str()),
                    dependencies,
                    bundle_file_id: String::new(),
                    group_name: gb.group.name().to_string(),
                },
            );
        }
    }
    states
}

/// Assets eligible for reverting: members of static content groups
fn diff_candidates(
    builds: &[GroupBuild<'_>],
    ctx: &BuildContext,
    asset_states: &BTreeMap<String, CachedAssetState>,
) -> BTreeMap<String, DiffCandidate> {
    let mut candidates = BTreeMap::new();
    for gb in builds {
        if !gb.group.static_content() {
            continue;
        }
        for entry in &gb.packed.entries {
            let (Some(state), Some(raw_bundle)) = (
                asset_states.get(entry.guid()),
                ctx.guid_to_bundle.get(entry.guid()),
            ) else {
                continue;
            };
            candidates.insert(
                entry.guid().to_string(),
                DiffCandidate {
                    address: entry.address().to_string(),
                    state: state.clone(),
                    raw_bundle: raw_bundle.clone(),
                    load_path: gb.load_path.clone(),
                },
            );
        }
    }
    candidates
}

/// Point every snapshot record at the bundle location it is served from.
/// Reverted assets keep their prior record verbatim.
fn stamp_bundle_assignments(
    asset_states: &mut BTreeMap<String, CachedAssetState>,
    reverted: &BTreeMap<String, CachedAssetState>,
    ctx: &BuildContext,
) {
    for (guid, state) in asset_states.iter_mut() {
        if let Some(prior) = reverted.get(guid) {
            *state = prior.clone();
            continue;
        }
        let Some(final_name) = ctx
            .guid_to_bundle
            .get(guid)
            .and_then(|raw| ctx.rename_map.final_name(raw))
        else {
            continue;
        };
        if let Some(location) = ctx.catalog.find_by_primary_key(final_name) {
            state.bundle_file_id = location.internal_id.clone();
        }
    }
}

fn kind_type_name(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Standard => "standard-asset",
        AssetKind::Scene => "scene",
        AssetKind::Folder => "folder",
        AssetKind::Unresolved => "unresolved",
    }
}
