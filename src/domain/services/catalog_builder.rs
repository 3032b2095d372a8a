//! Catalog construction and engine-result post-processing
//!
//! Locations are first added under raw build-time bundle names. Once the
//! engine has reported content hashes, each bundle location is finalized:
//! the published name is allocated, provider data is filled in, the internal
//! id is rewritten, and the primary-key rename flows through the catalog
//! index so every depender keeps a valid reference.

use serde_json::json;

use crate::domain::entities::{
    AssetEntry, AssetGroup, BundleDetails, BundleRenameMap, BundledSchema, Catalog, CatalogEntry,
    LocationKey,
};
use crate::domain::services::key_remapper::CatalogIndex;
use crate::domain::services::namer::FinalNameAllocator;
use crate::domain::services::packer::PackedGroup;
use crate::error::{PackError, PackResult};

/// Provider that mounts a content bundle file
pub const BUNDLE_PROVIDER: &str = "asset-bundle-provider";
/// Provider that loads an asset out of a mounted bundle
pub const BUNDLED_ASSET_PROVIDER: &str = "bundled-asset-provider";
/// Provider for assets shipped inside the player rather than in bundles
pub const LEGACY_PROVIDER: &str = "legacy-resources-provider";

/// Stateless catalog construction service
pub struct CatalogBuilder;

impl CatalogBuilder {
    /// Add one bundle location per definition and one asset location per leaf
    /// entry of a packed group.
    ///
    /// Bundle locations are keyed by their raw build-time name here; the final
    /// published name is only known after the engine runs and is applied by
    /// [`CatalogBuilder::finalize_bundle_location`].
    pub fn add_group_locations(
        catalog: &mut Catalog,
        packed: &PackedGroup,
        load_path: &str,
    ) -> PackResult<()> {
        catalog.register_provider(BUNDLE_PROVIDER);
        for def in &packed.definitions {
            let raw = def.bundle_name.as_str();
            let entry = CatalogEntry::new(
                vec![raw.into()],
                format!("{load_path}/{raw}"),
                BUNDLE_PROVIDER,
            )
            .with_dependencies(def.dependencies.iter().map(|d| d.as_str().into()).collect());
            catalog.push(entry);
        }

        if !packed.entries.is_empty() {
            catalog.register_provider(BUNDLED_ASSET_PROVIDER);
        }
        for asset in &packed.entries {
            let def_index = packed
                .assignments
                .get(asset.guid())
                .copied()
                .ok_or_else(|| PackError::UnknownBundle {
                    bundle: asset.address().to_string(),
                })?;
            let bundle_key = packed.definitions[def_index].bundle_name.clone();
            let entry = CatalogEntry::new(
                asset_keys(asset),
                asset.asset_path().to_string_lossy().replace('\\', "/"),
                BUNDLED_ASSET_PROVIDER,
            )
            .with_dependencies(vec![bundle_key.into()]);
            catalog.push(entry);
        }
        Ok(())
    }

    /// Add locations for a player-data group. No bundles are produced; the
    /// assets resolve straight out of the built player.
    pub fn add_player_data_locations(catalog: &mut Catalog, group: &AssetGroup) {
        let mut leaves = Vec::new();
        for entry in group.entries() {
            entry.gather_leaves(&mut leaves);
        }
        if leaves.is_empty() {
            return;
        }
        catalog.register_provider(LEGACY_PROVIDER);
        for asset in leaves {
            catalog.push(CatalogEntry::new(
                asset_keys(asset),
                asset.asset_path().to_string_lossy().replace('\\', "/"),
                LEGACY_PROVIDER,
            ));
        }
    }

    /// Finalize one bundle location after the engine reported its details.
    ///
    /// Allocates the published name, fills provider data (crc and hash honor
    /// the schema's flags), rewrites the internal id, records the raw→final
    /// pair, and renames the primary key so every depender follows. Returns
    /// the published name.
    #[allow(clippy::too_many_arguments)]
    pub fn finalize_bundle_location(
        catalog: &mut Catalog,
        index: &mut CatalogIndex,
        allocator: &mut FinalNameAllocator,
        rename_map: &mut BundleRenameMap,
        group: &AssetGroup,
        schema: &BundledSchema,
        raw_name: &str,
        logical_name: &str,
        details: &BundleDetails,
        load_path: &str,
    ) -> PackResult<String> {
        let slot = index
            .entry_slot(raw_name)
            .ok_or_else(|| PackError::UnknownBundle {
                bundle: raw_name.to_string(),
            })?;

        let final_name = allocator.allocate(
            &group.bundle_name_prefix(),
            &schema.naming,
            logical_name,
            &details.hash,
        )?;

        let entry = &mut catalog.entries[slot];
        entry.internal_id = format!("{load_path}/{final_name}");
        entry.data = json!({
            "bundleName": final_name,
            "bundleSize": details.size,
            "crc": if schema.use_crc { details.crc } else { 0 },
            "hash": if schema.use_cache { details.hash.as_str() } else { "" },
        });

        index.rename(catalog, raw_name, &final_name)?;
        rename_map.insert(raw_name, final_name.clone());
        Ok(final_name)
    }
}

/// Lookup keys for an asset location: address first, then guid, then labels.
/// Sub-assets share their parent's guid, so only the address identifies them.
fn asset_keys(asset: &AssetEntry) -> Vec<LocationKey> {
    let mut keys: Vec<LocationKey> = vec![asset.address().into()];
    if !asset.is_sub_asset() && !asset.guid().is_empty() {
        keys.push(asset.guid().into());
    }
    keys.extend(asset.labels().map(LocationKey::from));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use crate::domain::entities::{GroupSchema, NamingStyle, PackingMode};
    use crate::domain::services::namer::BundleNamer;
    use crate::domain::services::packer::Packer;

    fn sample_group() -> AssetGroup {
        AssetGroup::new("Props", "group-guid")
            .with_schema(GroupSchema::BundledAssets(BundledSchema::default()))
            .with_entries(vec![
                AssetEntry::new("crate", "guid-crate", "assets/props/crate.mesh")
                    .with_labels(["props"]),
                AssetEntry::new("barrel", "guid-barrel", "assets/props/barrel.mesh"),
            ])
    }

    fn pack_and_name(group: &AssetGroup, schema: &BundledSchema) -> (PackedGroup, Vec<String>) {
        let mut packed = Packer::pack_group(group, schema, "proj", false).unwrap();
        let mut handled = HashSet::new();
        let logical =
            BundleNamer::assign_unique_names(&mut packed.definitions, &mut handled).unwrap();
        (packed, logical)
    }

    fn details(hash: &str, crc: u32, size: u64) -> BundleDetails {
        BundleDetails {
            hash: hash.into(),
            crc,
            file_name: PathBuf::from("staging/x.bundle"),
            dependencies: vec![],
            size,
        }
    }

    #[test]
    fn group_locations_reference_raw_bundle_names() {
        let group = sample_group();
        let schema = group.bundled_schema().unwrap().clone();
        let (packed, _) = pack_and_name(&group, &schema);

        let mut catalog = Catalog::new();
        CatalogBuilder::add_group_locations(&mut catalog, &packed, "http://cdn/content").unwrap();

        // one bundle location plus two asset locations
        assert_eq!(catalog.len(), 3);
        let raw = packed.definitions[0].bundle_name.as_str();
        let bundle = catalog.find_by_primary_key(raw).unwrap();
        assert_eq!(bundle.provider, BUNDLE_PROVIDER);
        assert_eq!(bundle.internal_id, format!("http://cdn/content/{raw}"));

        let asset = catalog.find_by_primary_key("crate").unwrap();
        assert_eq!(asset.provider, BUNDLED_ASSET_PROVIDER);
        assert_eq!(asset.dependencies, vec![LocationKey::Text(raw.into())]);
        assert!(asset.keys.contains(&LocationKey::Text("props".into())));
        assert!(asset.keys.contains(&LocationKey::Text("guid-crate".into())));
    }

    #[test]
    fn finalize_rewrites_location_and_retargets_assets() {
        let group = sample_group();
        let schema = group.bundled_schema().unwrap().clone();
        let (packed, logical) = pack_and_name(&group, &schema);

        let mut catalog = Catalog::new();
        CatalogBuilder::add_group_locations(&mut catalog, &packed, "http://cdn/content").unwrap();
        let mut index = CatalogIndex::build(&catalog);
        let mut allocator = FinalNameAllocator::new();
        let mut renames = BundleRenameMap::new();

        let raw = packed.definitions[0].bundle_name.clone();
        let final_name = CatalogBuilder::finalize_bundle_location(
            &mut catalog,
            &mut index,
            &mut allocator,
            &mut renames,
            &group,
            &schema,
            &raw,
            &logical[0],
            &details("cafebabe", 99, 1024),
            "http://cdn/content",
        )
        .unwrap();

        assert_eq!(final_name, "props_assets_all_cafebabe.bundle");
        assert!(catalog.find_by_primary_key(&raw).is_none());
        let bundle = catalog.find_by_primary_key(&final_name).unwrap();
        assert_eq!(
            bundle.internal_id,
            format!("http://cdn/content/{final_name}")
        );
        assert_eq!(bundle.data["crc"], 99);
        assert_eq!(bundle.data["hash"], "cafebabe");
        assert_eq!(bundle.data["bundleSize"], 1024);

        // both asset locations now depend on the published name
        for key in ["crate", "barrel"] {
            let asset = catalog.find_by_primary_key(key).unwrap();
            assert_eq!(
                asset.dependencies,
                vec![LocationKey::Text(final_name.clone())]
            );
        }
        assert_eq!(renames.final_name(&raw), Some(final_name.as_str()));
    }

    #[test]
    fn finalize_honors_crc_and_cache_flags() {
        let group = AssetGroup::new("Props", "group-guid")
            .with_schema(GroupSchema::BundledAssets(BundledSchema {
                use_crc: false,
                use_cache: false,
                ..BundledSchema::default()
            }))
            .with_entries(vec![AssetEntry::new(
                "crate",
                "guid-crate",
                "assets/props/crate.mesh",
            )]);
        let schema = group.bundled_schema().unwrap().clone();
        let (packed, logical) = pack_and_name(&group, &schema);

        let mut catalog = Catalog::new();
        CatalogBuilder::add_group_locations(&mut catalog, &packed, "out").unwrap();
        let mut index = CatalogIndex::build(&catalog);
        let mut allocator = FinalNameAllocator::new();
        let mut renames = BundleRenameMap::new();

        let raw = packed.definitions[0].bundle_name.clone();
        let final_name = CatalogBuilder::finalize_bundle_location(
            &mut catalog,
            &mut index,
            &mut allocator,
            &mut renames,
            &group,
            &schema,
            &raw,
            &logical[0],
            &details("cafebabe", 99, 10),
            "out",
        )
        .unwrap();

        let bundle = catalog.find_by_primary_key(&final_name).unwrap();
        assert_eq!(bundle.data["crc"], 0);
        assert_eq!(bundle.data["hash"], "");
    }

    #[test]
    fn no_hash_style_omits_hash_from_published_name() {
        let group = AssetGroup::new("Props", "group-guid")
            .with_schema(GroupSchema::BundledAssets(BundledSchema {
                naming: NamingStyle::NoHash,
                ..BundledSchema::default()
            }))
            .with_entries(vec![AssetEntry::new(
                "crate",
                "guid-crate",
                "assets/props/crate.mesh",
            )]);
        let schema = group.bundled_schema().unwrap().clone();
        let (packed, logical) = pack_and_name(&group, &schema);

        let mut catalog = Catalog::new();
        CatalogBuilder::add_group_locations(&mut catalog, &packed, "out").unwrap();
        let mut index = CatalogIndex::build(&catalog);
        let mut allocator = FinalNameAllocator::new();
        let mut renames = BundleRenameMap::new();

        let raw = packed.definitions[0].bundle_name.clone();
        let final_name = CatalogBuilder::finalize_bundle_location(
            &mut catalog,
            &mut index,
            &mut allocator,
            &mut renames,
            &group,
            &schema,
            &raw,
            &logical[0],
            &details("cafebabe", 1, 10),
            "out",
        )
        .unwrap();
        assert_eq!(final_name, "props_assets_all.bundle");
    }

    #[test]
    fn separately_packed_entries_map_to_their_own_bundles() {
        let group = AssetGroup::new("Props", "group-guid")
            .with_schema(GroupSchema::BundledAssets(BundledSchema {
                packing: PackingMode::Separately,
                ..BundledSchema::default()
            }))
            .with_entries(vec![
                AssetEntry::new("crate", "guid-crate", "assets/props/crate.mesh"),
                AssetEntry::new("barrel", "guid-barrel", "assets/props/barrel.mesh"),
            ]);
        let schema = group.bundled_schema().unwrap().clone();
        let (packed, _) = pack_and_name(&group, &schema);

        let mut catalog = Catalog::new();
        CatalogBuilder::add_group_locations(&mut catalog, &packed, "out").unwrap();

        let crate_dep = &catalog.find_by_primary_key("crate").unwrap().dependencies[0];
        let barrel_dep = &catalog.find_by_primary_key("barrel").unwrap().dependencies[0];
        assert_ne!(crate_dep, barrel_dep);
    }

    #[test]
    fn player_data_locations_use_the_legacy_provider() {
        let group = AssetGroup::new("Built In", "guid-builtin")
            .with_schema(GroupSchema::PlayerData)
            .with_entries(vec![AssetEntry::new(
                "splash",
                "guid-splash",
                "assets/ui/splash.png",
            )
            .with_in_resources(true)]);

        let mut catalog = Catalog::new();
        CatalogBuilder::add_player_data_locations(&mut catalog, &group);
        assert_eq!(catalog.len(), 1);
        let loc = catalog.find_by_primary_key("splash").unwrap();
        assert_eq!(loc.provider, LEGACY_PROVIDER);
        assert!(loc.dependencies.is_empty());
        assert_eq!(catalog.provider_ids, vec![LEGACY_PROVIDER]);
    }
}
