//! Build pipeline tests over the real engine, store and serializer

use std::fs;
use std::path::Path;

use tempfile::{tempdir, TempDir};

use crate::domain::entities::{
    AssetEntry, AssetGroup, BundledSchema, Catalog, GroupSchema, PackingMode,
};
use crate::error::PackError;
use crate::infrastructure::{ArchiveEngine, JsonCatalogSerializer, JsonContentStateStore};

use super::use_case::{
    needs_copy, CONTENT_STATE_FILE_NAME, SETTINGS_FILE_NAME, TYPE_MANIFEST_FILE_NAME,
};
use super::{BuildOptions, BuildPipeline};

type Pipeline = BuildPipeline<ArchiveEngine, JsonContentStateStore, JsonCatalogSerializer>;

fn pipeline() -> Pipeline {
    BuildPipeline::new(
        ArchiveEngine::new(),
        JsonContentStateStore::new(),
        JsonCatalogSerializer::new(),
    )
}

fn write_assets(assets: &Path, crate_bytes: &[u8], barrel_bytes: &[u8]) {
    fs::create_dir_all(assets).unwrap();
    fs::write(assets.join("crate.mesh"), crate_bytes).unwrap();
    fs::write(assets.join("barrel.mesh"), barrel_bytes).unwrap();
}

fn props_group(assets: &Path, out: &Path, packing: PackingMode) -> AssetGroup {
    let schema = BundledSchema {
        packing,
        build_path: out.join("bundles").to_string_lossy().into_owned(),
        load_path: "served/bundles".to_string(),
        ..BundledSchema::default()
    };
    AssetGroup::new("Props", "group-props")
        .with_schema(GroupSchema::BundledAssets(schema))
        .with_schema(GroupSchema::ContentUpdate {
            static_content: true,
        })
        .with_entries(vec![
            AssetEntry::new("crate", "guid-crate", assets.join("crate.mesh")),
            AssetEntry::new("barrel", "guid-barrel", assets.join("barrel.mesh")),
        ])
}

fn options(out: &Path) -> BuildOptions {
    BuildOptions::new(out).with_project("Sample", "proj-1")
}

fn load_catalog(out: &Path) -> Catalog {
    serde_json::from_slice(&fs::read(out.join("catalog.json")).unwrap()).unwrap()
}

fn asset_bundle_key(catalog: &Catalog, address: &str) -> String {
    catalog.find_by_primary_key(address).unwrap().dependencies[0]
        .as_text()
        .unwrap()
        .to_string()
}

fn project() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    let out = dir.path().join("out");
    (dir, assets, out)
}

#[test]
fn full_build_publishes_everything() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let groups = vec![props_group(&assets, &out, PackingMode::Together)];

    let report = pipeline().execute(&groups, &options(&out)).unwrap();

    assert_eq!(report.groups_processed, 1);
    assert_eq!(report.bundles_built, 1);
    assert_eq!(report.locations, 3); // one bundle plus two assets
    assert!(out.join("catalog.json").exists());
    assert!(out.join(SETTINGS_FILE_NAME).exists());
    assert!(out.join(TYPE_MANIFEST_FILE_NAME).exists());
    assert!(out.join(CONTENT_STATE_FILE_NAME).exists());

    // the published filename matches the catalog's bundle location
    let catalog = load_catalog(&out);
    let bundle_key = asset_bundle_key(&catalog, "crate");
    assert!(bundle_key.starts_with("props_assets_all_"));
    assert!(out.join("bundles").join(&bundle_key).exists());
    let bundle = catalog.find_by_primary_key(&bundle_key).unwrap();
    assert_eq!(bundle.internal_id, format!("served/bundles/{bundle_key}"));
    assert!(bundle.data["crc"].as_u64().is_some());
}

#[test]
fn identical_inputs_build_identical_outputs() {
    let (_dir, assets, out1) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let out2 = out1.parent().unwrap().join("out2");

    pipeline()
        .execute(&[props_group(&assets, &out1, PackingMode::Together)], &options(&out1))
        .unwrap();
    pipeline()
        .execute(&[props_group(&assets, &out2, PackingMode::Together)], &options(&out2))
        .unwrap();

    assert_eq!(
        fs::read(out1.join("catalog.json")).unwrap(),
        fs::read(out2.join("catalog.json")).unwrap()
    );
    assert_eq!(
        fs::read(out1.join(CONTENT_STATE_FILE_NAME)).unwrap(),
        fs::read(out2.join(CONTENT_STATE_FILE_NAME)).unwrap()
    );
}

#[test]
fn update_with_no_changes_reverts_every_asset() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let groups = vec![props_group(&assets, &out, PackingMode::Together)];

    pipeline().execute(&groups, &options(&out)).unwrap();
    let first_catalog = load_catalog(&out);
    let original_bundle = asset_bundle_key(&first_catalog, "crate");

    let update_options =
        options(&out).with_previous_state(out.join(CONTENT_STATE_FILE_NAME));
    let report = pipeline().execute(&groups, &update_options).unwrap();

    assert_eq!(report.assets_reverted, 2);
    assert_eq!(report.bundles_built, 0);
    assert_eq!(report.bundles_skipped, 1);
    assert_eq!(report.bundles_carried, 1);
    // an update never moves the snapshot forward
    assert!(report.content_state_path.is_none());

    let catalog = load_catalog(&out);
    assert_eq!(asset_bundle_key(&catalog, "crate"), original_bundle);
    assert_eq!(asset_bundle_key(&catalog, "barrel"), original_bundle);
}

#[test]
fn update_isolates_the_changed_asset() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let groups = vec![props_group(&assets, &out, PackingMode::Together)];

    pipeline().execute(&groups, &options(&out)).unwrap();
    let original_bundle = asset_bundle_key(&load_catalog(&out), "crate");

    write_assets(&assets, b"crate-v1", b"barrel-v2");
    let update_options =
        options(&out).with_previous_state(out.join(CONTENT_STATE_FILE_NAME));
    let report = pipeline().execute(&groups, &update_options).unwrap();

    assert_eq!(report.assets_reverted, 1);
    assert_eq!(report.bundles_built, 1);
    assert_eq!(report.bundles_carried, 1);
    assert_eq!(report.bundles_skipped, 0);

    let catalog = load_catalog(&out);
    // unchanged asset stays on the previous bundle
    assert_eq!(asset_bundle_key(&catalog, "crate"), original_bundle);
    // changed asset moves to a freshly named bundle
    let fresh = asset_bundle_key(&catalog, "barrel");
    assert_ne!(fresh, original_bundle);
    assert!(out.join("bundles").join(&fresh).exists());
}

#[test]
fn unusable_previous_state_falls_back_to_full_build() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let groups = vec![props_group(&assets, &out, PackingMode::Together)];

    pipeline().execute(&groups, &options(&out)).unwrap();
    fs::write(out.join(CONTENT_STATE_FILE_NAME), b"not json").unwrap();

    let update_options =
        options(&out).with_previous_state(out.join(CONTENT_STATE_FILE_NAME));
    let report = pipeline().execute(&groups, &update_options).unwrap();

    assert_eq!(report.assets_reverted, 0);
    assert_eq!(report.bundles_built, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("previous content state unusable")));
    // the fallback acts as a state-saving build
    assert!(report.content_state_path.is_some());
}

#[test]
fn dry_run_publishes_nothing() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let groups = vec![props_group(&assets, &out, PackingMode::Together)];

    let report = pipeline()
        .execute(&groups, &options(&out).with_dry_run(true))
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.locations, 3);
    assert!(report.catalog_path.is_none());
    // nothing staged or published under the output directory at all
    assert!(!out.exists());
}

#[test]
fn missing_build_path_aborts_the_build() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");

    let schema = BundledSchema {
        load_path: "served".to_string(),
        ..BundledSchema::default()
    };
    let group = AssetGroup::new("Props", "group-props")
        .with_schema(GroupSchema::BundledAssets(schema))
        .with_entries(vec![AssetEntry::new(
            "crate",
            "guid-crate",
            assets.join("crate.mesh"),
        )]);

    let err = pipeline().execute(&[group], &options(&out)).unwrap_err();
    assert!(matches!(err, PackError::MissingBuildPath { .. }));
    assert!(!out.join("catalog.json").exists());
}

#[test]
fn cross_bundle_dependencies_follow_final_names() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");

    let schema = BundledSchema {
        packing: PackingMode::Separately,
        build_path: out.join("bundles").to_string_lossy().into_owned(),
        load_path: "served/bundles".to_string(),
        ..BundledSchema::default()
    };
    let group = AssetGroup::new("Props", "group-props")
        .with_schema(GroupSchema::BundledAssets(schema))
        .with_entries(vec![
            AssetEntry::new("crate", "guid-crate", assets.join("crate.mesh"))
                .with_depends_on(["guid-barrel"]),
            AssetEntry::new("barrel", "guid-barrel", assets.join("barrel.mesh")),
        ]);

    pipeline().execute(&[group], &options(&out)).unwrap();

    let catalog = load_catalog(&out);
    let crate_bundle = asset_bundle_key(&catalog, "crate");
    let barrel_bundle = asset_bundle_key(&catalog, "barrel");
    assert_ne!(crate_bundle, barrel_bundle);

    let location = catalog.find_by_primary_key(&crate_bundle).unwrap();
    let deps: Vec<&str> = location
        .dependencies
        .iter()
        .filter_map(|d| d.as_text())
        .collect();
    assert_eq!(deps, vec![barrel_bundle.as_str()]);
}

#[test]
fn player_data_group_adds_locations_without_bundles() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");

    let bundled = props_group(&assets, &out, PackingMode::Together);
    let player = AssetGroup::new("Built In", "group-builtin")
        .with_schema(GroupSchema::PlayerData)
        .with_entries(vec![AssetEntry::new(
            "splash",
            "guid-splash",
            assets.join("crate.mesh"),
        )]);

    let report = pipeline()
        .execute(&[bundled, player], &options(&out))
        .unwrap();

    assert_eq!(report.groups_processed, 2);
    assert_eq!(report.bundles_built, 1);
    let catalog = load_catalog(&out);
    let splash = catalog.find_by_primary_key("splash").unwrap();
    assert_eq!(splash.provider, "legacy-resources-provider");
    assert!(splash.dependencies.is_empty());
}

#[test]
fn deleting_an_entry_renames_only_its_group_bundle() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    fs::write(assets.join("lamp.mesh"), b"lamp-v1").unwrap();
    fs::write(assets.join("cart.mesh"), b"cart-v1").unwrap();

    // non-static group: membership changes rebuild its bundle outright
    let gear_group = |entries: Vec<AssetEntry>, out: &Path| {
        let schema = BundledSchema {
            packing: PackingMode::Together,
            build_path: out.join("bundles").to_string_lossy().into_owned(),
            load_path: "served/bundles".to_string(),
            ..BundledSchema::default()
        };
        AssetGroup::new("Gear", "group-gear")
            .with_schema(GroupSchema::BundledAssets(schema))
            .with_entries(entries)
    };
    let gear_entries = vec![
        AssetEntry::new("lamp", "guid-lamp", assets.join("lamp.mesh")),
        AssetEntry::new("cart", "guid-cart", assets.join("cart.mesh")),
    ];

    let groups = vec![
        gear_group(gear_entries.clone(), &out),
        props_group(&assets, &out, PackingMode::Together),
    ];
    pipeline().execute(&groups, &options(&out)).unwrap();
    let first = load_catalog(&out);
    let first_gear = asset_bundle_key(&first, "lamp");
    let first_props = asset_bundle_key(&first, "crate");

    let out2 = out.parent().unwrap().join("out2");
    let groups = vec![
        gear_group(
            vec![AssetEntry::new("lamp", "guid-lamp", assets.join("lamp.mesh"))],
            &out2,
        ),
        props_group(&assets, &out2, PackingMode::Together),
    ];
    let opts = options(&out2).with_previous_state(out.join(CONTENT_STATE_FILE_NAME));
    pipeline().execute(&groups, &opts).unwrap();
    let second = load_catalog(&out2);

    // the shrunken group gets a fresh name; the untouched group keeps its old one
    assert_ne!(asset_bundle_key(&second, "lamp"), first_gear);
    assert_eq!(asset_bundle_key(&second, "crate"), first_props);
    assert!(second.find_by_primary_key("cart").is_none());
}

#[test]
fn full_build_reports_per_bundle_outcomes_and_duration() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let groups = vec![props_group(&assets, &out, PackingMode::Together)];

    let report = pipeline().execute(&groups, &options(&out)).unwrap();

    assert_eq!(report.bundles.len(), 1);
    let outcome = &report.bundles[0];
    assert_eq!(outcome.group, "Props");
    assert!(outcome.final_name.starts_with("props_assets_all_"));
    assert!(outcome.published_path.exists());
    assert_eq!(outcome.published_path, out.join("bundles").join(&outcome.final_name));
    assert_eq!(outcome.hash.len(), 32);
    assert_ne!(outcome.crc, 0);
    assert!(report.duration > std::time::Duration::ZERO);
}

#[test]
fn full_build_cleans_up_the_staging_directory() {
    let (_dir, assets, out) = project();
    write_assets(&assets, b"crate-v1", b"barrel-v1");
    let groups = vec![props_group(&assets, &out, PackingMode::Together)];

    pipeline().execute(&groups, &options(&out)).unwrap();

    assert!(out.join("catalog.json").exists());
    assert!(!out.join(".staging").exists());
}

#[test]
fn skips_copying_a_destination_with_matching_size_and_mtime() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src.bundle");
    let dst = dir.path().join("dst.bundle");
    fs::write(&src, b"same-bytes").unwrap();
    fs::write(&dst, b"same-bytes").unwrap();
    let mtime = fs::metadata(&src).unwrap().modified().unwrap();
    fs::File::options()
        .write(true)
        .open(&dst)
        .unwrap()
        .set_modified(mtime)
        .unwrap();

    assert!(!needs_copy(&src, &dst));
}

#[test]
fn copies_when_destination_metadata_differs() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src.bundle");
    fs::write(&src, b"same-bytes").unwrap();

    // missing destination
    assert!(needs_copy(&src, &dir.path().join("absent.bundle")));

    // size mismatch
    let short = dir.path().join("short.bundle");
    fs::write(&short, b"short").unwrap();
    assert!(needs_copy(&src, &short));

    // mtime mismatch at equal size
    let stale = dir.path().join("stale.bundle");
    fs::write(&stale, b"same-bytes").unwrap();
    let mtime = fs::metadata(&src).unwrap().modified().unwrap();
    fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(mtime + std::time::Duration::from_secs(5))
        .unwrap();
    assert!(needs_copy(&src, &stale));
}
