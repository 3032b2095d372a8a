//! assetpack CLI - addressable asset bundle compiler
//!
//! Usage: assetpack <COMMAND>
//!
//! Commands:
//!   build    Full build: bundles, catalog, settings, snapshot
//!   update   Content-update build against a previous snapshot
//!   inspect  Summarize a serialized catalog

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use assetpack::application::build::CONTENT_STATE_FILE_NAME;
use assetpack::cli::{Cli, Commands};
use assetpack::domain::entities::Catalog;
use assetpack::{
    ArchiveEngine, BuildOptions, BuildPipeline, BuildReport, JsonCatalogSerializer,
    JsonContentStateStore, ProjectManifest,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            dry_run,
        } => cmd_build(&manifest, output, None, dry_run),
        Commands::Update {
            manifest,
            output,
            previous_state,
            dry_run,
        } => {
            let previous = previous_state.unwrap_or_else(|| output.join(CONTENT_STATE_FILE_NAME));
            cmd_build(&manifest, output, Some(previous), dry_run)
        }
        Commands::Inspect { catalog } => cmd_inspect(&catalog),
    }
}

fn cmd_build(
    manifest_path: &Path,
    output: PathBuf,
    previous_state: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let manifest = ProjectManifest::load(manifest_path)?;
    let groups = manifest.to_groups()?;

    let mut options = BuildOptions::new(output)
        .with_project(manifest.project.name.as_str(), manifest.project.id.as_str())
        .with_player_version(manifest.project.version.as_str())
        .with_ignore_unsupported_files(manifest.settings.ignore_unsupported_files)
        .with_dry_run(dry_run);
    options.build_remote_catalog = manifest.settings.build_remote_catalog;
    options.remote_catalog_build_path = manifest.remote_catalog_build_path();
    options.remote_catalog_load_path = manifest.remote_catalog_load_path();
    if let Some(previous) = previous_state {
        options = options.with_previous_state(previous);
    }

    let pipeline = BuildPipeline::new(
        ArchiveEngine::new(),
        JsonContentStateStore::new(),
        JsonCatalogSerializer::new(),
    );
    let report = pipeline.execute(&groups, &options)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BuildReport) {
    if report.dry_run {
        println!("Dry run - nothing published");
    }
    println!(
        "Groups: {}  Bundles built: {}  Carried: {}  Skipped: {}",
        report.groups_processed,
        report.bundles_built,
        report.bundles_carried,
        report.bundles_skipped
    );
    println!(
        "Catalog locations: {}  Assets reverted: {}",
        report.locations, report.assets_reverted
    );
    for bundle in &report.bundles {
        println!(
            "  {} <- {} (crc {:08x})",
            bundle.published_path.display(),
            bundle.group,
            bundle.crc
        );
    }
    if let Some(path) = &report.catalog_path {
        println!("Catalog: {}", path.display());
    }
    if let Some(path) = &report.content_state_path {
        println!("Snapshot: {}", path.display());
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    println!("Finished in {:.2?}", report.duration);
}

fn cmd_inspect(catalog_path: &Path) -> Result<()> {
    let bytes = std::fs::read(catalog_path)?;
    let catalog: Catalog = serde_json::from_slice(&bytes)?;

    println!("Catalog: {}", catalog_path.display());
    println!("Providers: {}", catalog.provider_ids.join(", "));
    println!("Locations: {}", catalog.len());
    for entry in &catalog.entries {
        let key = entry.primary_key().unwrap_or("<no key>");
        println!(
            "  {key}  provider={}  keys={}  deps={}",
            entry.provider,
            entry.keys.len(),
            entry.dependencies.len()
        );
        println!("    -> {}", entry.internal_id);
    }
    Ok(())
}
