//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// assetpack - addressable asset bundle compiler
#[derive(Parser, Debug)]
#[command(name = "assetpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Full build: bundles, catalog, settings and a new snapshot
    Build {
        /// Path to the project manifest
        #[arg(short, long, default_value = "assetpack.toml")]
        manifest: PathBuf,

        /// Output directory for catalog, settings and snapshot
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Compute everything but publish nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Content-update build: unchanged assets keep their previous bundles
    Update {
        /// Path to the project manifest
        #[arg(short, long, default_value = "assetpack.toml")]
        manifest: PathBuf,

        /// Output directory for catalog and settings
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Snapshot written by the last full build; defaults to the one in
        /// the output directory
        #[arg(long)]
        previous_state: Option<PathBuf>,

        /// Compute everything but publish nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print an entry/key/dependency summary of a serialized catalog
    Inspect {
        /// Path to a catalog file
        catalog: PathBuf,
    },
}
