//! Application Layer
//!
//! Use cases orchestrating the domain services through the ports.

pub mod build;

pub use build::{BuildOptions, BuildPipeline, BuildReport, BundleOutcome};
