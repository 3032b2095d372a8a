//! Project manifest for assetpack
//!
//! The manifest (`assetpack.toml`) declares the project identity, a profile
//! variable table, build settings and the asset groups. Loading converts the
//! declarative form into domain `AssetGroup`s, expanding `{Var}` profile
//! references in every path template.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::entities::{
    AssetEntry, AssetGroup, BundleIdMode, BundledSchema, GroupSchema, NamingStyle, PackingMode,
};
use crate::domain::value_objects::ContentHash;
use crate::error::{PackError, PackResult};

/// Default manifest filename
pub const MANIFEST_FILE_NAME: &str = "assetpack.toml";

/// Project identity
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Stable project identifier folded into bundle-name seeds
    pub id: String,
    #[serde(default = "default_player_version")]
    pub version: String,
}

fn default_player_version() -> String {
    "1.0".to_string()
}

/// Build settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub ignore_unsupported_files: bool,

    #[serde(default)]
    pub build_remote_catalog: bool,

    #[serde(default)]
    pub remote_catalog_build_path: String,

    #[serde(default)]
    pub remote_catalog_load_path: String,
}

/// Packing policy, declarative form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PackingConfig {
    #[default]
    Together,
    Separately,
    TogetherByLabel,
}

/// Bundle-name seed source, declarative form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BundleIdConfig {
    #[default]
    GroupGuid,
    GroupGuidProjectId,
    GroupGuidProjectIdEntriesHash,
}

/// Final filename style, declarative form; `custom` reads `custom_prefix`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NamingConfig {
    #[default]
    AppendHash,
    NoHash,
    Custom,
    FilenameOnly,
}

/// Schema kind a group declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    #[default]
    Bundled,
    PlayerData,
}

/// One group's schema block
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SchemaConfig {
    #[serde(default)]
    pub kind: SchemaKind,
    #[serde(default)]
    pub packing: PackingConfig,
    #[serde(default)]
    pub id_mode: BundleIdConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub custom_prefix: Option<String>,
    #[serde(default)]
    pub build_path: String,
    #[serde(default)]
    pub load_path: String,
    #[serde(default = "default_true")]
    pub use_crc: bool,
    #[serde(default = "default_true")]
    pub use_cache: bool,
    #[serde(default = "default_true")]
    pub include_in_build: bool,
}

fn default_true() -> bool {
    true
}

/// One addressable entry declaration
#[derive(Debug, Clone, Deserialize)]
pub struct EntryConfig {
    pub address: String,
    pub path: PathBuf,
    /// Defaults to a hash of the path when omitted
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Expand a directory into one leaf entry per contained file
    #[serde(default)]
    pub folder: bool,
}

/// One group declaration
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    /// Defaults to a hash of the name when omitted
    #[serde(default)]
    pub guid: Option<String>,
    /// Marks the group's content static for content-update builds
    #[serde(default)]
    pub static_content: bool,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default, rename = "entry")]
    pub entries: Vec<EntryConfig>,
}

/// The parsed project manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    pub project: ProjectConfig,
    /// `{Var}` substitutions applied to every path template
    #[serde(default)]
    pub profile: BTreeMap<String, String>,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupConfig>,
}

impl ProjectManifest {
    /// Load and parse a manifest file
    pub fn load(path: &Path) -> PackResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| PackError::Config {
            file: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text; `path` is only used in error messages
    pub fn parse(text: &str, path: &Path) -> PackResult<Self> {
        let manifest: ProjectManifest = toml::from_str(text).map_err(|err| PackError::Config {
            file: path.to_path_buf(),
            message: err.to_string(),
        })?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> PackResult<()> {
        let mut addresses = BTreeSet::new();
        let mut guids = BTreeSet::new();
        for group in &self.groups {
            for entry in &group.entries {
                if entry.address.is_empty() {
                    return Err(PackError::Config {
                        file: path.to_path_buf(),
                        message: format!("entry '{}' has an empty address", entry.path.display()),
                    });
                }
                if !entry.folder && !addresses.insert(entry.address.clone()) {
                    return Err(PackError::Config {
                        file: path.to_path_buf(),
                        message: format!("duplicate address '{}'", entry.address),
                    });
                }
                if let Some(guid) = &entry.guid {
                    if !guids.insert(guid.clone()) {
                        return Err(PackError::Config {
                            file: path.to_path_buf(),
                            message: format!("duplicate guid '{guid}'"),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Expand `{Var}` profile references in a path template. Unknown
    /// variables are left verbatim.
    pub fn expand(&self, template: &str) -> String {
        let mut expanded = template.to_string();
        for (name, value) in &self.profile {
            expanded = expanded.replace(&format!("{{{name}}}"), value);
        }
        expanded
    }

    /// Remote catalog build path with profile variables expanded
    pub fn remote_catalog_build_path(&self) -> String {
        self.expand(&self.settings.remote_catalog_build_path)
    }

    /// Remote catalog load path with profile variables expanded
    pub fn remote_catalog_load_path(&self) -> String {
        self.expand(&self.settings.remote_catalog_load_path)
    }

    /// Convert the declarative groups into domain groups, expanding profile
    /// variables and folder entries
    pub fn to_groups(&self) -> PackResult<Vec<AssetGroup>> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for config in &self.groups {
            let guid = config
                .guid
                .clone()
                .unwrap_or_else(|| derived_guid("group", &config.name));
            let mut group = AssetGroup::new(&config.name, guid);

            let schema = &config.schema;
            match schema.kind {
                SchemaKind::PlayerData => {
                    group = group.with_schema(GroupSchema::PlayerData);
                }
                SchemaKind::Bundled => {
                    group = group.with_schema(GroupSchema::BundledAssets(BundledSchema {
                        packing: match schema.packing {
                            PackingConfig::Together => PackingMode::Together,
                            PackingConfig::Separately => PackingMode::Separately,
                            PackingConfig::TogetherByLabel => PackingMode::TogetherByLabel,
                        },
                        id_mode: match schema.id_mode {
                            BundleIdConfig::GroupGuid => BundleIdMode::GroupGuid,
                            BundleIdConfig::GroupGuidProjectId => BundleIdMode::GroupGuidProjectId,
                            BundleIdConfig::GroupGuidProjectIdEntriesHash => {
                                BundleIdMode::GroupGuidProjectIdEntriesHash
                            }
                        },
                        naming: match schema.naming {
                            NamingConfig::AppendHash => NamingStyle::AppendHash,
                            NamingConfig::NoHash => NamingStyle::NoHash,
                            NamingConfig::Custom => NamingStyle::Custom(
                                schema.custom_prefix.clone().unwrap_or_default(),
                            ),
                            NamingConfig::FilenameOnly => NamingStyle::FileNameOnly,
                        },
                        build_path: self.expand(&schema.build_path),
                        load_path: self.expand(&schema.load_path),
                        use_crc: schema.use_crc,
                        use_cache: schema.use_cache,
                        include_in_build: schema.include_in_build,
                    }));
                }
            }
            if config.static_content {
                group = group.with_schema(GroupSchema::ContentUpdate {
                    static_content: true,
                });
            }

            for entry in &config.entries {
                group.add_entry(self.to_entry(entry)?);
            }
            groups.push(group);
        }
        Ok(groups)
    }

    fn to_entry(&self, config: &EntryConfig) -> PackResult<AssetEntry> {
        let guid = config
            .guid
            .clone()
            .unwrap_or_else(|| derived_guid("entry", &config.path.to_string_lossy()));
        if config.folder {
            let mut files = Vec::new();
            collect_files(&config.path, &mut files)?;
            let children = files
                .into_iter()
                .map(|path| {
                    let address = format!(
                        "{}/{}",
                        config.address,
                        path.file_stem().unwrap_or_default().to_string_lossy()
                    );
                    AssetEntry::new(
                        address,
                        derived_guid("entry", &path.to_string_lossy()),
                        path,
                    )
                    .with_labels(config.labels.clone())
                })
                .collect();
            Ok(AssetEntry::folder(&config.address, guid, &config.path, children)
                .with_labels(config.labels.clone()))
        } else {
            Ok(AssetEntry::new(&config.address, guid, &config.path)
                .with_labels(config.labels.clone())
                .with_depends_on(config.depends_on.clone()))
        }
    }
}

/// Deterministic guid for declarations that omit one
fn derived_guid(kind: &str, seed: &str) -> String {
    ContentHash::from_parts([kind, seed]).short_hex().to_string()
}

/// Recursively collect the files under a directory, sorted for determinism
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> PackResult<()> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|err| PackError::Config {
            file: dir.to_path_buf(),
            message: format!("cannot expand folder entry: {err}"),
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    children.sort();
    for child in children {
        if child.is_dir() {
            collect_files(&child, out)?;
        } else {
            out.push(child);
        }
    }
    Ok(())
}
