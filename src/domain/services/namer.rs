//! Bundle naming service
//!
//! Two naming passes happen per build. Before the engine runs, raw logical
//! names (which may collide across groups sharing a seed) are made unique and
//! hashed into physical input filenames. After the engine reports content
//! hashes, final published names are allocated in a single collision-aware
//! pass, so every name is settled before any file placement.

use std::collections::HashSet;

use crate::domain::entities::{BundleBuildDefinition, NamingStyle};
use crate::domain::value_objects::ContentHash;
use crate::error::{PackError, PackResult};

/// Bounded retry count for numeric collision suffixes
const MAX_NAME_RETRIES: u32 = 1000;

/// Append an incrementing numeric suffix before `.bundle` until the name is
/// free in `taken`
fn resolve_collision(name: &str, taken: &HashSet<String>) -> PackResult<String> {
    if !taken.contains(name) {
        return Ok(name.to_string());
    }
    let mut count = 1;
    loop {
        let candidate = name.replace(".bundle", &format!("{count}.bundle"));
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
        count += 1;
        if count >= MAX_NAME_RETRIES {
            return Err(PackError::NameCollision {
                name: name.to_string(),
            });
        }
    }
}

/// Pre-engine naming pass
pub struct BundleNamer;

impl BundleNamer {
    /// Make every definition's logical name globally unique, then replace the
    /// definition's bundle name with a deterministic hash of the
    /// post-collision-resolution logical name.
    ///
    /// Returns the unique logical names, parallel to `definitions`. Two
    /// distinct logical bundles can never collide on a physical filename
    /// because the physical name is a hash of the unique logical name.
    pub fn assign_unique_names(
        definitions: &mut [BundleBuildDefinition],
        handled: &mut HashSet<String>,
    ) -> PackResult<Vec<String>> {
        let mut unique_names = Vec::with_capacity(definitions.len());
        for def in definitions.iter_mut() {
            let logical = resolve_collision(&def.bundle_name, handled)?;
            handled.insert(logical.clone());

            let physical = format!(
                "{}.bundle",
                ContentHash::from_parts([logical.as_str()]).short_hex()
            );
            def.bundle_name = physical;
            unique_names.push(logical);
        }
        Ok(unique_names)
    }
}

/// Single-pass, collision-aware allocator for final published bundle names.
///
/// Build-scoped: constructed fresh per build, discarded afterwards. All final
/// names are settled here before any file placement, so an unhashed name
/// never needs a temporary hash suffix or a later strip-and-rename step.
#[derive(Debug, Default)]
pub struct FinalNameAllocator {
    allocated: HashSet<String>,
}

impl FinalNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and reserve the final published name for a bundle.
    ///
    /// `logical_name` is the unique pre-engine name (`{seed}_assets_all.bundle`);
    /// the seed segment is replaced by the group prefix so published names
    /// read `{group}_assets_all...`. `content_hash` is the engine-reported
    /// bundle hash.
    pub fn allocate(
        &mut self,
        group_prefix: &str,
        style: &NamingStyle,
        logical_name: &str,
        content_hash: &str,
    ) -> PackResult<String> {
        let rest = strip_seed_segment(logical_name);
        let styled = match style {
            NamingStyle::AppendHash => format!("{group_prefix}_{rest}")
                .replace(".bundle", &format!("_{content_hash}.bundle")),
            NamingStyle::NoHash => format!("{group_prefix}_{rest}"),
            NamingStyle::Custom(prefix) => format!("{prefix}_{rest}")
                .replace(".bundle", &format!("_{content_hash}.bundle")),
            NamingStyle::FileNameOnly => format!("{content_hash}.bundle"),
        };

        let unique = resolve_collision(&styled, &self.allocated)?;
        self.allocated.insert(unique.clone());
        Ok(unique)
    }

    /// Pre-reserve a name allocated outside this pass (a bundle carried over
    /// unchanged from a previous build), so fresh names cannot collide with it
    pub fn reserve(&mut self, name: &str) {
        self.allocated.insert(name.to_string());
    }
}

/// Drop the seed segment at the front of a logical bundle name
fn strip_seed_segment(logical_name: &str) -> &str {
    match logical_name.split_once('_') {
        Some((_, rest)) => rest,
        None => logical_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(names: &[&str]) -> Vec<BundleBuildDefinition> {
        names
            .iter()
            .map(|n| BundleBuildDefinition::new(*n))
            .collect()
    }

    #[test]
    fn unique_names_pass_through_when_no_collision() {
        let mut definitions = defs(&["g_assets_all.bundle", "g_scenes_all.bundle"]);
        let mut handled = HashSet::new();
        let names = BundleNamer::assign_unique_names(&mut definitions, &mut handled).unwrap();
        assert_eq!(names, vec!["g_assets_all.bundle", "g_scenes_all.bundle"]);
    }

    #[test]
    fn collision_gets_numeric_suffix() {
        let mut definitions = defs(&["g_assets_all.bundle", "g_assets_all.bundle"]);
        let mut handled = HashSet::new();
        let names = BundleNamer::assign_unique_names(&mut definitions, &mut handled).unwrap();
        assert_eq!(names, vec!["g_assets_all.bundle", "g_assets_all1.bundle"]);
    }

    #[test]
    fn collisions_across_calls_share_the_handled_set() {
        let mut handled = HashSet::new();
        let mut first = defs(&["g_assets_all.bundle"]);
        let mut second = defs(&["g_assets_all.bundle"]);
        let n1 = BundleNamer::assign_unique_names(&mut first, &mut handled).unwrap();
        let n2 = BundleNamer::assign_unique_names(&mut second, &mut handled).unwrap();
        assert_eq!(n1[0], "g_assets_all.bundle");
        assert_eq!(n2[0], "g_assets_all1.bundle");
    }

    #[test]
    fn physical_name_is_deterministic_hash_of_logical() {
        let mut a = defs(&["g_assets_all.bundle"]);
        let mut b = defs(&["g_assets_all.bundle"]);
        BundleNamer::assign_unique_names(&mut a, &mut HashSet::new()).unwrap();
        BundleNamer::assign_unique_names(&mut b, &mut HashSet::new()).unwrap();
        assert_eq!(a[0].bundle_name, b[0].bundle_name);
        assert!(a[0].bundle_name.ends_with(".bundle"));
        assert_ne!(a[0].bundle_name, "g_assets_all.bundle");
    }

    #[test]
    fn colliding_raw_names_get_distinct_physical_names() {
        let mut definitions = defs(&["g_assets_all.bundle", "g_assets_all.bundle"]);
        BundleNamer::assign_unique_names(&mut definitions, &mut HashSet::new()).unwrap();
        assert_ne!(definitions[0].bundle_name, definitions[1].bundle_name);
    }

    #[test]
    fn append_hash_style_embeds_content_hash() {
        let mut allocator = FinalNameAllocator::new();
        let name = allocator
            .allocate("grp", &NamingStyle::AppendHash, "seed_assets_all.bundle", "cafe01")
            .unwrap();
        assert_eq!(name, "grp_assets_all_cafe01.bundle");
    }

    #[test]
    fn no_hash_style_omits_hash() {
        let mut allocator = FinalNameAllocator::new();
        let name = allocator
            .allocate("grp", &NamingStyle::NoHash, "seed_assets_all.bundle", "cafe01")
            .unwrap();
        assert_eq!(name, "grp_assets_all.bundle");
    }

    #[test]
    fn custom_style_replaces_group_prefix() {
        let mut allocator = FinalNameAllocator::new();
        let name = allocator
            .allocate(
                "grp",
                &NamingStyle::Custom("dlc".to_string()),
                "seed_assets_all.bundle",
                "cafe01",
            )
            .unwrap();
        assert_eq!(name, "dlc_assets_all_cafe01.bundle");
    }

    #[test]
    fn filename_only_style_is_hash_alone() {
        let mut allocator = FinalNameAllocator::new();
        let name = allocator
            .allocate("grp", &NamingStyle::FileNameOnly, "seed_assets_all.bundle", "cafe01")
            .unwrap();
        assert_eq!(name, "cafe01.bundle");
    }

    #[test]
    fn final_names_never_collide() {
        let mut allocator = FinalNameAllocator::new();
        let a = allocator
            .allocate("grp", &NamingStyle::NoHash, "s1_assets_all.bundle", "h1")
            .unwrap();
        let b = allocator
            .allocate("grp", &NamingStyle::NoHash, "s2_assets_all.bundle", "h2")
            .unwrap();
        assert_eq!(a, "grp_assets_all.bundle");
        assert_eq!(b, "grp_assets_all1.bundle");
    }

    #[test]
    fn reserved_names_are_respected() {
        let mut allocator = FinalNameAllocator::new();
        allocator.reserve("grp_assets_all.bundle");
        let name = allocator
            .allocate("grp", &NamingStyle::NoHash, "seed_assets_all.bundle", "h")
            .unwrap();
        assert_eq!(name, "grp_assets_all1.bundle");
    }
}
