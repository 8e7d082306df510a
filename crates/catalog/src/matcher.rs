//! Compatibility matching between patches and a target package

use rvx_types::{CompatiblePackage, PatchDescriptor, VersionPolicy};

/// Decide whether `patch` applies to `target_package` at `target_version`.
///
/// A patch without declarations is compatible with every target. Otherwise
/// some declaration must name the target package and pass the version clause
/// of `policy`.
#[must_use]
pub fn is_compatible(
    patch: &PatchDescriptor,
    target_package: &str,
    target_version: &str,
    ignore_version: bool,
    policy: VersionPolicy,
) -> bool {
    patch.is_universal()
        || patch.compatible_packages.iter().any(|declaration| {
            declaration_matches(
                declaration,
                target_package,
                target_version,
                ignore_version,
                policy,
            )
        })
}

/// Check a single declaration against the target
#[must_use]
pub fn declaration_matches(
    declaration: &CompatiblePackage,
    target_package: &str,
    target_version: &str,
    ignore_version: bool,
    policy: VersionPolicy,
) -> bool {
    declaration.name == target_package
        && version_accepted(&declaration.versions, target_version, ignore_version, policy)
}

fn version_accepted(
    versions: &[String],
    target_version: &str,
    ignore_version: bool,
    policy: VersionPolicy,
) -> bool {
    if ignore_version {
        return true;
    }
    let listed = versions.iter().any(|v| v == target_version);
    match policy {
        VersionPolicy::Strict => versions.is_empty() || listed,
        VersionPolicy::Legacy => !versions.is_empty() || listed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn example_patch() -> PatchDescriptor {
        PatchDescriptor::new("hide-ads", "1.0.0")
            .with_compatible(CompatiblePackage::new("com.example", ["1.0"]))
    }

    #[test]
    fn test_version_mismatch_depends_on_policy() {
        let patch = example_patch();
        assert!(!is_compatible(&patch, "com.example", "2.0", false, VersionPolicy::Strict));
        assert!(is_compatible(&patch, "com.example", "2.0", false, VersionPolicy::Legacy));
    }

    #[test]
    fn test_listed_version_matches_under_both_policies() {
        let patch = example_patch();
        for policy in [VersionPolicy::Strict, VersionPolicy::Legacy] {
            assert!(is_compatible(&patch, "com.example", "1.0", false, policy));
        }
    }

    #[test]
    fn test_ignore_version() {
        let patch = example_patch();
        assert!(is_compatible(&patch, "com.example", "9.9", true, VersionPolicy::Strict));
    }

    #[test]
    fn test_other_package_never_matches() {
        let patch = example_patch();
        for policy in [VersionPolicy::Strict, VersionPolicy::Legacy] {
            assert!(!is_compatible(&patch, "com.other", "1.0", true, policy));
        }
    }

    #[test]
    fn test_empty_version_list() {
        let patch = PatchDescriptor::new("theme", "1.0.0")
            .with_compatible(CompatiblePackage::any_version("com.example"));
        assert!(is_compatible(&patch, "com.example", "3.1", false, VersionPolicy::Strict));
        // Legacy only accepts an empty list through an exact match, which cannot happen
        assert!(!is_compatible(&patch, "com.example", "3.1", false, VersionPolicy::Legacy));
    }

    proptest! {
        #[test]
        fn universal_patch_matches_any_target(
            package in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
            version in "[0-9]{1,3}(\\.[0-9]{1,3}){0,2}",
            ignore in any::<bool>(),
            legacy in any::<bool>(),
        ) {
            let policy = if legacy { VersionPolicy::Legacy } else { VersionPolicy::Strict };
            let patch = PatchDescriptor::new("universal", "1.0.0");
            prop_assert!(is_compatible(&patch, &package, &version, ignore, policy));
        }

        #[test]
        fn strict_accepts_exactly_listed_versions(
            versions in proptest::collection::vec("[0-9]\\.[0-9]", 1..5),
            target in "[0-9]\\.[0-9]",
        ) {
            let patch = PatchDescriptor::new("p", "1")
                .with_compatible(CompatiblePackage::new("com.example", versions.clone()));
            let expected = versions.contains(&target);
            prop_assert_eq!(
                is_compatible(&patch, "com.example", &target, false, VersionPolicy::Strict),
                expected
            );
            prop_assert!(is_compatible(&patch, "com.example", &target, false, VersionPolicy::Legacy));
        }
    }
}
