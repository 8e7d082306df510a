//! Selection resolution against the loaded patches

use rvx_types::PatchDescriptor;
use std::sync::Arc;

/// Patches picked by name that target `package_name`, in catalog order.
///
/// Patches without declarations are kept for any package. Versions are not
/// re-checked here.
#[must_use]
pub fn resolve<S: AsRef<str>>(
    patches: &[Arc<PatchDescriptor>],
    selected: &[S],
    package_name: &str,
) -> Vec<Arc<PatchDescriptor>> {
    patches
        .iter()
        .filter(|patch| selected.iter().any(|s| s.as_ref() == patch.name))
        .filter(|patch| patch.is_universal() || patch.declares_package(package_name))
        .cloned()
        .collect()
}
