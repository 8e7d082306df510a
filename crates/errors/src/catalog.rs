//! Patch catalog error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatalogError {
    #[error("failed to load patch bundle {path}: {message}")]
    BundleLoadFailed { path: String, message: String },

    #[error("invalid patch bundle {path}: {message}")]
    InvalidBundle { path: String, message: String },

    #[error("patch '{name}' is already loaded")]
    DuplicatePatch { name: String },

    #[error("patch '{patch}' depends on unknown patch '{dependency}'")]
    UnresolvedDependency { patch: String, dependency: String },

    #[error("dependency cycle detected: {cycle}")]
    DependencyCycle { cycle: String },

    #[error("patch not found: {name}")]
    PatchNotFound { name: String },
}

impl UserFacingError for CatalogError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::BundleLoadFailed { .. } | Self::InvalidBundle { .. } => {
                Some("Check that the bundle path points to a valid patch bundle.")
            }
            Self::DuplicatePatch { .. } => {
                Some("The bundle was already loaded; restart to start from an empty catalog.")
            }
            Self::UnresolvedDependency { .. } | Self::DependencyCycle { .. } => {
                Some("The patch bundle is malformed; use a bundle built for this manager.")
            }
            Self::PatchNotFound { .. } => Some("List available patches with `rvx patches`."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::BundleLoadFailed { .. } => "catalog.bundle_load_failed",
            Self::InvalidBundle { .. } => "catalog.invalid_bundle",
            Self::DuplicatePatch { .. } => "catalog.duplicate_patch",
            Self::UnresolvedDependency { .. } => "catalog.unresolved_dependency",
            Self::DependencyCycle { .. } => "catalog.dependency_cycle",
            Self::PatchNotFound { .. } => "catalog.patch_not_found",
        })
    }
}
