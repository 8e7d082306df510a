use super::FailureContext;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Patch catalog domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// Bundle load started
    LoadStarted { bundle: PathBuf },

    /// Bundle loaded and appended to the catalog
    LoadCompleted {
        bundle: PathBuf,
        /// Patches added by this bundle
        loaded: usize,
        /// Catalog size after the load
        total: usize,
    },

    /// Bundle load failed; the catalog is unchanged
    LoadFailed {
        bundle: PathBuf,
        failure: FailureContext,
    },

    /// A catalog query finished
    QueryCompleted { query: CatalogQuery, results: usize },
}

/// Catalog query kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogQuery {
    CompatiblePackages,
    FilteredPatches,
    ResourcePatching,
}
