//! Owned, lock-guarded registry of loaded patches

use crate::bundle::BundleLoader;
use crate::graph::DependencyGraph;
use crate::matcher::declaration_matches;
use crate::selection;
use rvx_errors::{CatalogError, Error, OpsError};
use rvx_types::{PatchDescriptor, PatchKind, PatchMetadata, PatchSelection, VersionPolicy};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Insertion-ordered collection of patch descriptors.
///
/// Loads append atomically under the write lock; queries run against a
/// [`CatalogSnapshot`] so no lock is held while they compute.
#[derive(Debug, Default)]
pub struct PatchCatalog {
    patches: RwLock<Vec<Arc<PatchDescriptor>>>,
}

impl PatchCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a bundle and append its patches.
    ///
    /// `work_dir` is created if absent. The loader runs on a blocking worker.
    /// On any failure the catalog keeps its prior content.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be loaded or its patches would
    /// break catalog invariants (duplicate names, unknown dependencies, cycles).
    pub async fn load(
        &self,
        loader: Arc<dyn BundleLoader>,
        bundle: &Path,
        work_dir: &Path,
    ) -> Result<Vec<Arc<PatchDescriptor>>, Error> {
        tokio::fs::create_dir_all(work_dir).await?;

        let bundle_path = bundle.to_path_buf();
        let work_path = work_dir.to_path_buf();
        let batch = tokio::task::spawn_blocking(move || loader.load(&bundle_path, &work_path))
            .await
            .map_err(|e| OpsError::TaskFailed {
                message: e.to_string(),
            })??;

        self.append(batch).await
    }

    /// Validate a batch of descriptors and append it as a whole
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the batch is rejected.
    pub async fn append(
        &self,
        batch: Vec<PatchDescriptor>,
    ) -> Result<Vec<Arc<PatchDescriptor>>, Error> {
        let mut patches = self.patches.write().await;
        validate_batch(&patches, &batch)?;

        let added: Vec<_> = batch.into_iter().map(Arc::new).collect();
        patches.extend(added.iter().cloned());
        tracing::debug!(added = added.len(), total = patches.len(), "catalog extended");
        Ok(added)
    }

    /// Immutable view of the current content
    pub async fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            patches: self.patches.read().await.clone(),
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<PatchDescriptor>> {
        self.patches
            .read()
            .await
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.patches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.patches.read().await.is_empty()
    }
}

fn validate_batch(
    existing: &[Arc<PatchDescriptor>],
    batch: &[PatchDescriptor],
) -> Result<(), CatalogError> {
    let mut names: HashSet<&str> = existing.iter().map(|p| p.name.as_str()).collect();
    for patch in batch {
        if !names.insert(patch.name.as_str()) {
            return Err(CatalogError::DuplicatePatch {
                name: patch.name.clone(),
            });
        }
    }

    let graph = DependencyGraph::new(existing.iter().map(AsRef::as_ref).chain(batch));
    graph.check_references()?;
    graph.check_acyclic()
}

/// Point-in-time view of the catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    patches: Vec<Arc<PatchDescriptor>>,
}

impl CatalogSnapshot {
    /// Snapshot over an already validated list
    #[must_use]
    pub fn from_patches(patches: Vec<Arc<PatchDescriptor>>) -> Self {
        Self { patches }
    }

    #[must_use]
    pub fn patches(&self) -> &[Arc<PatchDescriptor>] {
        &self.patches
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<PatchDescriptor>> {
        self.patches.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Declared package names, deduplicated in first-seen order
    #[must_use]
    pub fn compatible_packages(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.patches
            .iter()
            .flat_map(|p| p.compatible_packages.iter())
            .filter(|pkg| seen.insert(pkg.name.as_str()))
            .map(|pkg| pkg.name.clone())
            .collect()
    }

    /// One metadata record per accepted (patch, declaration) pair.
    ///
    /// A patch listing the target package twice yields two records. Patches
    /// without declarations yield none.
    #[must_use]
    pub fn filtered_patches(
        &self,
        selection: &PatchSelection,
        policy: VersionPolicy,
    ) -> Vec<PatchMetadata> {
        let mut records = Vec::new();
        for patch in &self.patches {
            for declaration in &patch.compatible_packages {
                if declaration_matches(
                    declaration,
                    &selection.target_package,
                    &selection.target_version,
                    selection.ignore_version,
                    policy,
                ) {
                    records.push(patch.metadata());
                }
            }
        }
        records
    }

    /// Resolve selected names for `package_name`; see [`selection::resolve`]
    #[must_use]
    pub fn resolve<S: AsRef<str>>(
        &self,
        selected: &[S],
        package_name: &str,
    ) -> Vec<Arc<PatchDescriptor>> {
        selection::resolve(&self.patches, selected, package_name)
    }

    /// Whether any resolved patch, or anything it depends on, is a resource patch
    ///
    /// # Errors
    ///
    /// Returns `DependencyCycle` if traversal runs into a cycle.
    pub fn needs_resource_patching<S: AsRef<str>>(
        &self,
        selected: &[S],
        package_name: &str,
    ) -> Result<bool, CatalogError> {
        let resolved = self.resolve(selected, package_name);
        if resolved.is_empty() {
            return Ok(false);
        }
        let graph = DependencyGraph::new(self.patches.iter().map(AsRef::as_ref));
        graph.any_reachable(resolved.iter().map(AsRef::as_ref), |p| {
            p.kind == PatchKind::Resource
        })
    }
}
