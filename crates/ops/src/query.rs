//! Catalog loading and queries

use crate::OpsCtx;
use rvx_catalog::CatalogSnapshot;
use rvx_errors::{Error, OpsError};
use rvx_events::{AppEvent, CatalogEvent, CatalogQuery, EventEmitter, FailureContext};
use rvx_types::{PatchMetadata, PatchSelection};
use std::path::Path;

/// Load a patch bundle into the shared catalog
///
/// Bundle contents are extracted under `cache_dir`. On failure the catalog
/// keeps its prior content and a `LoadFailed` event is emitted.
///
/// # Errors
///
/// Returns an error if the bundle cannot be read or its patches conflict
/// with the catalog.
pub async fn load_patches(ctx: &OpsCtx, bundle: &Path, cache_dir: &Path) -> Result<usize, Error> {
    ctx.emit(AppEvent::Catalog(CatalogEvent::LoadStarted {
        bundle: bundle.to_path_buf(),
    }));

    match ctx
        .catalog
        .load(ctx.loader.clone(), bundle, cache_dir)
        .await
    {
        Ok(added) => {
            let total = ctx.catalog.len().await;
            tracing::info!(bundle = %bundle.display(), loaded = added.len(), total, "bundle loaded");
            ctx.emit(AppEvent::Catalog(CatalogEvent::LoadCompleted {
                bundle: bundle.to_path_buf(),
                loaded: added.len(),
                total,
            }));
            Ok(added.len())
        }
        Err(e) => {
            ctx.emit(AppEvent::Catalog(CatalogEvent::LoadFailed {
                bundle: bundle.to_path_buf(),
                failure: FailureContext::from_error(&e),
            }));
            Err(e)
        }
    }
}

/// Every package name declared by any loaded patch
///
/// # Errors
///
/// Returns an error if the query worker fails.
pub async fn compatible_packages(ctx: &OpsCtx) -> Result<Vec<String>, Error> {
    let packages = on_snapshot(ctx, |snapshot| Ok(snapshot.compatible_packages())).await?;
    emit_query(ctx, CatalogQuery::CompatiblePackages, packages.len());
    Ok(packages)
}

/// Metadata records for patches compatible with a target
///
/// Uses the configured version policy. One record is returned per matching
/// declaration.
///
/// # Errors
///
/// Returns an error if the query worker fails.
pub async fn filtered_patches(
    ctx: &OpsCtx,
    target_package: &str,
    target_version: &str,
    ignore_version: bool,
) -> Result<Vec<PatchMetadata>, Error> {
    let selection =
        PatchSelection::for_target(target_package, target_version).ignoring_version(ignore_version);
    let policy = ctx.config.patcher.version_policy;

    let records = on_snapshot(ctx, move |snapshot| {
        Ok(snapshot.filtered_patches(&selection, policy))
    })
    .await?;
    emit_query(ctx, CatalogQuery::FilteredPatches, records.len());
    Ok(records)
}

/// Whether the selection, or anything it depends on, patches resources
///
/// # Errors
///
/// Returns an error if a dependency cycle is found or the worker fails.
pub async fn needs_resource_patching(
    ctx: &OpsCtx,
    selected_patches: &[String],
    package_name: &str,
) -> Result<bool, Error> {
    let selected = selected_patches.to_vec();
    let package = package_name.to_string();

    let needed = on_snapshot(ctx, move |snapshot| {
        snapshot
            .needs_resource_patching(&selected, &package)
            .map_err(Error::from)
    })
    .await?;
    emit_query(ctx, CatalogQuery::ResourcePatching, usize::from(needed));
    Ok(needed)
}

async fn on_snapshot<T, F>(ctx: &OpsCtx, query: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce(&CatalogSnapshot) -> Result<T, Error> + Send + 'static,
{
    let snapshot = ctx.catalog.snapshot().await;
    tokio::task::spawn_blocking(move || query(&snapshot))
        .await
        .map_err(|e| OpsError::TaskFailed {
            message: e.to_string(),
        })?
}

fn emit_query(ctx: &OpsCtx, query: CatalogQuery, results: usize) {
    ctx.emit(AppEvent::Catalog(CatalogEvent::QueryCompleted { query, results }));
}
