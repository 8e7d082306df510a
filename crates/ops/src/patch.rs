//! Patch run entry point

use crate::OpsCtx;
use rvx_errors::{Error, PipelineError};
use rvx_events::EventEmitter;
use rvx_pipeline::{PatchPipeline, PatcherRequest, RunRecorder};
use rvx_types::RunReport;
use std::sync::Arc;
use uuid::Uuid;

/// Run the patch pipeline for one request
///
/// The run claims the request's cache dir, working input and patched paths
/// for its whole duration. Stage failures do not surface here; they end up
/// in the returned report and on the event channel.
///
/// # Errors
///
/// Returns `RunInProgress` if another run holds any of the claimed paths,
/// or `WorkerFailed` if the run worker panics.
pub async fn run_patcher(ctx: &OpsCtx, request: PatcherRequest) -> Result<RunReport, Error> {
    let run_id = Uuid::new_v4();
    let claim = ctx.run_locks.claim(run_id, request.claimed_paths())?;

    let snapshot = ctx.catalog.snapshot().await;
    let recorder = Arc::new(RunRecorder::new(
        run_id,
        ctx.event_sender().cloned(),
        request.patched.clone(),
        request.output.clone(),
    ));
    let pipeline = PatchPipeline::new(ctx.engine.clone(), ctx.signer.clone())
        .with_resource_tool(ctx.config.patcher.resource_tool.clone());

    tracing::info!(
        %run_id,
        original = %request.original.display(),
        patches = request.selected_patches.len(),
        "starting patch run"
    );

    let report = tokio::task::spawn_blocking(move || {
        let _claim = claim;
        pipeline.run(&request, &snapshot, &recorder)
    })
    .await
    .map_err(|e| PipelineError::WorkerFailed {
        message: e.to_string(),
    })?;

    tracing::info!(
        %run_id,
        finished = report.finished(),
        applied = report.applied.len(),
        failed = report.failed.len(),
        "patch run ended"
    );
    Ok(report)
}
