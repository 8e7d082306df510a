//! Run report accumulation and its projection onto the event channel

use crate::stages;
use rvx_engine::PatchOutcome;
use rvx_events::{AppEvent, EventEmitter, EventLevel, EventSender, PatcherEvent};
use rvx_types::{
    AbortRecord, PatchFailureRecord, PipelineStage, ProgressUpdate, RunReport, SigningOutcome,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

/// Records what a run does and mirrors each record as an event.
///
/// Shared between the pipeline and the engine logger, so every method takes
/// `&self`. Updates reach the channel in the order they are recorded.
pub struct RunRecorder {
    run_id: Uuid,
    tx: Option<EventSender>,
    started: Instant,
    report: Mutex<RunReport>,
}

impl EventEmitter for RunRecorder {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }

    fn correlation_id(&self) -> Option<String> {
        Some(self.run_id.to_string())
    }
}

impl RunRecorder {
    pub fn new(run_id: Uuid, tx: Option<EventSender>, patched: PathBuf, output: PathBuf) -> Self {
        Self {
            run_id,
            tx,
            started: Instant::now(),
            report: Mutex::new(RunReport::new(run_id, patched, output)),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn report(&self) -> MutexGuard<'_, RunReport> {
        self.report.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Announce the run before any stage executes
    pub fn started(&self, selected_patches: usize) {
        self.emit(AppEvent::Patcher(PatcherEvent::RunStarted {
            run_id: self.run_id,
            selected_patches,
        }));
    }

    /// Record and emit one progress update
    pub fn progress(&self, update: ProgressUpdate) {
        // hold the lock while sending so concurrent loggers cannot reorder
        let mut report = self.report();
        report.updates.push(update.clone());
        self.emit_progress(self.run_id, update);
    }

    /// Enter a stage and emit its fixed update
    pub fn stage(&self, stage: PipelineStage) {
        tracing::debug!(run_id = %self.run_id, %stage, "entering stage");
        self.report().stages.push(stage);
        self.progress(stages::entered(stage));
    }

    pub fn set_package(&self, package_name: &str) {
        self.report().package_name = Some(package_name.to_string());
    }

    /// Engine diagnostic line; everything above trace becomes a log-only update
    pub fn engine_log(&self, level: EventLevel, message: &str) {
        self.emit(AppEvent::Patcher(PatcherEvent::EngineLog {
            run_id: self.run_id,
            level,
            message: message.to_string(),
        }));
        if level != EventLevel::Trace {
            self.progress(ProgressUpdate::log_only(message));
        }
    }

    pub fn patch_outcome(&self, outcome: &PatchOutcome) {
        match &outcome.result {
            Ok(()) => {
                tracing::info!(run_id = %self.run_id, patch = %outcome.patch, "patch applied");
                self.report().applied.push(outcome.patch.clone());
                self.progress(stages::patch_applied(&outcome.patch));
            }
            Err(failure) => {
                let reason = failure.describe().to_string();
                tracing::error!(
                    run_id = %self.run_id,
                    patch = %outcome.patch,
                    reason = %reason,
                    "patch failed"
                );
                self.report().failed.push(PatchFailureRecord {
                    patch: outcome.patch.clone(),
                    reason: reason.clone(),
                });
                self.emit(AppEvent::Patcher(PatcherEvent::PatchFailed {
                    run_id: self.run_id,
                    patch: outcome.patch.clone(),
                    reason: reason.clone(),
                }));
                self.progress(stages::patch_failed(&outcome.patch, &reason));
            }
        }
    }

    pub fn signed(&self, output: PathBuf) {
        self.report().signing = SigningOutcome::Signed { output };
    }

    /// Signing failure: logged and recorded, the run goes on
    pub fn signing_failed(&self, message: &str) {
        tracing::error!(run_id = %self.run_id, error = %message, "error signing apk");
        self.report().signing = SigningOutcome::Failed {
            message: message.to_string(),
        };
        self.emit(AppEvent::Patcher(PatcherEvent::SigningFailed {
            run_id: self.run_id,
            message: message.to_string(),
        }));
        self.progress(stages::signing_failed(message));
    }

    /// Record the abort and emit the terminal abort update
    pub fn abort(&self, stage: PipelineStage, diagnostic: &str) {
        tracing::error!(run_id = %self.run_id, %stage, "patch run aborted: {diagnostic}");
        self.report().aborted = Some(AbortRecord {
            stage,
            diagnostic: diagnostic.to_string(),
        });
        self.progress(stages::aborted(diagnostic));
    }

    /// Close the report and announce the outcome
    pub fn finish(&self) -> RunReport {
        let mut report = self.report().clone();
        report.duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.emit(AppEvent::Patcher(PatcherEvent::RunFinished {
            run_id: self.run_id,
            finished: report.finished(),
            aborted: report.aborted.is_some(),
            failed_patches: report.failed.len(),
            duration_ms: report.duration_ms,
        }));
        report
    }
}
