//! Fixed progress updates emitted when a stage is entered

use rvx_types::{PipelineStage, ProgressUpdate};

pub const COPY: f64 = 0.1;
pub const UNPACK: f64 = 0.2;
pub const INTEGRATIONS: f64 = 0.3;
pub const MERGE: f64 = 0.4;
pub const APPLY: f64 = 0.5;
pub const REPACK: f64 = 0.7;
pub const SIGN: f64 = 0.9;
pub const DONE: f64 = 1.0;

/// Update announcing `stage`
#[must_use]
pub fn entered(stage: PipelineStage) -> ProgressUpdate {
    match stage {
        PipelineStage::Copy => ProgressUpdate::new(COPY, "", "Copying original apk"),
        PipelineStage::Unpack => {
            ProgressUpdate::new(UNPACK, "Unpacking apk...", "Unpacking input apk")
        }
        PipelineStage::Integrations => ProgressUpdate::new(INTEGRATIONS, "", ""),
        PipelineStage::Apply => ProgressUpdate::new(APPLY, "Applying patches...", ""),
        PipelineStage::Repack => {
            ProgressUpdate::new(REPACK, "Repacking apk...", "Repacking patched apk")
        }
        PipelineStage::Sign => ProgressUpdate::new(SIGN, "Signing apk...", ""),
        PipelineStage::Done => ProgressUpdate::new(DONE, "Finished!", "Finished!"),
    }
}

/// Second update of the integrations stage, sent right before merging
#[must_use]
pub fn merging_integrations() -> ProgressUpdate {
    ProgressUpdate::new(MERGE, "Merging integrations...", "Merging integrations")
}

#[must_use]
pub fn patch_applied(patch: &str) -> ProgressUpdate {
    ProgressUpdate::new(APPLY, "", format!("Applied {patch}"))
}

#[must_use]
pub fn patch_failed(patch: &str, reason: &str) -> ProgressUpdate {
    ProgressUpdate::new(APPLY, "", format!("Failed to apply {patch}: {reason}"))
}

#[must_use]
pub fn signing_failed(message: &str) -> ProgressUpdate {
    ProgressUpdate::log_only(format!("Error signing apk: {message}"))
}

/// Terminal update of an aborted run
#[must_use]
pub fn aborted(diagnostic: &str) -> ProgressUpdate {
    ProgressUpdate::new(
        ProgressUpdate::ABORTED,
        "Aborting...",
        format!("An error occurred! Aborting\nError:\n{diagnostic}"),
    )
}
