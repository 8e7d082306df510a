use crate::{EventLevel, ProgressUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Patch run domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatcherEvent {
    /// A run was accepted and is about to start
    RunStarted {
        run_id: Uuid,
        selected_patches: usize,
    },

    /// Stage transition or log line of a run
    Progress {
        run_id: Uuid,
        update: ProgressUpdate,
    },

    /// Diagnostic line from the patch engine
    EngineLog {
        run_id: Uuid,
        level: EventLevel,
        message: String,
    },

    /// The engine could not apply a patch; the run continues
    PatchFailed {
        run_id: Uuid,
        patch: String,
        reason: String,
    },

    /// Signing failed; the unsigned archive is left in place
    SigningFailed { run_id: Uuid, message: String },

    /// The run reached a terminal path (done or aborted)
    RunFinished {
        run_id: Uuid,
        finished: bool,
        aborted: bool,
        failed_patches: usize,
        duration_ms: u64,
    },
}
