//! Patch pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipelineError {
    #[error("failed to copy original package {from} to {to}: {message}")]
    CopyFailed {
        from: String,
        to: String,
        message: String,
    },

    #[error("{stage} stage failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("a patch run is already active for {path}")]
    RunInProgress { path: String },

    #[error("patch run worker failed: {message}")]
    WorkerFailed { message: String },
}

impl UserFacingError for PipelineError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RunInProgress { .. } => {
                Some("Wait for the running patch job to finish or use another cache directory.")
            }
            Self::CopyFailed { .. } => Some("Check that the original package exists and is readable."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::RunInProgress { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::CopyFailed { .. } => "pipeline.copy_failed",
            Self::StageFailed { .. } => "pipeline.stage_failed",
            Self::RunInProgress { .. } => "pipeline.run_in_progress",
            Self::WorkerFailed { .. } => "pipeline.worker_failed",
        })
    }
}
