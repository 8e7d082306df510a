//! Report type definitions for operations

use crate::ProgressUpdate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Ordered stages of a patch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Copy,
    Unpack,
    Integrations,
    Apply,
    Repack,
    Sign,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Copy => "copy",
            Self::Unpack => "unpack",
            Self::Integrations => "integrations",
            Self::Apply => "apply",
            Self::Repack => "repack",
            Self::Sign => "sign",
            Self::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// A patch the engine could not apply
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFailureRecord {
    pub patch: String,
    pub reason: String,
}

/// Result of the signing stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SigningOutcome {
    #[default]
    NotAttempted,
    Signed { output: PathBuf },
    Failed { message: String },
}

/// Why a run stopped early
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortRecord {
    pub stage: PipelineStage,
    pub diagnostic: String,
}

/// Patch run report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Package name reported by the engine once unpacked
    pub package_name: Option<String>,
    /// Stages entered, in order
    pub stages: Vec<PipelineStage>,
    /// Every progress update emitted for this run, in order
    pub updates: Vec<ProgressUpdate>,
    pub applied: Vec<String>,
    pub failed: Vec<PatchFailureRecord>,
    pub signing: SigningOutcome,
    pub aborted: Option<AbortRecord>,
    /// Repacked, unsigned archive
    pub patched_path: PathBuf,
    /// Signed archive location
    pub output_path: PathBuf,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(run_id: Uuid, patched_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            run_id,
            package_name: None,
            stages: Vec::new(),
            updates: Vec::new(),
            applied: Vec::new(),
            failed: Vec::new(),
            signing: SigningOutcome::NotAttempted,
            aborted: None,
            patched_path,
            output_path,
            duration_ms: 0,
        }
    }

    /// The run reached the terminal stage
    #[must_use]
    pub fn finished(&self) -> bool {
        self.stages.last() == Some(&PipelineStage::Done)
    }

    #[must_use]
    pub fn reached(&self, stage: PipelineStage) -> bool {
        self.stages.contains(&stage)
    }

    #[must_use]
    pub fn is_signed(&self) -> bool {
        matches!(self.signing, SigningOutcome::Signed { .. })
    }

    /// Finished, signed, and every patch applied
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.finished() && self.is_signed() && self.failed.is_empty()
    }

    /// Best artifact the run left behind
    #[must_use]
    pub fn artifact(&self) -> Option<&PathBuf> {
        if !self.finished() {
            None
        } else if self.is_signed() {
            Some(&self.output_path)
        } else {
            Some(&self.patched_path)
        }
    }
}
