use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identity read from the package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub package_name: String,
    pub package_version: String,
}

/// Why the engine could not apply a patch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatchFailure {
    pub message: Option<String>,
    /// Type name of the underlying cause when there is no message
    pub cause_type: Option<String>,
}

impl PatchFailure {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            cause_type: None,
        }
    }

    pub fn with_cause(cause_type: impl Into<String>) -> Self {
        Self {
            message: None,
            cause_type: Some(cause_type.into()),
        }
    }

    /// Message, else cause type, else a fixed fallback
    #[must_use]
    pub fn describe(&self) -> &str {
        self.message
            .as_deref()
            .or(self.cause_type.as_deref())
            .unwrap_or("unknown error")
    }
}

impl fmt::Display for PatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Result of applying one patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub patch: String,
    pub result: Result<(), PatchFailure>,
}

impl PatchOutcome {
    pub fn applied(patch: impl Into<String>) -> Self {
        Self {
            patch: patch.into(),
            result: Ok(()),
        }
    }

    pub fn failed(patch: impl Into<String>, failure: PatchFailure) -> Self {
        Self {
            patch: patch.into(),
            result: Err(failure),
        }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }
}

/// A file produced by the engine that goes into the patched archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Entry name inside the archive
    pub name: String,
    pub path: PathBuf,
}

/// Everything the engine produced for repacking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub binaries: Vec<GeneratedFile>,
    /// Archive holding rebuilt resource entries, when resources were patched
    pub resource_archive: Option<PathBuf>,
}
