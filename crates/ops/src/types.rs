use rvx_errors::{Error, OpsError};
use rvx_types::{PatchMetadata, RunReport};
use serde::Serialize;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Patches added by bundle loads
    Loaded(usize),
    /// Package names the catalog covers
    PackageList(Vec<String>),
    /// Patch records for a target
    PatchList(Vec<PatchMetadata>),
    /// Whether a selection needs resource decoding
    ResourcePatching(bool),
    /// Outcome of a patch run
    RunReport(RunReport),
    /// Generic success message
    Success(String),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Check if this is a success result
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::RunReport(report) => report.finished(),
            _ => true,
        }
    }
}
