//! Normalized progress tuple reported while a patch run executes

use serde::{Deserialize, Serialize};

/// One progress report: `{progress, header, log}`.
///
/// `progress` lies in `[-100.0, 1.0]`. Non-negative values are stage
/// fractions; [`LOG_ONLY`](Self::LOG_ONLY) marks a plain log line and
/// [`ABORTED`](Self::ABORTED) marks an aborted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress: f64,
    pub header: String,
    pub log: String,
}

impl ProgressUpdate {
    pub const LOG_ONLY: f64 = -1.0;
    pub const ABORTED: f64 = -100.0;

    pub fn new(progress: f64, header: impl Into<String>, log: impl Into<String>) -> Self {
        Self {
            progress,
            header: header.into(),
            log: log.into(),
        }
    }

    /// Log line that is not a stage transition
    pub fn log_only(log: impl Into<String>) -> Self {
        Self::new(Self::LOG_ONLY, "", log)
    }

    #[must_use]
    pub fn is_log_only(&self) -> bool {
        (self.progress - Self::LOG_ONLY).abs() < f64::EPSILON
    }

    #[must_use]
    pub fn is_abort(&self) -> bool {
        (self.progress - Self::ABORTED).abs() < f64::EPSILON
    }
}
