//! Archive read/write error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArchiveError {
    #[error("failed to open archive {path}: {message}")]
    OpenFailed { path: String, message: String },

    #[error("failed to read entry {entry}: {message}")]
    ReadFailed { entry: String, message: String },

    #[error("failed to write entry {entry}: {message}")]
    WriteFailed { entry: String, message: String },

    #[error("entry not found: {entry}")]
    EntryNotFound { entry: String },

    #[error("failed to finalize archive {path}: {message}")]
    FinalizeFailed { path: String, message: String },

    #[error("zip error: {message}")]
    Zip { message: String },
}

impl UserFacingError for ArchiveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::OpenFailed { .. } => "archive.open_failed",
            Self::ReadFailed { .. } => "archive.read_failed",
            Self::WriteFailed { .. } => "archive.write_failed",
            Self::EntryNotFound { .. } => "archive.entry_not_found",
            Self::FinalizeFailed { .. } => "archive.finalize_failed",
            Self::Zip { .. } => "archive.zip",
        })
    }
}
