//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpsError {
    #[error("operation failed: {message}")]
    OperationFailed { message: String },

    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("context creation failed: {message}")]
    ContextCreationFailed { message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("no patches specified")]
    NoPatchesSpecified,

    #[error("background task failed: {message}")]
    TaskFailed { message: String },
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoPatchesSpecified => Some("Pass at least one patch name."),
            Self::MissingComponent { .. } => {
                Some("This is a wiring bug in the host application; please report it.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::OperationFailed { .. } => "ops.operation_failed",
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::ContextCreationFailed { .. } => "ops.context_creation_failed",
            Self::SerializationError { .. } => "ops.serialization",
            Self::NoPatchesSpecified => "ops.no_patches",
            Self::TaskFailed { .. } => "ops.task_failed",
        })
    }
}
