//! Patch engine error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    #[error("failed to initialize patch engine: {message}")]
    InitializationFailed { message: String },

    #[error("failed to merge integrations: {message}")]
    IntegrationFailed { message: String },

    #[error("patch execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("failed to save engine output: {message}")]
    SaveFailed { message: String },

    #[error("engine command {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("malformed engine output: {message}")]
    ProtocolError { message: String },
}

impl UserFacingError for EngineError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Check `patcher.engine_command` in the configuration file.")
            }
            Self::ProtocolError { .. } => {
                Some("The patch engine speaks an unsupported protocol version.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InitializationFailed { .. } => "engine.initialization_failed",
            Self::IntegrationFailed { .. } => "engine.integration_failed",
            Self::ExecutionFailed { .. } => "engine.execution_failed",
            Self::SaveFailed { .. } => "engine.save_failed",
            Self::CommandFailed { .. } => "engine.command_failed",
            Self::ProtocolError { .. } => "engine.protocol_error",
        })
    }
}
