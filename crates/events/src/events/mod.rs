use serde::{Deserialize, Serialize};

use crate::EventSource;
use rvx_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Optional stable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod catalog;
pub mod general;
pub mod patcher;

pub use catalog::*;
pub use general::*;
pub use patcher::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Patch catalog events (bundle loads, queries)
    Catalog(CatalogEvent),

    /// Patch run events (progress stream, run lifecycle)
    Patcher(PatcherEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Catalog(_) => EventSource::CATALOG,
            Self::Patcher(PatcherEvent::EngineLog { .. }) => EventSource::ENGINE,
            Self::Patcher(_) => EventSource::PATCHER,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Error-level events
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Catalog(CatalogEvent::LoadFailed { .. }) => Level::ERROR,

            Self::Patcher(PatcherEvent::Progress { update, .. }) if update.is_abort() => {
                Level::ERROR
            }

            Self::Patcher(PatcherEvent::PatchFailed { .. } | PatcherEvent::SigningFailed { .. }) => {
                Level::WARN
            }

            Self::Patcher(PatcherEvent::EngineLog { level, .. }) => (*level).into(),

            // Warning-level events
            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            // Debug-level events (log lines, internal state)
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Catalog(CatalogEvent::QueryCompleted { .. }) => Level::DEBUG,

            Self::Patcher(PatcherEvent::Progress { update, .. }) if update.is_log_only() => {
                Level::DEBUG
            }

            // Default to INFO for most events
            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "rvx::events::general",
            Self::Catalog(_) => "rvx::events::catalog",
            Self::Patcher(_) => "rvx::events::patcher",
        }
    }

    /// Progress update carried by this event, if any
    #[must_use]
    pub fn as_progress(&self) -> Option<&crate::ProgressUpdate> {
        match self {
            Self::Patcher(PatcherEvent::Progress { update, .. }) => Some(update),
            _ => None,
        }
    }
}
