use crate::recorder::RunRecorder;
use rvx_engine::EngineLogger;
use rvx_events::EventLevel;
use std::sync::Arc;

/// Engine logger that feeds the run's progress stream.
///
/// Error, warning and info lines become log-only updates; trace lines only
/// reach `tracing`.
pub struct ChannelLogger {
    recorder: Arc<RunRecorder>,
}

impl ChannelLogger {
    #[must_use]
    pub fn new(recorder: Arc<RunRecorder>) -> Self {
        Self { recorder }
    }
}

impl EngineLogger for ChannelLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "rvx::engine", run_id = %self.recorder.run_id(), "{message}");
        self.recorder.engine_log(EventLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "rvx::engine", run_id = %self.recorder.run_id(), "{message}");
        self.recorder.engine_log(EventLevel::Warn, message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "rvx::engine", run_id = %self.recorder.run_id(), "{message}");
        self.recorder.engine_log(EventLevel::Info, message);
    }

    fn trace(&self, message: &str) {
        tracing::trace!(target: "rvx::engine", run_id = %self.recorder.run_id(), "{message}");
        self.recorder.engine_log(EventLevel::Trace, message);
    }
}
