/// Sink for engine diagnostics. Called synchronously from the engine.
pub trait EngineLogger: Send + Sync {
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn trace(&self, message: &str);
}

/// Forwards engine diagnostics to `tracing` only
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl EngineLogger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "rvx::engine", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "rvx::engine", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "rvx::engine", "{message}");
    }

    fn trace(&self, message: &str) {
        tracing::trace!(target: "rvx::engine", "{message}");
    }
}
