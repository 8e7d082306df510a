//! Integration tests for the event channel

#[cfg(test)]
mod tests {
    use rvx_events::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_progress_events_arrive_in_order() {
        let (tx, mut rx) = channel();
        let run_id = Uuid::new_v4();

        tx.emit_progress(run_id, ProgressUpdate::new(0.1, "", "Copying original apk"));
        tx.emit_progress(run_id, ProgressUpdate::log_only("engine says hi"));
        tx.emit_progress(run_id, ProgressUpdate::new(0.2, "Unpacking apk...", ""));
        drop(tx);

        let mut progress = Vec::new();
        while let Some(message) = rx.recv().await {
            assert_eq!(message.meta.source, EventSource::PATCHER);
            progress.push(message.event.as_progress().unwrap().progress);
        }
        assert_eq!(progress, vec![0.1, -1.0, 0.2]);
    }

    #[test]
    fn test_abort_progress_logs_at_error() {
        let event = AppEvent::Patcher(PatcherEvent::Progress {
            run_id: Uuid::new_v4(),
            update: ProgressUpdate::new(ProgressUpdate::ABORTED, "Aborting...", "boom"),
        });
        assert_eq!(event.log_level(), tracing::Level::ERROR);

        let message = EventMessage::from_event(event);
        assert_eq!(message.meta.level, EventLevel::Error);
    }

    #[test]
    fn test_engine_log_uses_engine_source() {
        let event = AppEvent::Patcher(PatcherEvent::EngineLog {
            run_id: Uuid::new_v4(),
            level: EventLevel::Warn,
            message: "resource table is large".into(),
        });
        assert_eq!(event.event_source(), EventSource::ENGINE);
        assert_eq!(event.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_emit_without_receiver_is_silent() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_warning("nobody is listening");
    }
}
