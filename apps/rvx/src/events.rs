//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{Style, Term};
use rvx_events::{AppEvent, CatalogEvent, EventMessage, GeneralEvent, PatcherEvent};
use rvx_types::ProgressUpdate;

/// Prints run progress and catalog messages to stderr as events arrive
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// No console output at all; events are only logged
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::Patcher(PatcherEvent::Progress { update, .. }) => {
                self.show_progress(&update);
            }
            AppEvent::Patcher(PatcherEvent::EngineLog { message, .. }) if self.debug_enabled => {
                self.show_line(&message, &Style::new().dim());
            }
            AppEvent::Catalog(CatalogEvent::LoadCompleted { bundle, loaded, .. }) => {
                self.show_line(
                    &format!("Loaded {loaded} patches from {}", bundle.display()),
                    &Style::new().dim(),
                );
            }
            AppEvent::Catalog(CatalogEvent::LoadFailed { bundle, failure }) => {
                self.show_line(
                    &format!("Failed to load {}: {}", bundle.display(), failure.message),
                    &Style::new().red(),
                );
            }
            AppEvent::General(GeneralEvent::Warning { message, .. }) => {
                self.show_line(&format!("Warning: {message}"), &Style::new().yellow());
            }
            AppEvent::General(GeneralEvent::Error { message, details }) => {
                let text = match details {
                    Some(details) => format!("Error: {message}: {details}"),
                    None => format!("Error: {message}"),
                };
                self.show_line(&text, &Style::new().red());
            }
            AppEvent::General(GeneralEvent::OperationStarted { operation }) => {
                self.show_line(&format!("{operation}..."), &Style::new());
            }
            AppEvent::General(GeneralEvent::OperationFailed { operation, error }) => {
                self.show_line(&format!("{operation} failed: {error}"), &Style::new().red());
            }
            // Failures are already reported through progress log lines
            _ => {}
        }
    }

    fn show_progress(&self, update: &ProgressUpdate) {
        if update.is_abort() {
            self.show_line(&update.header, &Style::new().red().bold());
            for line in update.log.lines() {
                self.show_line(line, &Style::new().red());
            }
            return;
        }

        if !update.header.is_empty() {
            let percent = (update.progress * 100.0).round();
            self.show_line(
                &format!("[{percent:>3}%] {}", update.header),
                &Style::new().bold(),
            );
        }
        if !update.log.is_empty() {
            let style = if update.log.starts_with("Failed") || update.log.starts_with("Error") {
                Style::new().yellow()
            } else {
                Style::new().dim()
            };
            self.show_line(&format!("      {}", update.log), &style);
        }
    }

    fn show_line(&self, message: &str, style: &Style) {
        let line = if self.colors_enabled {
            style.apply_to(message).to_string()
        } else {
            message.to_string()
        };
        self.term.write_line(&line).unwrap_or(());
    }
}
