//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields, and
//! sets up the subscriber for the current output mode.

use rvx_events::{AppEvent, CatalogEvent, EventMessage, GeneralEvent, PatcherEvent};
use std::path::Path;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::EnvFilter;

const DEBUG_FILTER: &str = "info,rvx=debug,rvx_ops=debug,rvx_pipeline=debug,rvx_catalog=debug";
const DEFAULT_FILTER: &str = "warn,rvx=warn,rvx_ops=warn";

/// Initialize tracing for the given output mode
///
/// JSON mode keeps the console clean; debug mode writes JSON records to a
/// timestamped file under `log_dir`.
pub fn init_tracing(json_mode: bool, debug_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_flag;

    if debug_enabled {
        match create_log_file(log_dir) {
            Ok((file, path)) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| EnvFilter::new(DEBUG_FILTER)),
                    )
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", path.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
            )
            .init();
    }
}

fn create_log_file(log_dir: &Path) -> std::io::Result<(std::fs::File, std::path::PathBuf)> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!(
        "rvx-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let file = std::fs::File::create(&path)?;
    Ok((file, path))
}

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;

    match event {
        AppEvent::Catalog(catalog_event) => match catalog_event {
            CatalogEvent::LoadStarted { bundle } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    bundle = %bundle.display(),
                    "Bundle load started"
                );
            }
            CatalogEvent::LoadCompleted {
                bundle,
                loaded,
                total,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    bundle = %bundle.display(),
                    loaded = loaded,
                    total = total,
                    "Bundle loaded"
                );
            }
            CatalogEvent::LoadFailed { bundle, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    bundle = %bundle.display(),
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Bundle load failed"
                );
            }
            CatalogEvent::QueryCompleted { query, results } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    query = ?query,
                    results = results,
                    "Catalog query completed"
                );
            }
        },

        AppEvent::Patcher(patcher_event) => match patcher_event {
            PatcherEvent::Progress { run_id, update } => {
                if update.is_abort() {
                    error!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        run_id = %run_id,
                        header = %update.header,
                        log = %update.log,
                        "Patch run aborted"
                    );
                } else if update.is_log_only() {
                    debug!(
                        source = meta.source.as_str(),
                        run_id = %run_id,
                        log = %update.log,
                        "Patch run log"
                    );
                } else {
                    info!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        run_id = %run_id,
                        progress = update.progress,
                        header = %update.header,
                        log = %update.log,
                        "Patch run progress"
                    );
                }
            }
            PatcherEvent::PatchFailed {
                run_id,
                patch,
                reason,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    run_id = %run_id,
                    patch = %patch,
                    reason = %reason,
                    "Patch failed"
                );
            }
            PatcherEvent::RunFinished {
                run_id,
                finished,
                aborted,
                failed_patches,
                duration_ms,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    run_id = %run_id,
                    finished = finished,
                    aborted = aborted,
                    failed_patches = failed_patches,
                    duration_ms = duration_ms,
                    "Patch run finished"
                );
            }
            _ => log_at_level(message),
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    context = ?context,
                    "Warning"
                );
            }
            GeneralEvent::Error { message, details } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    details = ?details,
                    "Error"
                );
            }
            _ => log_at_level(message),
        },
    }
}

/// Fallback: log the whole event at the level carried by its metadata
fn log_at_level(message: &EventMessage) {
    let meta = &message.meta;
    let event = &message.event;
    match meta.tracing_level() {
        tracing::Level::ERROR => {
            error!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
        }
        tracing::Level::WARN => {
            warn!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
        }
        tracing::Level::INFO => {
            info!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
        }
        tracing::Level::DEBUG => {
            debug!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
        }
        tracing::Level::TRACE => {
            trace!(source = meta.source.as_str(), event_id = %meta.event_id, correlation = ?meta.correlation_id, event = ?event, "Application event");
        }
    }
}
