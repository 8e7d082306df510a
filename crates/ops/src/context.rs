//! Operations context for dependency injection

use rvx_catalog::{BundleLoader, ManifestBundleLoader, PatchCatalog};
use rvx_config::Config;
use rvx_engine::PatchEngine;
use rvx_errors::{Error, OpsError};
use rvx_events::{EventEmitter, EventSender};
use rvx_pipeline::RunLocks;
use rvx_signing::ArchiveSigner;
use std::sync::Arc;

/// Operations context providing access to all system components
pub struct OpsCtx {
    /// Loaded patches, shared by every operation
    pub catalog: Arc<PatchCatalog>,
    pub loader: Arc<dyn BundleLoader>,
    pub engine: Arc<dyn PatchEngine>,
    pub signer: Arc<dyn ArchiveSigner>,
    /// Paths owned by active runs
    pub run_locks: RunLocks,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// System configuration
    pub config: Config,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for operations context
pub struct OpsContextBuilder {
    catalog: Option<Arc<PatchCatalog>>,
    loader: Option<Arc<dyn BundleLoader>>,
    engine: Option<Arc<dyn PatchEngine>>,
    signer: Option<Arc<dyn ArchiveSigner>>,
    run_locks: Option<RunLocks>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: None,
            loader: None,
            engine: None,
            signer: None,
            run_locks: None,
            tx: None,
            config: None,
        }
    }

    /// Share an existing catalog; an empty one is created otherwise
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<PatchCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set bundle loader; defaults to [`ManifestBundleLoader`]
    #[must_use]
    pub fn with_bundle_loader(mut self, loader: Arc<dyn BundleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set patch engine
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn PatchEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set archive signer
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn ArchiveSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Share run locks with another context
    #[must_use]
    pub fn with_run_locks(mut self, run_locks: RunLocks) -> Self {
        self.run_locks = Some(run_locks);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let engine = self.engine.ok_or_else(|| OpsError::MissingComponent {
            component: "engine".to_string(),
        })?;

        let signer = self.signer.ok_or_else(|| OpsError::MissingComponent {
            component: "signer".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        Ok(OpsCtx {
            catalog: self.catalog.unwrap_or_default(),
            loader: self
                .loader
                .unwrap_or_else(|| Arc::new(ManifestBundleLoader)),
            engine,
            signer,
            run_locks: self.run_locks.unwrap_or_default(),
            tx,
            config,
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
