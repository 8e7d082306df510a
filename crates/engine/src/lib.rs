#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Patch engine interface for rvx
//!
//! The pipeline never rewrites bytecode or resources itself. It opens a
//! [`PatchSession`] on the working input, hands it integrations and the
//! resolved patches, and collects the generated files afterwards.

mod logger;
mod outcome;
mod process;

pub use logger::{EngineLogger, TracingLogger};
pub use outcome::{EngineOutput, GeneratedFile, PackageMetadata, PatchFailure, PatchOutcome};
pub use process::ProcessEngine;

use rvx_errors::Error;
use rvx_types::PatchDescriptor;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything an engine needs to open a session
#[derive(Clone)]
pub struct EngineOptions {
    /// Working copy of the package to patch
    pub input: PathBuf,
    /// Scratch directory owned by this run
    pub cache_dir: PathBuf,
    /// Resource decoding tool, passed through untouched
    pub resource_tool: Option<PathBuf>,
    pub logger: Arc<dyn EngineLogger>,
}

impl EngineOptions {
    pub fn new(input: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            cache_dir: cache_dir.into(),
            resource_tool: None,
            logger: Arc::new(TracingLogger),
        }
    }

    #[must_use]
    pub fn with_resource_tool(mut self, tool: Option<PathBuf>) -> Self {
        self.resource_tool = tool;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn EngineLogger>) -> Self {
        self.logger = logger;
        self
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("input", &self.input)
            .field("cache_dir", &self.cache_dir)
            .field("resource_tool", &self.resource_tool)
            .finish_non_exhaustive()
    }
}

/// Opens patch sessions on a package
pub trait PatchEngine: Send + Sync {
    /// Decode the input and start a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be decoded.
    fn open(&self, options: EngineOptions) -> Result<Box<dyn PatchSession>, Error>;
}

/// One engine session over a decoded package
pub trait PatchSession: Send {
    /// Identity of the decoded package
    fn package_metadata(&self) -> &PackageMetadata;

    /// Merge integration archives into the session
    ///
    /// # Errors
    ///
    /// Returns an error if an archive cannot be merged.
    fn add_integrations(&mut self, paths: &[PathBuf]) -> Result<(), Error>;

    /// Queue patches for execution, in order
    fn add_patches(&mut self, patches: Vec<Arc<PatchDescriptor>>);

    /// Apply queued patches; one outcome per patch attempted.
    ///
    /// # Errors
    ///
    /// Returns an error only when the engine itself fails. Individual patch
    /// failures are reported as outcomes.
    fn execute_patches(&mut self) -> Result<Vec<PatchOutcome>, Error>;

    /// Write out generated binaries and the rebuilt resource archive
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be produced.
    fn save(&mut self) -> Result<EngineOutput, Error>;
}
