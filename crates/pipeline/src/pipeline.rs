//! Stage sequencing for a single patch run

use crate::logger::ChannelLogger;
use crate::recorder::RunRecorder;
use crate::repack::repack_archive;
use rvx_catalog::CatalogSnapshot;
use rvx_engine::{EngineOptions, PatchEngine, PatchSession};
use rvx_errors::{error_chain, Error, PipelineError};
use rvx_signing::ArchiveSigner;
use rvx_types::{PipelineStage, RunReport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Locations and choices for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatcherRequest {
    /// Package as provided by the user; never modified
    pub original: PathBuf,
    /// Working copy the engine decodes
    pub input: PathBuf,
    /// Repacked, unsigned result
    pub patched: PathBuf,
    /// Signed result
    pub output: PathBuf,
    pub integrations: Vec<PathBuf>,
    pub selected_patches: Vec<String>,
    pub cache_dir: PathBuf,
    pub keystore: PathBuf,
    #[serde(default, skip_serializing)]
    pub keystore_password: Option<String>,
}

impl PatcherRequest {
    /// Paths a run writes to and must own exclusively
    pub fn claimed_paths(&self) -> impl Iterator<Item = &Path> {
        [
            self.cache_dir.as_path(),
            self.input.as_path(),
            self.patched.as_path(),
        ]
        .into_iter()
    }
}

struct StageFailure {
    stage: PipelineStage,
    error: Error,
}

trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> Result<T, StageFailure>;
}

impl<T, E: Into<Error>> AtStage<T> for Result<T, E> {
    fn at(self, stage: PipelineStage) -> Result<T, StageFailure> {
        self.map_err(|e| StageFailure {
            stage,
            error: e.into(),
        })
    }
}

/// Drives the engine, the repacker and the signer through one run
#[derive(Clone)]
pub struct PatchPipeline {
    engine: Arc<dyn PatchEngine>,
    signer: Arc<dyn ArchiveSigner>,
    resource_tool: Option<PathBuf>,
}

impl PatchPipeline {
    pub fn new(engine: Arc<dyn PatchEngine>, signer: Arc<dyn ArchiveSigner>) -> Self {
        Self {
            engine,
            signer,
            resource_tool: None,
        }
    }

    #[must_use]
    pub fn with_resource_tool(mut self, tool: Option<PathBuf>) -> Self {
        self.resource_tool = tool;
        self
    }

    /// Run every stage. Blocking; call from a blocking worker.
    ///
    /// Failures never escape: per-patch and signing failures are recorded and
    /// the run continues, anything else ends it with an abort update. The
    /// returned report holds the full outcome.
    pub fn run(
        &self,
        request: &PatcherRequest,
        catalog: &CatalogSnapshot,
        recorder: &Arc<RunRecorder>,
    ) -> RunReport {
        recorder.started(request.selected_patches.len());

        if let Err(failure) = self.execute(request, catalog, recorder) {
            recorder.abort(failure.stage, &error_chain(&failure.error));
        }
        recorder.finish()
    }

    fn execute(
        &self,
        request: &PatcherRequest,
        catalog: &CatalogSnapshot,
        recorder: &Arc<RunRecorder>,
    ) -> Result<(), StageFailure> {
        recorder.stage(PipelineStage::Copy);
        std::fs::create_dir_all(&request.cache_dir)
            .map_err(|e| Error::io_with_path(&e, request.cache_dir.clone()))
            .at(PipelineStage::Copy)?;
        copy_original(&request.original, &request.input).at(PipelineStage::Copy)?;

        recorder.stage(PipelineStage::Unpack);
        let options = EngineOptions::new(&request.input, &request.cache_dir)
            .with_resource_tool(self.resource_tool.clone())
            .with_logger(Arc::new(ChannelLogger::new(Arc::clone(recorder))));
        let mut session = self.engine.open(options).at(PipelineStage::Unpack)?;
        let package_name = session.package_metadata().package_name.clone();
        recorder.set_package(&package_name);

        recorder.stage(PipelineStage::Integrations);
        recorder.progress(crate::stages::merging_integrations());
        session
            .add_integrations(&request.integrations)
            .at(PipelineStage::Integrations)?;

        recorder.stage(PipelineStage::Apply);
        apply_patches(session.as_mut(), request, catalog, &package_name, recorder)
            .at(PipelineStage::Apply)?;

        recorder.stage(PipelineStage::Repack);
        let output = session.save().at(PipelineStage::Repack)?;
        drop(session);
        repack_archive(&output, &request.input, &request.patched).at(PipelineStage::Repack)?;

        recorder.stage(PipelineStage::Sign);
        match self.signer.sign(
            &request.patched,
            &request.output,
            &request.keystore,
            request.keystore_password.as_deref(),
        ) {
            Ok(_) => recorder.signed(request.output.clone()),
            Err(e) => recorder.signing_failed(&e.to_string()),
        }

        recorder.stage(PipelineStage::Done);
        Ok(())
    }
}

fn copy_original(original: &Path, input: &Path) -> Result<(), PipelineError> {
    std::fs::copy(original, input)
        .map(|_| ())
        .map_err(|e| PipelineError::CopyFailed {
            from: original.display().to_string(),
            to: input.display().to_string(),
            message: e.to_string(),
        })
}

fn apply_patches(
    session: &mut dyn PatchSession,
    request: &PatcherRequest,
    catalog: &CatalogSnapshot,
    package_name: &str,
    recorder: &RunRecorder,
) -> Result<(), Error> {
    let patches = catalog.resolve(&request.selected_patches, package_name);
    tracing::info!(
        run_id = %recorder.run_id(),
        package = %package_name,
        selected = request.selected_patches.len(),
        resolved = patches.len(),
        "applying patches"
    );
    session.add_patches(patches);
    for outcome in session.execute_patches()? {
        recorder.patch_outcome(&outcome);
    }
    Ok(())
}
