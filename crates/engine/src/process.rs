//! Engine adapter driving an external executable over JSON lines

use crate::{
    EngineLogger, EngineOptions, EngineOutput, GeneratedFile, PackageMetadata, PatchEngine,
    PatchFailure, PatchOutcome, PatchSession,
};
use rvx_errors::{EngineError, Error};
use rvx_types::PatchDescriptor;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Output layout inside the session cache directory
const OUT_DIR: &str = "out";
const BINARIES_DIR: &str = "binaries";
const RESOURCE_ARCHIVE: &str = "resources.apk";

/// Runs an external engine executable.
///
/// `<command> inspect <input>` prints one JSON object with the package name
/// and version. `<command> apply ...` prints one JSON message per line and
/// leaves its output under `<cache>/out`.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    command: PathBuf,
}

impl ProcessEngine {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn command_failed(&self, message: impl Into<String>) -> EngineError {
        EngineError::CommandFailed {
            command: self.command.display().to_string(),
            message: message.into(),
        }
    }
}

impl PatchEngine for ProcessEngine {
    fn open(&self, options: EngineOptions) -> Result<Box<dyn PatchSession>, Error> {
        let output = Command::new(&self.command)
            .arg("inspect")
            .arg(&options.input)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.command_failed(e.to_string()))?;

        if !output.status.success() {
            return Err(EngineError::InitializationFailed {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let metadata: PackageMetadata =
            serde_json::from_slice(&output.stdout).map_err(|e| EngineError::ProtocolError {
                message: format!("inspect: {e}"),
            })?;
        tracing::debug!(
            package = %metadata.package_name,
            version = %metadata.package_version,
            "engine session opened"
        );

        Ok(Box::new(ProcessSession {
            engine: self.clone(),
            options,
            metadata,
            integrations: Vec::new(),
            patches: Vec::new(),
            executed: false,
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EngineMessage {
    Log {
        level: String,
        message: String,
    },
    Result {
        patch: String,
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        cause: Option<String>,
    },
}

struct ProcessSession {
    engine: ProcessEngine,
    options: EngineOptions,
    metadata: PackageMetadata,
    integrations: Vec<PathBuf>,
    patches: Vec<Arc<PatchDescriptor>>,
    executed: bool,
}

impl ProcessSession {
    fn out_dir(&self) -> PathBuf {
        self.options.cache_dir.join(OUT_DIR)
    }

    fn apply_command(&self) -> Command {
        let mut command = Command::new(&self.engine.command);
        command
            .arg("apply")
            .arg("--input")
            .arg(&self.options.input)
            .arg("--cache-dir")
            .arg(&self.options.cache_dir);
        if let Some(tool) = &self.options.resource_tool {
            command.arg("--resource-tool").arg(tool);
        }
        for path in &self.integrations {
            command.arg("--integrations").arg(path);
        }
        for patch in &self.patches {
            command.arg("--patch").arg(&patch.name);
        }
        command
    }

    fn read_messages(&self, stdout: impl Read) -> Result<Vec<PatchOutcome>, Error> {
        let mut outcomes = Vec::new();
        for line in BufReader::new(stdout).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let message: EngineMessage =
                serde_json::from_str(&line).map_err(|e| EngineError::ProtocolError {
                    message: format!("{e}: {line}"),
                })?;
            match message {
                EngineMessage::Log { level, message } => {
                    Self::forward_log(self.options.logger.as_ref(), &level, &message);
                }
                EngineMessage::Result {
                    patch,
                    error: None,
                    cause: None,
                } => outcomes.push(PatchOutcome::applied(patch)),
                EngineMessage::Result {
                    patch,
                    error,
                    cause,
                } => outcomes.push(PatchOutcome::failed(
                    patch,
                    PatchFailure {
                        message: error,
                        cause_type: cause,
                    },
                )),
            }
        }
        Ok(outcomes)
    }

    fn forward_log(logger: &dyn EngineLogger, level: &str, message: &str) {
        match level {
            "error" => logger.error(message),
            "warn" | "warning" => logger.warn(message),
            "info" => logger.info(message),
            _ => logger.trace(message),
        }
    }
}

impl PatchSession for ProcessSession {
    fn package_metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    fn add_integrations(&mut self, paths: &[PathBuf]) -> Result<(), Error> {
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            return Err(EngineError::IntegrationFailed {
                message: format!("{} does not exist", missing.display()),
            }
            .into());
        }
        self.integrations.extend(paths.iter().cloned());
        Ok(())
    }

    fn add_patches(&mut self, patches: Vec<Arc<PatchDescriptor>>) {
        self.patches.extend(patches);
    }

    fn execute_patches(&mut self) -> Result<Vec<PatchOutcome>, Error> {
        // Output left by an earlier session on this cache dir must not be saved
        let out_dir = self.out_dir();
        match std::fs::remove_dir_all(&out_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io_with_path(&e, out_dir)),
        }

        let mut child = self
            .apply_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.engine.command_failed(e.to_string()))?;

        let stderr = child.stderr.take();
        let stderr_reader = std::thread::spawn(move || {
            let mut buffer = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut buffer);
            }
            buffer
        });

        let outcomes = match child.stdout.take() {
            Some(stdout) => self.read_messages(stdout),
            None => Err(self.engine.command_failed("stdout not captured").into()),
        };
        let outcomes = match outcomes {
            Ok(outcomes) => outcomes,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = stderr_reader.join();
                return Err(e);
            }
        };

        let status = child.wait()?;
        let stderr = stderr_reader.join().unwrap_or_default();
        if !status.success() {
            return Err(EngineError::ExecutionFailed {
                message: format!("engine exited with {status}: {}", stderr.trim()),
            }
            .into());
        }

        self.executed = true;
        Ok(outcomes)
    }

    fn save(&mut self) -> Result<EngineOutput, Error> {
        if !self.executed {
            return Err(EngineError::SaveFailed {
                message: "patches have not been executed".to_string(),
            }
            .into());
        }

        let out_dir = self.out_dir();
        let binaries = collect_binaries(&out_dir.join(BINARIES_DIR))?;
        let resources = out_dir.join(RESOURCE_ARCHIVE);
        Ok(EngineOutput {
            binaries,
            resource_archive: resources.is_file().then_some(resources),
        })
    }
}

fn collect_binaries(dir: &Path) -> Result<Vec<GeneratedFile>, Error> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|e| EngineError::SaveFailed {
        message: format!("{}: {e}", dir.display()),
    })?;

    let mut binaries = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        binaries.push(GeneratedFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }
    binaries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(binaries)
}
