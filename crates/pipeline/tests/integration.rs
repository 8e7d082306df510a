//! Integration tests for the patch pipeline, using an in-memory engine and signer

#[cfg(test)]
mod tests {
    use rvx_catalog::CatalogSnapshot;
    use rvx_engine::*;
    use rvx_errors::{EngineError, Error, SigningError};
    use rvx_events::{channel, AppEvent, EventReceiver, PatcherEvent};
    use rvx_pipeline::*;
    use rvx_signing::ArchiveSigner;
    use rvx_types::{PatchDescriptor, PipelineStage, ProgressUpdate, RunReport, SigningOutcome};
    use std::collections::HashSet;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Default, Clone)]
    struct FakeEngine {
        fail_open: bool,
        failing: HashSet<String>,
        logs: Vec<(&'static str, &'static str)>,
    }

    struct FakeSession {
        engine: FakeEngine,
        options: EngineOptions,
        metadata: PackageMetadata,
        patches: Vec<Arc<PatchDescriptor>>,
    }

    impl PatchEngine for FakeEngine {
        fn open(&self, options: EngineOptions) -> Result<Box<dyn PatchSession>, Error> {
            if self.fail_open {
                return Err(EngineError::InitializationFailed {
                    message: "not a valid apk".to_string(),
                }
                .into());
            }
            Ok(Box::new(FakeSession {
                engine: self.clone(),
                options,
                metadata: PackageMetadata {
                    package_name: "com.example".to_string(),
                    package_version: "1.0".to_string(),
                },
                patches: Vec::new(),
            }))
        }
    }

    impl PatchSession for FakeSession {
        fn package_metadata(&self) -> &PackageMetadata {
            &self.metadata
        }

        fn add_integrations(&mut self, _paths: &[PathBuf]) -> Result<(), Error> {
            Ok(())
        }

        fn add_patches(&mut self, patches: Vec<Arc<PatchDescriptor>>) {
            self.patches.extend(patches);
        }

        fn execute_patches(&mut self) -> Result<Vec<PatchOutcome>, Error> {
            for (level, message) in &self.engine.logs {
                match *level {
                    "error" => self.options.logger.error(message),
                    "info" => self.options.logger.info(message),
                    _ => self.options.logger.trace(message),
                }
            }
            Ok(self
                .patches
                .iter()
                .map(|p| {
                    if self.engine.failing.contains(&p.name) {
                        PatchOutcome::failed(&p.name, PatchFailure::with_message("boom"))
                    } else {
                        PatchOutcome::applied(&p.name)
                    }
                })
                .collect())
        }

        fn save(&mut self) -> Result<EngineOutput, Error> {
            let dex = self.options.cache_dir.join("classes.dex");
            std::fs::write(&dex, b"patched dex")?;
            Ok(EngineOutput {
                binaries: vec![GeneratedFile {
                    name: "classes.dex".to_string(),
                    path: dex,
                }],
                resource_archive: None,
            })
        }
    }

    struct FakeSigner {
        fail: bool,
    }

    impl ArchiveSigner for FakeSigner {
        fn sign(
            &self,
            unsigned: &Path,
            output: &Path,
            _keystore: &Path,
            _password: Option<&str>,
        ) -> Result<PathBuf, Error> {
            if self.fail {
                return Err(SigningError::KeystoreLocked {
                    path: "release.key".to_string(),
                    message: "wrong password".to_string(),
                }
                .into());
            }
            std::fs::copy(unsigned, output)?;
            Ok(output.with_extension("sig"))
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        request: PatcherRequest,
    }

    fn fixture(selected: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("original.apk");
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir(&cache_dir).unwrap();

        let mut writer = zip::ZipWriter::new(std::fs::File::create(&original).unwrap());
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("classes.dex", stored).unwrap();
        writer.write_all(b"original dex").unwrap();
        writer.start_file("assets/data.bin", stored).unwrap();
        writer.write_all(b"asset bytes").unwrap();
        writer.finish().unwrap();

        let request = PatcherRequest {
            original,
            input: dir.path().join("input.apk"),
            patched: dir.path().join("patched.apk"),
            output: dir.path().join("out.apk"),
            integrations: vec![dir.path().join("integrations.apk")],
            selected_patches: selected.iter().map(ToString::to_string).collect(),
            cache_dir,
            keystore: dir.path().join("release.key"),
            keystore_password: None,
        };
        Fixture { _dir: dir, request }
    }

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::from_patches(
            ["a", "b", "c"]
                .into_iter()
                .map(|name| Arc::new(PatchDescriptor::new(name, "1.0.0")))
                .collect(),
        )
    }

    fn run(engine: FakeEngine, signer: FakeSigner, request: &PatcherRequest) -> (RunReport, EventReceiver) {
        let (tx, rx) = channel();
        let pipeline = PatchPipeline::new(Arc::new(engine), Arc::new(signer));
        let recorder = Arc::new(RunRecorder::new(
            Uuid::new_v4(),
            Some(tx),
            request.patched.clone(),
            request.output.clone(),
        ));
        let report = pipeline.run(request, &catalog(), &recorder);
        (report, rx)
    }

    fn drain_progress(rx: &mut EventReceiver) -> Vec<ProgressUpdate> {
        let mut updates = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let Some(update) = message.event.as_progress() {
                updates.push(update.clone());
            }
        }
        updates
    }

    #[test]
    fn test_zero_patches_reaches_done() {
        let fx = fixture(&[]);
        let (report, mut rx) = run(FakeEngine::default(), FakeSigner { fail: false }, &fx.request);

        assert!(report.finished());
        assert!(report.is_clean());
        assert_eq!(report.package_name.as_deref(), Some("com.example"));

        let updates = drain_progress(&mut rx);
        let progress: Vec<f64> = updates.iter().map(|u| u.progress).collect();
        assert_eq!(progress, [0.1, 0.2, 0.3, 0.4, 0.5, 0.7, 0.9, 1.0]);
        assert_eq!(updates[0].log, "Copying original apk");
        assert_eq!(updates[1].header, "Unpacking apk...");
        assert_eq!(updates[3].header, "Merging integrations...");
        assert_eq!(updates[7].header, "Finished!");
        assert_eq!(updates, report.updates);
    }

    #[test]
    fn test_unpack_failure_aborts_once() {
        let fx = fixture(&["a"]);
        let engine = FakeEngine {
            fail_open: true,
            ..FakeEngine::default()
        };
        let (report, mut rx) = run(engine, FakeSigner { fail: false }, &fx.request);

        let updates = drain_progress(&mut rx);
        let aborts = updates.iter().filter(|u| u.is_abort()).count();
        assert_eq!(aborts, 1);
        let last = updates.last().unwrap();
        assert!(last.is_abort());
        assert_eq!(last.header, "Aborting...");
        assert!(last
            .log
            .starts_with("An error occurred! Aborting\nError:\n"));
        assert!(last.log.contains("not a valid apk"));

        assert_eq!(report.stages, [PipelineStage::Copy, PipelineStage::Unpack]);
        assert_eq!(report.aborted.as_ref().unwrap().stage, PipelineStage::Unpack);
        assert!(!report.finished());
        assert!(report.artifact().is_none());
        assert!(!fx.request.patched.exists());
    }

    #[test]
    fn test_one_failing_patch_does_not_stop_run() {
        let fx = fixture(&["a", "b", "c"]);
        let engine = FakeEngine {
            failing: HashSet::from(["b".to_string()]),
            ..FakeEngine::default()
        };
        let (report, mut rx) = run(engine, FakeSigner { fail: false }, &fx.request);

        assert_eq!(report.applied, ["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].reason, "boom");
        assert!(report.reached(PipelineStage::Repack));
        assert!(report.reached(PipelineStage::Sign));
        assert!(report.finished());

        let logs: Vec<String> = drain_progress(&mut rx)
            .into_iter()
            .filter(|u| (u.progress - 0.5).abs() < f64::EPSILON && u.header.is_empty())
            .map(|u| u.log)
            .collect();
        assert_eq!(logs, ["Applied a", "Failed to apply b: boom", "Applied c"]);

        assert_eq!(
            rvx_archive::read_entry(&fx.request.patched, "classes.dex").unwrap(),
            b"patched dex"
        );
        assert_eq!(
            rvx_archive::read_entry(&fx.request.patched, "assets/data.bin").unwrap(),
            b"asset bytes"
        );
        assert!(fx.request.output.exists());
    }

    #[test]
    fn test_signing_failure_still_finishes() {
        let fx = fixture(&["a"]);
        let (report, mut rx) = run(FakeEngine::default(), FakeSigner { fail: true }, &fx.request);

        assert!(report.finished());
        assert!(matches!(report.signing, SigningOutcome::Failed { .. }));
        assert_eq!(report.artifact(), Some(&fx.request.patched));
        assert!(fx.request.patched.exists());
        assert!(!fx.request.output.exists());

        let updates = drain_progress(&mut rx);
        let signing_error = updates
            .iter()
            .find(|u| u.log.starts_with("Error signing apk: "))
            .unwrap();
        assert!(signing_error.is_log_only());
        assert!(updates.iter().all(|u| !u.is_abort()));
        assert_eq!(updates.last().unwrap().progress, 1.0);
    }

    #[test]
    fn test_engine_logs_become_log_only_updates() {
        let fx = fixture(&["a"]);
        let engine = FakeEngine {
            logs: vec![("error", "bad things"), ("trace", "noise"), ("info", "hello")],
            ..FakeEngine::default()
        };
        let (_, mut rx) = run(engine, FakeSigner { fail: false }, &fx.request);

        let mut log_only = Vec::new();
        let mut engine_events = 0;
        while let Ok(message) = rx.try_recv() {
            match message.event {
                AppEvent::Patcher(PatcherEvent::Progress { update, .. }) if update.is_log_only() => {
                    assert!(update.header.is_empty());
                    log_only.push(update.log);
                }
                AppEvent::Patcher(PatcherEvent::EngineLog { .. }) => engine_events += 1,
                _ => {}
            }
        }
        assert_eq!(log_only, ["bad things", "hello"]);
        assert_eq!(engine_events, 3);
    }

    #[test]
    fn test_missing_original_aborts_at_copy() {
        let mut fx = fixture(&[]);
        fx.request.original = fx.request.cache_dir.join("missing.apk");
        let (report, mut rx) = run(FakeEngine::default(), FakeSigner { fail: false }, &fx.request);

        assert_eq!(report.aborted.unwrap().stage, PipelineStage::Copy);
        let updates = drain_progress(&mut rx);
        assert_eq!(updates.len(), 2);
        assert!(updates[1].is_abort());
    }

    #[test]
    fn test_run_events_bracket_progress() {
        let fx = fixture(&[]);
        let (_, mut rx) = run(FakeEngine::default(), FakeSigner { fail: false }, &fx.request);

        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message);
        }
        assert!(matches!(
            events.first().unwrap().event,
            AppEvent::Patcher(PatcherEvent::RunStarted { .. })
        ));
        assert!(matches!(
            events.last().unwrap().event,
            AppEvent::Patcher(PatcherEvent::RunFinished {
                finished: true,
                aborted: false,
                ..
            })
        ));
        let correlation = events[0].meta.correlation_id.clone();
        assert!(correlation.is_some());
        assert!(events.iter().all(|m| m.meta.correlation_id == correlation));
    }
}
