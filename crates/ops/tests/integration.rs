//! Integration tests for ops, driving the catalog and pipeline through `OpsCtx`

#[cfg(test)]
mod tests {
    use rvx_config::Config;
    use rvx_engine::*;
    use rvx_errors::{CatalogError, Error, OpsError, PipelineError};
    use rvx_events::{channel, AppEvent, CatalogEvent, CatalogQuery, EventReceiver};
    use rvx_ops::*;
    use rvx_signing::ArchiveSigner;
    use rvx_types::{PatchDescriptor, PipelineStage, VersionPolicy};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use uuid::Uuid;

    const BUNDLE: &str = r#"{
        "patches": [
            {
                "name": "hide-ads",
                "version": "1.0.0",
                "compatible_packages": [{ "name": "com.example", "versions": ["1.0"] }],
                "dependencies": ["resource-base"]
            },
            {
                "name": "resource-base",
                "kind": "resource",
                "compatible_packages": [{ "name": "com.example" }]
            },
            {
                "name": "other-app",
                "compatible_packages": [{ "name": "org.other", "versions": ["3.1"] }]
            }
        ]
    }"#;

    struct FakeEngine;

    struct FakeSession {
        cache_dir: PathBuf,
        metadata: PackageMetadata,
        patches: Vec<Arc<PatchDescriptor>>,
    }

    impl PatchEngine for FakeEngine {
        fn open(&self, options: EngineOptions) -> Result<Box<dyn PatchSession>, Error> {
            Ok(Box::new(FakeSession {
                cache_dir: options.cache_dir,
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
            Ok(self
                .patches
                .iter()
                .map(|p| PatchOutcome::applied(&p.name))
                .collect())
        }

        fn save(&mut self) -> Result<EngineOutput, Error> {
            let dex = self.cache_dir.join("classes.dex");
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

    struct CopySigner;

    impl ArchiveSigner for CopySigner {
        fn sign(
            &self,
            unsigned: &Path,
            output: &Path,
            _keystore: &Path,
            _password: Option<&str>,
        ) -> Result<PathBuf, Error> {
            std::fs::copy(unsigned, output)?;
            Ok(output.with_extension("sig"))
        }
    }

    fn context(config: Config) -> (OpsCtx, EventReceiver) {
        let (tx, rx) = channel();
        let ctx = OpsContextBuilder::new()
            .with_engine(Arc::new(FakeEngine))
            .with_signer(Arc::new(CopySigner))
            .with_event_sender(tx)
            .with_config(config)
            .build()
            .unwrap();
        (ctx, rx)
    }

    fn write_bundle(dir: &Path) -> PathBuf {
        let bundle = dir.join("patches.json");
        std::fs::write(&bundle, BUNDLE).unwrap();
        bundle
    }

    fn write_original(path: &Path) {
        let mut writer = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("classes.dex", stored).unwrap();
        writer.write_all(b"original dex").unwrap();
        writer.start_file("res/layout.xml", stored).unwrap();
        writer.write_all(b"<layout/>").unwrap();
        writer.finish().unwrap();
    }

    fn request(dir: &Path, selected: &[&str]) -> PatcherRequest {
        let original = dir.join("original.apk");
        write_original(&original);
        PatcherRequest {
            original,
            input: dir.join("input.apk"),
            patched: dir.join("patched.apk"),
            output: dir.join("out.apk"),
            integrations: Vec::new(),
            selected_patches: selected.iter().map(ToString::to_string).collect(),
            cache_dir: dir.join("cache"),
            keystore: dir.join("release.key"),
            keystore_password: None,
        }
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message.event);
        }
        events
    }

    #[test]
    fn test_builder_requires_engine() {
        let (tx, _rx) = channel();
        let result = OpsContextBuilder::new()
            .with_signer(Arc::new(CopySigner))
            .with_event_sender(tx)
            .with_config(Config::default())
            .build();
        assert!(matches!(
            result,
            Err(Error::Ops(OpsError::MissingComponent { ref component })) if component == "engine"
        ));
    }

    #[tokio::test]
    async fn test_load_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, mut rx) = context(Config::default());
        let bundle = write_bundle(dir.path());

        let loaded = load_patches(&ctx, &bundle, &dir.path().join("work"))
            .await
            .unwrap();
        assert_eq!(loaded, 3);

        let packages = compatible_packages(&ctx).await.unwrap();
        assert_eq!(packages, ["com.example", "org.other"]);

        let names: Vec<String> = filtered_patches(&ctx, "com.example", "1.0", false)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["hide-ads", "resource-base"]);

        let mismatched = filtered_patches(&ctx, "com.example", "2.0", false)
            .await
            .unwrap();
        assert_eq!(mismatched.len(), 1);
        assert_eq!(mismatched[0].name, "resource-base");

        let ignored = filtered_patches(&ctx, "com.example", "2.0", true)
            .await
            .unwrap();
        assert_eq!(ignored.len(), 2);

        let events = drain(&mut rx);
        assert!(matches!(
            events[0],
            AppEvent::Catalog(CatalogEvent::LoadStarted { .. })
        ));
        assert!(matches!(
            events[1],
            AppEvent::Catalog(CatalogEvent::LoadCompleted { loaded: 3, total: 3, .. })
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Catalog(CatalogEvent::QueryCompleted {
                query: CatalogQuery::CompatiblePackages,
                results: 2
            })
        )));
    }

    #[tokio::test]
    async fn test_legacy_policy_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.patcher.version_policy = VersionPolicy::Legacy;
        let (ctx, _rx) = context(config);
        load_patches(&ctx, &write_bundle(dir.path()), &dir.path().join("work"))
            .await
            .unwrap();

        // Legacy accepts any non-empty version list, and rejects empty ones
        let names: Vec<String> = filtered_patches(&ctx, "com.example", "2.0", false)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["hide-ads"]);
    }

    #[tokio::test]
    async fn test_needs_resource_patching_follows_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _rx) = context(Config::default());
        load_patches(&ctx, &write_bundle(dir.path()), &dir.path().join("work"))
            .await
            .unwrap();

        let selected = vec!["hide-ads".to_string()];
        assert!(needs_resource_patching(&ctx, &selected, "com.example")
            .await
            .unwrap());
        assert!(!needs_resource_patching(&ctx, &[], "com.example")
            .await
            .unwrap());
        assert!(!needs_resource_patching(&ctx, &selected, "org.other")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, mut rx) = context(Config::default());
        let work = dir.path().join("work");
        let bundle = write_bundle(dir.path());
        load_patches(&ctx, &bundle, &work).await.unwrap();
        drain(&mut rx);

        // Loading the same bundle again collides on every name
        let err = load_patches(&ctx, &bundle, &work).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Catalog(CatalogError::DuplicatePatch { .. })
        ));
        assert_eq!(ctx.catalog.len().await, 3);

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(AppEvent::Catalog(CatalogEvent::LoadFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_missing_bundle_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _rx) = context(Config::default());
        let result = load_patches(&ctx, &dir.path().join("absent.json"), dir.path()).await;
        assert!(result.is_err());
        assert!(ctx.catalog.is_empty().await);
    }

    #[tokio::test]
    async fn test_run_patcher_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _rx) = context(Config::default());
        load_patches(&ctx, &write_bundle(dir.path()), &dir.path().join("work"))
            .await
            .unwrap();

        let request = request(dir.path(), &["hide-ads"]);
        let output = request.output.clone();
        let report = run_patcher(&ctx, request).await.unwrap();

        assert!(report.finished());
        assert_eq!(report.applied, ["hide-ads"]);
        assert!(output.exists());
        assert_eq!(ctx.run_locks.active_count(), 0);

        let result = OperationResult::RunReport(report);
        assert!(result.is_success());
        assert!(result.to_json().unwrap().contains("RunReport"));
    }

    #[tokio::test]
    async fn test_overlapping_run_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _rx) = context(Config::default());
        let request = request(dir.path(), &[]);

        let _held = ctx
            .run_locks
            .claim(Uuid::new_v4(), [request.cache_dir.as_path()])
            .unwrap();
        let err = run_patcher(&ctx, request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Pipeline(PipelineError::RunInProgress { .. })
        ));
        assert!(!dir.path().join("input.apk").exists());
    }

    #[tokio::test]
    async fn test_unusable_cache_dir_aborts_in_copy_stage() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, mut rx) = context(Config::default());
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut request = request(dir.path(), &[]);
        request.cache_dir = blocker.join("cache");
        let report = run_patcher(&ctx, request).await.unwrap();

        let aborted = report.aborted.as_ref().unwrap();
        assert_eq!(aborted.stage, PipelineStage::Copy);
        assert!(!dir.path().join("input.apk").exists());
        assert_eq!(ctx.run_locks.active_count(), 0);

        let aborts = drain(&mut rx)
            .iter()
            .filter_map(AppEvent::as_progress)
            .filter(|update| update.is_abort())
            .count();
        assert_eq!(aborts, 1);
    }

    #[tokio::test]
    async fn test_generate_signing_key_writes_both_halves() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _rx) = context(Config::default());
        let secret = dir.path().join("release.key");
        let public = dir.path().join("release.pub");

        let encoded = generate_signing_key(&ctx, &secret, &public, None)
            .await
            .unwrap();
        assert!(!encoded.is_empty());
        assert!(secret.exists());
        assert!(std::fs::read_to_string(&public).unwrap().contains(&encoded));
    }
}
