//! Patch bundle loading

use rvx_errors::{CatalogError, Error};
use rvx_types::PatchDescriptor;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// File name of the manifest inside a bundle archive
pub const MANIFEST_NAME: &str = "patches.json";

/// Produces patch descriptors from a bundle on disk
pub trait BundleLoader: Send + Sync {
    /// Load every patch the bundle defines.
    ///
    /// `work_dir` is a private scratch directory for this loader; it exists
    /// before the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be read or is malformed.
    fn load(&self, bundle: &Path, work_dir: &Path) -> Result<Vec<PatchDescriptor>, Error>;
}

/// Reads `patches.json`, either as a bare file or from inside a zip bundle
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestBundleLoader;

#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    Bare(Vec<PatchDescriptor>),
    Wrapped { patches: Vec<PatchDescriptor> },
}

impl Manifest {
    fn into_patches(self) -> Vec<PatchDescriptor> {
        match self {
            Self::Bare(patches) | Self::Wrapped { patches } => patches,
        }
    }
}

impl ManifestBundleLoader {
    fn read_manifest(bundle: &Path, work_dir: &Path) -> Result<Vec<u8>, Error> {
        let mut file = File::open(bundle).map_err(|e| CatalogError::BundleLoadFailed {
            path: bundle.display().to_string(),
            message: e.to_string(),
        })?;

        let mut magic = [0u8; 4];
        let is_zip = file.read_exact(&mut magic).is_ok() && magic == *b"PK\x03\x04";
        if !is_zip {
            return std::fs::read(bundle).map_err(|e| {
                CatalogError::BundleLoadFailed {
                    path: bundle.display().to_string(),
                    message: e.to_string(),
                }
                .into()
            });
        }

        let file = File::open(bundle)?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| CatalogError::InvalidBundle {
            path: bundle.display().to_string(),
            message: e.to_string(),
        })?;
        let mut entry = archive
            .by_name(MANIFEST_NAME)
            .map_err(|_| CatalogError::InvalidBundle {
                path: bundle.display().to_string(),
                message: format!("missing {MANIFEST_NAME}"),
            })?;
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;

        // Keep the extracted manifest next to the loader's other scratch files
        std::fs::write(work_dir.join(MANIFEST_NAME), &contents)?;
        Ok(contents)
    }
}

impl BundleLoader for ManifestBundleLoader {
    fn load(&self, bundle: &Path, work_dir: &Path) -> Result<Vec<PatchDescriptor>, Error> {
        let contents = Self::read_manifest(bundle, work_dir)?;
        let manifest: Manifest =
            serde_json::from_slice(&contents).map_err(|e| CatalogError::InvalidBundle {
                path: bundle.display().to_string(),
                message: e.to_string(),
            })?;
        let patches = manifest.into_patches();
        tracing::debug!(
            bundle = %bundle.display(),
            patches = patches.len(),
            "read bundle manifest"
        );
        Ok(patches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bare_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("patches.json");
        std::fs::write(
            &bundle,
            r#"[{"name": "hide-ads", "compatible_packages": [{"name": "com.example"}]}]"#,
        )
        .unwrap();

        let patches = ManifestBundleLoader.load(&bundle, dir.path()).unwrap();
        assert_eq!(patches.len(), 1);
        assert!(patches[0].declares_package("com.example"));
        assert!(patches[0].compatible_packages[0].versions.is_empty());
    }

    #[test]
    fn test_zip_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();
        let bundle = dir.path().join("bundle.rvp");

        let mut writer = zip::ZipWriter::new(File::create(&bundle).unwrap());
        writer
            .start_file(MANIFEST_NAME, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(br#"{"patches": [{"name": "theme", "kind": "resource"}]}"#)
            .unwrap();
        writer.finish().unwrap();

        let patches = ManifestBundleLoader.load(&bundle, &work).unwrap();
        assert_eq!(patches[0].name, "theme");
        assert!(work.join(MANIFEST_NAME).exists());
    }

    #[test]
    fn test_garbage_is_invalid_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("broken.json");
        std::fs::write(&bundle, "not json").unwrap();

        let err = ManifestBundleLoader.load(&bundle, dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::Catalog(CatalogError::InvalidBundle { .. })
        ));
    }
}
