//! Minisign-backed archive signer

use crate::ArchiveSigner;
use minisign::{sign, SecretKeyBox};
use rvx_errors::{Error, SigningError};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Signs archives with a minisign secret key
#[derive(Debug, Clone)]
pub struct MinisignSigner {
    signer_name: String,
}

impl MinisignSigner {
    #[must_use]
    pub fn new(signer_name: impl Into<String>) -> Self {
        Self {
            signer_name: signer_name.into(),
        }
    }

    #[must_use]
    pub fn signer_name(&self) -> &str {
        &self.signer_name
    }
}

/// Detached signature location for a signed archive: `<output>.minisig`
#[must_use]
pub fn signature_path(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(".minisig");
    PathBuf::from(path)
}

fn signing_failed(message: String) -> SigningError {
    SigningError::SigningFailed { message }
}

impl ArchiveSigner for MinisignSigner {
    fn sign(
        &self,
        unsigned: &Path,
        output: &Path,
        keystore: &Path,
        password: Option<&str>,
    ) -> Result<PathBuf, Error> {
        if !keystore.is_file() {
            return Err(SigningError::KeystoreNotFound {
                path: keystore.display().to_string(),
            }
            .into());
        }

        let locked = |message: String| SigningError::KeystoreLocked {
            path: keystore.display().to_string(),
            message,
        };

        // Read the private key
        let sk_box_str = fs::read_to_string(keystore)
            .map_err(|e| locked(format!("Failed to read keystore: {e}")))?;
        let sk_box = SecretKeyBox::from_string(&sk_box_str)
            .map_err(|e| locked(format!("Failed to parse keystore: {e}")))?;
        let secret_key = sk_box
            .into_secret_key(password.map(str::to_string))
            .map_err(|e| locked(format!("Failed to decrypt keystore: {e}")))?;

        // Read the archive to sign
        let data = fs::read(unsigned)
            .map_err(|e| signing_failed(format!("Failed to read {}: {e}", unsigned.display())))?;

        let trusted_comment = format!("signed by {}", self.signer_name);
        let untrusted_comment = format!(
            "signature from rvx for {}",
            output.file_name().unwrap_or_default().to_string_lossy()
        );
        let signature = sign(
            None,
            &secret_key,
            Cursor::new(&data),
            Some(trusted_comment.as_str()),
            Some(untrusted_comment.as_str()),
        )
        .map_err(|e| signing_failed(format!("Failed to create signature: {e}")))?;

        if unsigned != output {
            fs::write(output, &data).map_err(|e| {
                signing_failed(format!("Failed to write {}: {e}", output.display()))
            })?;
        }

        let sig_path = signature_path(output);
        fs::write(&sig_path, signature.into_string())
            .map_err(|e| signing_failed(format!("Failed to write signature file: {e}")))?;

        tracing::info!(
            output = %output.display(),
            signature = %sig_path.display(),
            "archive signed"
        );
        Ok(sig_path)
    }
}
