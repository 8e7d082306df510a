//! Detached signature verification against a trusted key list

use minisign_verify::{PublicKey, Signature};
use rvx_errors::{Error, SigningError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Minisign,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyRef {
    pub id: String,
    pub algo: Algorithm,
    pub data: String,
}

/// Verify content at `content_path` against a minisign signature string using any of the provided trusted keys.
/// Returns the key id that successfully verified.
///
/// # Errors
/// Returns an error if the content cannot be read, the signature cannot be parsed,
/// or if verification fails for all provided keys.
pub fn verify_minisign_file_with_keys(
    content_path: &Path,
    signature_str: &str,
    trusted_keys: &[PublicKeyRef],
) -> Result<String, Error> {
    let content = fs::read(content_path).map_err(|e| SigningError::VerificationFailed {
        reason: format!("Failed to read {}: {e}", content_path.display()),
    })?;
    verify_minisign_bytes_with_keys(&content, signature_str, trusted_keys)
}

/// Verify raw bytes against a minisign signature string using any of the provided trusted keys.
/// Returns the key id that successfully verified.
///
/// # Errors
/// Returns an error if the signature cannot be parsed or if no trusted key verifies the content.
pub fn verify_minisign_bytes_with_keys(
    content: &[u8],
    signature_str: &str,
    trusted_keys: &[PublicKeyRef],
) -> Result<String, Error> {
    if trusted_keys.is_empty() {
        return Err(SigningError::NoTrustedKeyFound {
            key_id: "<none configured>".to_string(),
        }
        .into());
    }

    // Parse signature (full minisign string including comment line)
    let sig = Signature::decode(signature_str)
        .map_err(|e| SigningError::InvalidSignatureFormat(e.to_string()))?;

    let mut last_err = None;
    for key in trusted_keys {
        if key.algo != Algorithm::Minisign {
            continue;
        }
        match PublicKey::from_base64(&key.data) {
            Ok(pk) => match pk.verify(content, &sig, false) {
                Ok(()) => return Ok(key.id.clone()),
                Err(e) => {
                    last_err = Some(format!("{e}"));
                }
            },
            Err(e) => {
                last_err = Some(format!("Invalid trusted key format for {}: {e}", key.id));
            }
        }
    }

    Err(SigningError::VerificationFailed {
        reason: format!(
            "no match among {} trusted keys. Last error: {}",
            trusted_keys.len(),
            last_err.unwrap_or_else(|| "unknown".to_string())
        ),
    }
    .into())
}
