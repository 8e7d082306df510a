//! Key generation and storage for `rvx keygen` and tests

use minisign::{PublicKey, SecretKey};
use rvx_errors::{Error, SigningError};
use std::fs;
use std::path::Path;

/// A freshly generated signing key pair
pub struct KeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl KeyPair {
    /// Public key in the base64 form used by [`crate::PublicKeyRef`]
    #[must_use]
    pub fn public_base64(&self) -> String {
        self.public.to_base64()
    }
}

fn key_error(message: String) -> SigningError {
    SigningError::SigningFailed { message }
}

/// Generate a key pair, encrypted with `password` when one is given
///
/// # Errors
///
/// Returns an error if key pair generation fails.
pub fn generate_keypair(password: Option<&str>) -> Result<KeyPair, Error> {
    let minisign::KeyPair { pk, sk } = match password {
        Some(password) => minisign::KeyPair::generate_encrypted_keypair(Some(password.to_string())),
        None => minisign::KeyPair::generate_unencrypted_keypair(),
    }
    .map_err(|e| key_error(format!("Failed to generate key pair: {e}")))?;

    Ok(KeyPair {
        secret: sk,
        public: pk,
    })
}

/// Save a secret key to file
///
/// # Errors
///
/// Returns an error if key serialization or file writing fails.
pub fn save_secret_key(secret_key: &SecretKey, path: &Path) -> Result<(), Error> {
    let sk_box = secret_key
        .to_box(None)
        .map_err(|e| key_error(format!("Failed to serialize secret key: {e}")))?;

    fs::write(path, sk_box.to_string())
        .map_err(|e| key_error(format!("Failed to write secret key: {e}")))?;

    Ok(())
}

/// Save a public key to file
///
/// # Errors
///
/// Returns an error if key serialization or file writing fails.
pub fn save_public_key(public_key: &PublicKey, path: &Path) -> Result<(), Error> {
    let pk_box = public_key
        .to_box()
        .map_err(|e| key_error(format!("Failed to serialize public key: {e}")))?;

    fs::write(path, pk_box.to_string())
        .map_err(|e| key_error(format!("Failed to write public key: {e}")))?;

    Ok(())
}
