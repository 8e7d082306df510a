#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Signing of patched archives
//!
//! The pipeline only depends on [`ArchiveSigner`]. The bundled
//! [`MinisignSigner`] writes a detached minisign signature next to the
//! signed copy; the keystore is a minisign secret key file.

mod keys;
mod signer;
mod verify;

pub use keys::{generate_keypair, save_public_key, save_secret_key, KeyPair};
pub use signer::{signature_path, MinisignSigner};
pub use verify::{
    verify_minisign_bytes_with_keys, verify_minisign_file_with_keys, Algorithm, PublicKeyRef,
};

use rvx_errors::Error;
use std::path::{Path, PathBuf};

/// Produces a signed copy of an archive
pub trait ArchiveSigner: Send + Sync {
    /// Sign `unsigned` into `output` with the key in `keystore`.
    ///
    /// Returns the path of the written signature. On failure `unsigned` is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the keystore cannot be opened or signing fails.
    fn sign(
        &self,
        unsigned: &Path,
        output: &Path,
        keystore: &Path,
        password: Option<&str>,
    ) -> Result<PathBuf, Error>;
}
