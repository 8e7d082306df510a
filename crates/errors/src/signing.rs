//! Signing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SigningError {
    #[error("signature verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("no trusted key found for signature with key id: {key_id}")]
    NoTrustedKeyFound { key_id: String },

    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("invalid public key format: {0}")]
    InvalidPublicKey(String),

    #[error("keystore not found: {path}")]
    KeystoreNotFound { path: String },

    #[error("failed to unlock keystore {path}: {message}")]
    KeystoreLocked { path: String, message: String },

    #[error("signing failed: {message}")]
    SigningFailed { message: String },
}

impl UserFacingError for SigningError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::KeystoreNotFound { .. } => Some("Generate a keystore with `rvx keygen`."),
            Self::KeystoreLocked { .. } => Some("Check the keystore password."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::VerificationFailed { .. } => "signing.verification_failed",
            Self::NoTrustedKeyFound { .. } => "signing.no_trusted_key",
            Self::InvalidSignatureFormat(_) => "signing.invalid_signature",
            Self::InvalidPublicKey(_) => "signing.invalid_public_key",
            Self::KeystoreNotFound { .. } => "signing.keystore_not_found",
            Self::KeystoreLocked { .. } => "signing.keystore_locked",
            Self::SigningFailed { .. } => "signing.failed",
        })
    }
}
