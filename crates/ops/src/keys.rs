//! Signing key management

use crate::OpsCtx;
use rvx_errors::{Error, OpsError};
use rvx_events::EventEmitter;
use rvx_signing::{generate_keypair, save_public_key, save_secret_key};
use std::path::Path;

/// Generate a signing key pair and write both halves
///
/// The secret key is the keystore handed to `run_patcher`. Returns the public
/// key in base64.
///
/// # Errors
///
/// Returns an error if generation fails or either file cannot be written.
pub async fn generate_signing_key(
    ctx: &OpsCtx,
    secret_path: &Path,
    public_path: &Path,
    password: Option<String>,
) -> Result<String, Error> {
    ctx.emit_operation_started("Generating signing key");

    let secret = secret_path.to_path_buf();
    let public = public_path.to_path_buf();
    let public_key = tokio::task::spawn_blocking(move || {
        let pair = generate_keypair(password.as_deref())?;
        save_secret_key(&pair.secret, &secret)?;
        save_public_key(&pair.public, &public)?;
        Ok::<_, Error>(pair.public_base64())
    })
    .await
    .map_err(|e| OpsError::TaskFailed {
        message: e.to_string(),
    })??;

    tracing::info!(
        secret = %secret_path.display(),
        public = %public_path.display(),
        "signing key generated"
    );
    ctx.emit_operation_completed("Generating signing key", true);
    Ok(public_key)
}
