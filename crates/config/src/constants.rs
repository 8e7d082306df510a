//! Fixed names and fallbacks used when the configuration leaves a value unset

/// Directory name under the platform config/cache dirs
pub const APP_DIR: &str = "rvx";

pub const CONFIG_FILE: &str = "config.toml";

/// Signer name stamped into the trusted comment of every signature
pub const DEFAULT_SIGNER_NAME: &str = "ReVanced";

/// Fallback cache root when the platform has no cache directory
pub const FALLBACK_CACHE_DIR: &str = "/tmp/rvx";

/// Engine executable looked up on `PATH` when none is configured
pub const DEFAULT_ENGINE_COMMAND: &str = "rvx-engine";

/// Per-run file names inside the cache directory
pub const WORKING_INPUT: &str = "input.apk";
pub const PATCHED_OUTPUT: &str = "patched.apk";
pub const PATCH_CACHE: &str = "patch-cache";
pub const BUNDLE_WORK_DIR: &str = "bundles";
