#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for rvx
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/rvx/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;

use rvx_errors::{ConfigError, Error};
use rvx_types::{ColorChoice, OutputFormat, VersionPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub signing: SigningConfig,

    #[serde(default)]
    pub patcher: PatcherConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub cache_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    /// Bundles loaded on every invocation, before any `--bundle` flags
    #[serde(default)]
    pub bundles: Vec<PathBuf>,
}

/// Signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    pub keystore: Option<PathBuf>,
    pub keystore_password: Option<String>,
    #[serde(default = "default_signer_name")]
    pub signer_name: String,
}

/// Patch run configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatcherConfig {
    #[serde(default)]
    pub version_policy: VersionPolicy,
    #[serde(default)]
    pub ignore_version: bool,
    /// Resource decoding tool handed to the engine
    pub resource_tool: Option<PathBuf>,
    pub engine_command: Option<PathBuf>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            keystore: None,
            keystore_password: None,
            signer_name: default_signer_name(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_signer_name() -> String {
    constants::DEFAULT_SIGNER_NAME.to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // RVX_OUTPUT
        if let Ok(output) = std::env::var("RVX_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "RVX_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // RVX_COLOR
        if let Ok(color) = std::env::var("RVX_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "RVX_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        if let Ok(dir) = std::env::var("RVX_CACHE_DIR") {
            self.paths.cache_dir = Some(PathBuf::from(dir));
        }

        if let Ok(keystore) = std::env::var("RVX_KEYSTORE") {
            self.signing.keystore = Some(PathBuf::from(keystore));
        }

        if let Ok(password) = std::env::var("RVX_KEYSTORE_PASSWORD") {
            self.signing.keystore_password = Some(password);
        }

        // RVX_VERSION_POLICY
        if let Ok(policy) = std::env::var("RVX_VERSION_POLICY") {
            self.patcher.version_policy =
                policy.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "RVX_VERSION_POLICY".to_string(),
                    value: policy,
                })?;
        }

        Ok(())
    }

    /// Get the cache root (with default)
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.paths.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir().map_or_else(
                || PathBuf::from(constants::FALLBACK_CACHE_DIR),
                |dir| dir.join(constants::APP_DIR),
            )
        })
    }

    /// Get the log directory (with default)
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.paths
            .log_dir
            .clone()
            .unwrap_or_else(|| self.cache_dir().join("logs"))
    }

    /// Work directory handed to bundle loaders
    #[must_use]
    pub fn bundle_work_dir(&self) -> PathBuf {
        self.cache_dir().join(constants::BUNDLE_WORK_DIR)
    }

    /// Get the engine executable (with default)
    #[must_use]
    pub fn engine_command(&self) -> PathBuf {
        self.patcher
            .engine_command
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_ENGINE_COMMAND))
    }
}
