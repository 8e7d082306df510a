//! Command line interface definition

use clap::{Parser, Subcommand};
use rvx_types::ColorChoice;
use std::path::PathBuf;

/// rvx - patch Android application packages
#[derive(Parser)]
#[command(name = "rvx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Patch Android application packages from patch bundles")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Patch bundle to load before running the command (repeatable)
    #[arg(long = "bundle", global = true, value_name = "PATH")]
    pub bundles: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// List packages the loaded patches target
    #[command(alias = "pkgs")]
    Packages,

    /// List patches compatible with a package version
    #[command(alias = "ls")]
    Patches {
        /// Target package name
        #[arg(long)]
        package: String,

        /// Target package version
        #[arg(long)]
        version: String,

        /// Accept every declared version
        #[arg(long)]
        ignore_version: bool,

        /// Accept any non-empty version list, as older managers did
        #[arg(long)]
        legacy_versions: bool,
    },

    /// Check whether a selection needs resource decoding
    NeedsResources {
        /// Target package name
        #[arg(long)]
        package: String,

        /// Selected patch names
        patches: Vec<String>,
    },

    /// Patch an application package
    Patch {
        /// Package to patch; left untouched
        #[arg(long, value_name = "PATH")]
        original: PathBuf,

        /// Where to write the signed result
        #[arg(long, short, value_name = "PATH")]
        output: PathBuf,

        /// Integrations archive to merge (repeatable)
        #[arg(long, value_name = "PATH")]
        integrations: Vec<PathBuf>,

        /// Secret key used for signing
        #[arg(long, value_name = "PATH")]
        keystore: Option<PathBuf>,

        /// Keystore password
        #[arg(long, env = "RVX_KEYSTORE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Working directory for this run
        #[arg(long, value_name = "PATH")]
        cache_dir: Option<PathBuf>,

        /// Patches to apply
        patches: Vec<String>,
    },

    /// Generate a signing key pair
    Keygen {
        /// Where to write the secret key
        #[arg(long, value_name = "PATH")]
        secret: PathBuf,

        /// Where to write the public key
        #[arg(long, value_name = "PATH")]
        public: PathBuf,

        /// Encrypt the secret key with a password
        #[arg(long)]
        password: Option<String>,
    },
}

impl Commands {
    /// Whether the command reads the patch catalog
    pub fn needs_catalog(&self) -> bool {
        !matches!(self, Self::Keygen { .. })
    }
}
