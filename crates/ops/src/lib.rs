#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations for rvx
//!
//! This crate is the boundary between a host (the CLI) and the catalog and
//! pipeline crates. Every operation takes the shared [`OpsCtx`], runs its
//! work on a blocking worker and reports through the context's event channel.

mod context;
mod keys;
mod patch;
mod query;
mod types;

pub use context::{OpsContextBuilder, OpsCtx};
pub use keys::generate_signing_key;
pub use patch::run_patcher;
pub use query::{compatible_packages, filtered_patches, load_patches, needs_resource_patching};
pub use rvx_pipeline::PatcherRequest;
pub use types::OperationResult;
