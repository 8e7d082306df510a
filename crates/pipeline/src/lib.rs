#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Patch run orchestration for rvx
//!
//! A run moves a package through copy, unpack, integrations, apply, repack,
//! sign and done. Each stage reports a fixed progress update; any failure
//! outside of individual patches and signing aborts the run. Everything that
//! happens is recorded in a [`RunReport`](rvx_types::RunReport), and the event
//! stream is a projection of that report.

mod locks;
mod logger;
mod pipeline;
mod recorder;
mod repack;
pub mod stages;

pub use locks::{RunClaim, RunLocks};
pub use logger::ChannelLogger;
pub use pipeline::{PatchPipeline, PatcherRequest};
pub use recorder::RunRecorder;
pub use repack::repack_archive;
