#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Patch catalog for rvx
//!
//! Holds the patch descriptors loaded from bundles and answers the queries a
//! caller needs before starting a run: which packages are covered, which
//! patches apply to a target, and whether a selection needs resource decoding.

mod bundle;
mod catalog;
mod graph;
pub mod matcher;
mod selection;

pub use bundle::{BundleLoader, ManifestBundleLoader, MANIFEST_NAME};
pub use catalog::{CatalogSnapshot, PatchCatalog};
pub use graph::DependencyGraph;
pub use matcher::is_compatible;
pub use selection::resolve;
