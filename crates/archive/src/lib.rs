#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package archive rewriting for rvx
//!
//! Patched packages are rebuilt from three sources in priority order:
//! engine-generated binaries, the rebuilt resource archive, then whatever is
//! left of the working input. The first source to write a name owns it.
//!
//! All functions here are blocking; callers run them on a blocking worker.

mod repack;

pub use repack::{entry_alignment, list_entries, read_entry, EntryInfo, Repacker};

/// Alignment for stored native libraries so they can be mapped directly
pub const NATIVE_LIBRARY_ALIGNMENT: u16 = 4096;

/// Alignment for every other stored entry
pub const DEFAULT_ALIGNMENT: u16 = 4;
