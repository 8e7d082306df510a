use rvx_archive::{entry_alignment, Repacker};
use rvx_engine::EngineOutput;
use rvx_errors::Error;
use std::path::Path;

/// Build the patched archive.
///
/// Generated binaries go in first (deflated), then the rebuilt resource
/// entries, then whatever the working input still contributes. Copied entries
/// keep their compression and stored ones are aligned.
///
/// # Errors
///
/// Returns an error if any source cannot be read or the output cannot be
/// written.
pub fn repack_archive(output: &EngineOutput, input: &Path, patched: &Path) -> Result<(), Error> {
    let mut repacker = Repacker::create(patched)?;

    for binary in &output.binaries {
        repacker.add_file_compressed(&binary.name, &binary.path)?;
    }
    if let Some(resources) = &output.resource_archive {
        repacker.copy_entries_aligned(resources, entry_alignment)?;
    }
    repacker.copy_entries_aligned(input, entry_alignment)?;

    let entries = repacker.len();
    repacker.finish()?;
    tracing::debug!(patched = %patched.display(), entries, "repacked archive");
    Ok(())
}
