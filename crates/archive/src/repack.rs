use crate::{DEFAULT_ALIGNMENT, NATIVE_LIBRARY_ALIGNMENT};
use rvx_errors::{ArchiveError, Error};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name and storage details of an archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub compressed: bool,
    pub is_dir: bool,
    pub size: u64,
}

/// Alignment rule for copied entries.
///
/// Compressed entries keep their raw bytes and get no alignment. Stored
/// `.so` files are page aligned and other stored entries 4-byte aligned.
#[must_use]
pub fn entry_alignment(entry: &EntryInfo) -> Option<u16> {
    if entry.compressed {
        None
    } else if Path::new(&entry.name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("so"))
    {
        Some(NATIVE_LIBRARY_ALIGNMENT)
    } else {
        Some(DEFAULT_ALIGNMENT)
    }
}

/// Writes a new archive where the first writer of a name wins
pub struct Repacker {
    path: PathBuf,
    writer: ZipWriter<BufWriter<File>>,
    written: HashSet<String>,
}

impl Repacker {
    /// Create (or truncate) the archive at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path).map_err(|e| ArchiveError::OpenFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: ZipWriter::new(BufWriter::new(file)),
            written: HashSet::new(),
        })
    }

    /// Whether an entry with this name was already written
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.written.contains(name)
    }

    /// Number of entries written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.written.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Add `bytes` as a deflated entry. Returns `false` if the name was taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    pub fn add_entry_compressed(&mut self, name: &str, bytes: &[u8]) -> Result<bool, Error> {
        if self.contains(name) {
            return Ok(false);
        }
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(name, options)
            .map_err(|e| write_failed(name, &e))?;
        io::Write::write_all(&mut self.writer, bytes).map_err(|e| write_failed(name, &e))?;
        self.written.insert(name.to_string());
        Ok(true)
    }

    /// Add a file from disk as a deflated entry
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn add_file_compressed(&mut self, name: &str, source: &Path) -> Result<bool, Error> {
        if self.contains(name) {
            return Ok(false);
        }
        let bytes = std::fs::read(source).map_err(|e| ArchiveError::ReadFailed {
            entry: source.display().to_string(),
            message: e.to_string(),
        })?;
        self.add_entry_compressed(name, &bytes)
    }

    /// Copy every entry of `source` whose name is still free.
    ///
    /// `alignment` decides per entry: `None` copies the raw (possibly
    /// compressed) bytes as they are, `Some(n)` rewrites the entry with its
    /// data aligned to `n` bytes. Returns the number of entries copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or an entry cannot be
    /// written.
    pub fn copy_entries_aligned<F>(&mut self, source: &Path, alignment: F) -> Result<usize, Error>
    where
        F: Fn(&EntryInfo) -> Option<u16>,
    {
        let mut archive = open_archive(source)?;
        let mut copied = 0;

        for index in 0..archive.len() {
            let info = {
                let entry = archive.by_index_raw(index)?;
                EntryInfo {
                    name: entry.name().to_string(),
                    compressed: entry.compression() != CompressionMethod::Stored,
                    is_dir: entry.is_dir(),
                    size: entry.size(),
                }
            };
            if self.contains(&info.name) {
                tracing::trace!(entry = %info.name, "skipping entry already written");
                continue;
            }

            if info.is_dir {
                self.writer
                    .add_directory(info.name.as_str(), SimpleFileOptions::default())
                    .map_err(|e| write_failed(&info.name, &e))?;
            } else if let Some(align) = alignment(&info) {
                let mut entry = archive.by_index(index)?;
                let options = SimpleFileOptions::default()
                    .compression_method(entry.compression())
                    .with_alignment(align);
                self.writer
                    .start_file(info.name.as_str(), options)
                    .map_err(|e| write_failed(&info.name, &e))?;
                io::copy(&mut entry, &mut self.writer).map_err(|e| write_failed(&info.name, &e))?;
            } else {
                let entry = archive.by_index_raw(index)?;
                self.writer
                    .raw_copy_file(entry)
                    .map_err(|e| write_failed(&info.name, &e))?;
            }

            self.written.insert(info.name);
            copied += 1;
        }

        tracing::debug!(source = %source.display(), copied, "copied archive entries");
        Ok(copied)
    }

    /// Write the central directory and close the archive
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be finalized.
    pub fn finish(self) -> Result<PathBuf, Error> {
        let finalize_failed = |message: String| ArchiveError::FinalizeFailed {
            path: self.path.display().to_string(),
            message,
        };
        let buffer = self
            .writer
            .finish()
            .map_err(|e| finalize_failed(e.to_string()))?;
        buffer
            .into_inner()
            .map_err(|e| finalize_failed(e.error().to_string()))?;
        Ok(self.path)
    }
}

fn write_failed(entry: &str, err: &dyn std::fmt::Display) -> ArchiveError {
    ArchiveError::WriteFailed {
        entry: entry.to_string(),
        message: err.to_string(),
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>, Error> {
    let file = File::open(path).map_err(|e| ArchiveError::OpenFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| {
        ArchiveError::OpenFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// List entries of an archive in storage order
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or read.
pub fn list_entries(path: &Path) -> Result<Vec<EntryInfo>, Error> {
    let mut archive = open_archive(path)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        entries.push(EntryInfo {
            name: entry.name().to_string(),
            compressed: entry.compression() != CompressionMethod::Stored,
            is_dir: entry.is_dir(),
            size: entry.size(),
        });
    }
    Ok(entries)
}

/// Read one entry's decompressed bytes
///
/// # Errors
///
/// Returns `EntryNotFound` if the archive has no such entry.
pub fn read_entry(path: &Path, name: &str) -> Result<Vec<u8>, Error> {
    let mut archive = open_archive(path)?;
    let mut entry = archive.by_name(name).map_err(|_| ArchiveError::EntryNotFound {
        entry: name.to_string(),
    })?;
    let mut bytes = Vec::new();
    io::Read::read_to_end(&mut entry, &mut bytes).map_err(|e| ArchiveError::ReadFailed {
        entry: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, compressed: bool) -> EntryInfo {
        EntryInfo {
            name: name.to_string(),
            compressed,
            is_dir: false,
            size: 0,
        }
    }

    #[test]
    fn test_alignment_rules() {
        assert_eq!(entry_alignment(&info("lib/arm64-v8a/libfoo.so", false)), Some(4096));
        assert_eq!(entry_alignment(&info("resources.arsc", false)), Some(4));
        assert_eq!(entry_alignment(&info("lib/arm64-v8a/libfoo.so", true)), None);
        assert_eq!(entry_alignment(&info("classes.dex", true)), None);
    }
}
