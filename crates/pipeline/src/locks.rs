//! Exclusive claims on the paths a run writes to

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rvx_errors::{Error, PipelineError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Registry of paths owned by active runs
#[derive(Debug, Clone, Default)]
pub struct RunLocks {
    active: Arc<DashMap<PathBuf, Uuid>>,
}

impl RunLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every path for `run_id`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns `RunInProgress` naming the first path another run holds.
    pub fn claim<'a, I>(&self, run_id: Uuid, paths: I) -> Result<RunClaim, Error>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut claim = RunClaim {
            locks: self.clone(),
            paths: Vec::new(),
        };
        for path in paths {
            let held_elsewhere = match self.active.entry(path.to_path_buf()) {
                Entry::Occupied(entry) => *entry.get() != run_id,
                Entry::Vacant(entry) => {
                    entry.insert(run_id);
                    claim.paths.push(path.to_path_buf());
                    false
                }
            };
            if held_elsewhere {
                // dropping `claim` releases what was taken so far
                return Err(PipelineError::RunInProgress {
                    path: path.display().to_string(),
                }
                .into());
            }
        }
        Ok(claim)
    }

    #[must_use]
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.active.contains_key(path)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Releases its paths when dropped
#[derive(Debug)]
pub struct RunClaim {
    locks: RunLocks,
    paths: Vec<PathBuf>,
}

impl RunClaim {
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for RunClaim {
    fn drop(&mut self) {
        for path in &self.paths {
            self.locks.active.remove(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_claim_refused() {
        let locks = RunLocks::new();
        let cache = Path::new("/tmp/cache");
        let first = locks
            .claim(Uuid::new_v4(), [cache, Path::new("/tmp/a.apk")])
            .unwrap();

        let second = locks.claim(Uuid::new_v4(), [Path::new("/tmp/b.apk"), cache]);
        assert!(matches!(
            second,
            Err(Error::Pipeline(PipelineError::RunInProgress { .. }))
        ));
        // partial claim of the refused run was rolled back
        assert!(!locks.is_claimed(Path::new("/tmp/b.apk")));

        drop(first);
        assert_eq!(locks.active_count(), 0);
        assert!(locks.claim(Uuid::new_v4(), [cache]).is_ok());
    }

    #[test]
    fn test_same_path_twice_in_one_claim() {
        let locks = RunLocks::new();
        let path = Path::new("/tmp/same");
        let claim = locks.claim(Uuid::new_v4(), [path, path]).unwrap();
        assert_eq!(claim.paths().len(), 1);
    }
}
