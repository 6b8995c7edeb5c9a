use crate::error::ArchiveError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Exclusive advisory lock serializing writers of one archive. Released on drop.
#[derive(Debug)]
pub struct ArchiveLock {
    file: File,
}

impl ArchiveLock {
    pub fn acquire(path: &Path) -> Result<Self, ArchiveError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|err| ArchiveError::WriteFailure {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        file.try_lock_exclusive()
            .map_err(|_| ArchiveError::Locked {
                path: path.to_path_buf(),
            })?;
        Ok(Self { file })
    }
}

impl Drop for ArchiveLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
