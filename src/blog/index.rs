use crate::error::ArchiveError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One archived post. Its position in [`Index::logs`] names its content directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub title: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(rename = "publishTime", default)]
    pub publish_time: i64,
}

/// A log that has not been published yet; `publish_time` is stamped on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDraft {
    pub title: String,
    pub topics: Vec<String>,
}

impl LogDraft {
    pub fn new(title: impl Into<String>, topics: Vec<String>) -> Self {
        Self {
            title: title.into(),
            topics,
        }
    }

    pub fn validate(&self) -> Result<(), ArchiveError> {
        if self.title.trim().is_empty() {
            return Err(ArchiveError::InvalidLog("title cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn stamp(self, publish_time: i64) -> Log {
        Log {
            title: self.title,
            topics: self.topics,
            publish_time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub logs: Vec<Log>,
}

pub fn load(path: &Path) -> Result<Index, ArchiveError> {
    let corrupt = |reason: String| ArchiveError::CorruptIndex {
        path: path.to_path_buf(),
        reason,
    };
    let raw = fs::read_to_string(path).map_err(|err| corrupt(err.to_string()))?;
    serde_json::from_str(&raw).map_err(|err| corrupt(err.to_string()))
}

/// Replace the whole index file: write a sibling temp file, then rename it over `path`.
pub fn save(path: &Path, index: &Index) -> Result<(), ArchiveError> {
    let write_failure = |reason: String| ArchiveError::WriteFailure {
        path: path.to_path_buf(),
        reason,
    };
    let data = serde_json::to_string(index).map_err(|err| write_failure(err.to_string()))?;

    let dir = crate::blog::paths::basedir_of(path);
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|err| write_failure(err.to_string()))?;
    tmp.write_all(data.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|err| write_failure(err.to_string()))?;
    tmp.persist(path)
        .map_err(|err| write_failure(err.error.to_string()))?;
    Ok(())
}

/// Where a manager reads and rewrites its index document.
pub trait IndexStore: std::fmt::Debug {
    fn path(&self) -> &Path;
    fn load(&self) -> Result<Index, ArchiveError>;
    fn save(&self, index: &Index) -> Result<(), ArchiveError>;
}

#[derive(Debug, Clone)]
pub struct FileIndexStore {
    path: PathBuf,
}

impl FileIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IndexStore for FileIndexStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Index, ArchiveError> {
        load(&self.path)
    }

    fn save(&self, index: &Index) -> Result<(), ArchiveError> {
        save(&self.path, index)
    }
}

/// Write `{"logs":[]}` unless an index already exists. Returns whether a file was created.
pub fn create_empty(path: &Path) -> Result<bool, ArchiveError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| ArchiveError::WriteFailure {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    }
    save(path, &Index::default())?;
    Ok(true)
}
