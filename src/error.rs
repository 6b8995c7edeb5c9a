use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("index file {} is missing or corrupt: {reason}", .path.display())]
    CorruptIndex { path: PathBuf, reason: String },
    #[error("failed to write {}: {reason}", .path.display())]
    WriteFailure { path: PathBuf, reason: String },
    #[error("entry {requested} out of range (archive holds {len} entries)")]
    OutOfRange { requested: i64, len: usize },
    #[error("content for entry {position} unavailable at {}: {reason}", .path.display())]
    ContentMissing {
        position: usize,
        path: PathBuf,
        reason: String,
    },
    #[error("archive is locked by another writer: {}", .path.display())]
    Locked { path: PathBuf },
    #[error("invalid log: {0}")]
    InvalidLog(String),
    #[error(
        "index file {} changed underneath this writer ({memory} entries held, {disk} on disk); reopen the archive",
        .path.display()
    )]
    StaleIndex {
        path: PathBuf,
        memory: usize,
        disk: usize,
    },
}

impl ArchiveError {
    pub fn code(&self) -> BlogErrorCode {
        match self {
            Self::CorruptIndex { .. } => BlogErrorCode::E001CorruptIndex,
            Self::WriteFailure { .. } => BlogErrorCode::E002WriteFailure,
            Self::OutOfRange { .. } => BlogErrorCode::E003OutOfRange,
            Self::ContentMissing { .. } => BlogErrorCode::E004ContentMissing,
            Self::Locked { .. } => BlogErrorCode::E005Locked,
            Self::InvalidLog(_) => BlogErrorCode::E006InvalidLog,
            Self::StaleIndex { .. } => BlogErrorCode::E007StaleIndex,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogErrorCode {
    E001CorruptIndex,
    E002WriteFailure,
    E003OutOfRange,
    E004ContentMissing,
    E005Locked,
    E006InvalidLog,
    E007StaleIndex,
}

impl BlogErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::E001CorruptIndex => "E001_CORRUPT_INDEX",
            Self::E002WriteFailure => "E002_WRITE_FAILURE",
            Self::E003OutOfRange => "E003_OUT_OF_RANGE",
            Self::E004ContentMissing => "E004_CONTENT_MISSING",
            Self::E005Locked => "E005_LOCKED",
            Self::E006InvalidLog => "E006_INVALID_LOG",
            Self::E007StaleIndex => "E007_STALE_INDEX",
        }
    }
}
