pub mod blog_init;
pub mod blog_list;
pub mod blog_publish;
pub mod blog_render;
pub mod blog_show;
pub mod blog_status;

use anyhow::Result;
use serde::Serialize;

use crate::blog::manager::{BlogManager, ResolvedEntry};
use crate::blog::paths::BlogPaths;
use crate::error::ArchiveError;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
            body: None,
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn body(&mut self, text: impl Into<String>) {
        self.body = Some(text.into());
    }

    /// Record an archive error under its stable code.
    pub fn archive_issue(&mut self, err: &ArchiveError) {
        self.issue(format!("{}: {err}", err.code().as_str()));
    }
}

/// Either a newest-first row or a creation-order position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySelector {
    Row(i64),
    Position(i64),
}

impl EntrySelector {
    pub fn resolve(self, manager: &BlogManager) -> Result<ResolvedEntry, ArchiveError> {
        let position = match self {
            Self::Row(row) => manager.display_index_from_row(row)? as i64,
            Self::Position(position) => position,
        };
        manager.resolve_entry(position)
    }
}

/// Opening is fatal on a corrupt index: the archive is refused outright.
pub fn open_archive(paths: &BlogPaths) -> Result<BlogManager> {
    Ok(BlogManager::open(paths.clone())?)
}
