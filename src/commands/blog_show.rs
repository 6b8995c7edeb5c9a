use anyhow::Result;

use crate::blog::detail::detail_rows;
use crate::blog::paths::BlogPaths;
use crate::blog::render::{MarkdownRenderer, render_entry};
use crate::blog::warn::{self, WarnEvent};
use crate::commands::{CommandReport, EntrySelector, open_archive};
use crate::error::ArchiveError;

#[derive(Debug, Clone)]
pub struct ShowOptions {
    pub selector: EntrySelector,
    pub html: bool,
}

pub fn run(paths: &BlogPaths, opts: &ShowOptions) -> Result<CommandReport> {
    let manager = open_archive(paths)?;
    let mut report = CommandReport::new("show");

    let entry = match opts.selector.resolve(&manager) {
        Ok(entry) => entry,
        Err(err) => {
            if let ArchiveError::ContentMissing {
                position,
                path,
                reason,
            } = &err
            {
                warn::emit(WarnEvent {
                    code: "CONTENT_MISSING",
                    stage: "show",
                    action: "read-content",
                    position: Some(*position),
                    path: &path.display().to_string(),
                    reason,
                    err: "",
                });
            }
            report.archive_issue(&err);
            return Ok(report);
        }
    };

    if opts.html {
        let view = render_entry(&entry, &MarkdownRenderer);
        for (key, value) in &view.rows {
            report.detail(format!("{key}={value}"));
        }
        report.body(view.html);
    } else {
        for (key, value) in detail_rows(&entry) {
            report.detail(format!("{key}={value}"));
        }
        report.body(entry.content);
    }

    Ok(report)
}
