use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::blog::paths::BlogPaths;
use crate::blog::render::{MarkdownRenderer, Renderer, standalone_document};
use crate::commands::{CommandReport, EntrySelector, open_archive};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub selector: EntrySelector,
    pub out: Option<PathBuf>,
    pub html_title: Option<String>,
}

pub fn run(paths: &BlogPaths, opts: &RenderOptions) -> Result<CommandReport> {
    let manager = open_archive(paths)?;
    let mut report = CommandReport::new("render");

    let entry = match opts.selector.resolve(&manager) {
        Ok(entry) => entry,
        Err(err) => {
            report.archive_issue(&err);
            return Ok(report);
        }
    };
    report.detail(format!("position={}", entry.position));

    let fragment = MarkdownRenderer.render(&entry.content);
    let html = match &opts.html_title {
        Some(prefix) => standalone_document(&format!("{prefix} - {}", entry.log.title), &fragment),
        None => fragment,
    };

    match &opts.out {
        Some(out) => {
            fs::write(out, &html).with_context(|| format!("failed to write {}", out.display()))?;
            report.detail(format!("html_path={}", out.display()));
            report.detail(format!("bytes={}", html.len()));
        }
        None => report.body(html),
    }

    Ok(report)
}
