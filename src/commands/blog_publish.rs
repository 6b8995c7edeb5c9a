use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::blog::content;
use crate::blog::index::LogDraft;
use crate::blog::paths::BlogPaths;
use crate::commands::{CommandReport, open_archive};
use crate::error::ArchiveError;

#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub title: String,
    pub topics: Vec<String>,
    pub content_file: Option<PathBuf>,
    pub metadata_only: bool,
}

pub fn run(paths: &BlogPaths, opts: &PublishOptions) -> Result<CommandReport> {
    let mut manager = open_archive(paths)?;
    let mut report = CommandReport::new("publish");
    let draft = LogDraft::new(opts.title.trim(), opts.topics.clone());
    let published = manager.subscribe();

    let outcome = if opts.metadata_only {
        let next = content::content_path(manager.basedir(), manager.len());
        if !next.is_file() {
            report.detail(format!(
                "warning: {} does not exist yet; the entry will show as missing until it is written",
                next.display()
            ));
        }
        manager.append(draft)
    } else {
        let Some(source) = &opts.content_file else {
            report.issue("--content-file is required unless --metadata-only is set");
            return Ok(report);
        };
        let body = fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?;
        manager.publish(draft, &body)
    };

    match outcome {
        Ok(position) => {
            report.detail(format!("position={position}"));
            report.detail(format!(
                "content_path={}",
                content::content_path(manager.basedir(), position).display()
            ));
            report.detail(format!("entries={}", manager.len()));
            if let Some(event) = published.try_iter().find(|event| event.position == position) {
                report.detail(format!("listed_first={}", event.title));
            }
        }
        Err(err @ ArchiveError::WriteFailure { .. }) => {
            report.archive_issue(&err);
            report.issue("entry may not be durably saved; retry the publish");
        }
        Err(err) => report.archive_issue(&err),
    }

    Ok(report)
}
