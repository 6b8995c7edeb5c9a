use anyhow::Result;

use crate::blog::audit;
use crate::blog::content;
use crate::blog::paths::BlogPaths;
use crate::blog::warn::{self, WarnEvent};
use crate::commands::{CommandReport, open_archive};

pub fn run(paths: &BlogPaths) -> Result<CommandReport> {
    let manager = open_archive(paths)?;
    let mut report = CommandReport::new("status");
    report.detail(format!("index_path={}", manager.index_path().display()));
    report.detail(format!("basedir={}", manager.basedir().display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!("audit_enabled={}", paths.audit_enabled));
    if paths.audit_enabled {
        match audit::read_events(paths) {
            Ok(events) => report.detail(format!("audit_events={}", events.len())),
            Err(err) => report.issue(format!("audit log unreadable: {err:#}")),
        }
    }
    report.detail(format!("entries={}", manager.len()));

    let mut readable = 0usize;
    for (position, log) in manager.logs().iter().enumerate() {
        match content::read_raw(manager.basedir(), position) {
            Ok(_) => readable += 1,
            Err(err) => {
                let path = content::content_path(manager.basedir(), position);
                warn::emit(WarnEvent {
                    code: "CONTENT_MISSING",
                    stage: "status",
                    action: "read-content",
                    position: Some(position),
                    path: &path.display().to_string(),
                    reason: "content-unreadable",
                    err: &err.to_string(),
                });
                report.archive_issue(&err);
                report.detail(format!("missing_content position={position} title={}", log.title));
            }
        }
    }
    report.detail(format!("content_readable={readable}"));

    Ok(report)
}
