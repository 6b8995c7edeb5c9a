use anyhow::Result;

use crate::blog::audit;
use crate::blog::index;
use crate::blog::paths::BlogPaths;
use crate::commands::CommandReport;

pub fn run(paths: &BlogPaths) -> Result<CommandReport> {
    let mut report = CommandReport::new("init");
    report.detail(format!("index_path={}", paths.index_path.display()));
    report.detail(format!("basedir={}", paths.basedir.display()));

    if index::create_empty(&paths.index_path)? {
        audit::record(
            paths,
            "init",
            "ok",
            &format!("created {}", paths.index_path.display()),
        );
        report.detail("index created");
    } else {
        report.detail("index already exists; left untouched");
    }

    Ok(report)
}
