use anyhow::Result;

use crate::blog::paths::BlogPaths;
use crate::commands::{CommandReport, open_archive};

pub fn run(paths: &BlogPaths) -> Result<CommandReport> {
    let manager = open_archive(paths)?;
    let mut report = CommandReport::new("list");

    report.detail(format!("entries={}", manager.len()));
    for (row, title) in manager.titles().into_iter().enumerate() {
        let position = manager.display_index_from_row(row as i64)?;
        report.detail(format!("row={row} position={position} title={title}"));
    }

    Ok(report)
}
