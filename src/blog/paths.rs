use crate::blog::config::BlogConfig;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = ".gitblogger.lock";

#[derive(Debug, Clone)]
pub struct BlogPaths {
    pub index_path: PathBuf,
    pub basedir: PathBuf,
    pub logs_dir: PathBuf,
    pub lock_path: PathBuf,
    pub audit_enabled: bool,
}

/// Directory holding the index file; every content subdirectory lives under it.
pub fn basedir_of(index_path: &Path) -> PathBuf {
    match index_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl BlogPaths {
    pub fn for_index(index_path: PathBuf, logs_dir: Option<PathBuf>, audit_enabled: bool) -> Self {
        let basedir = basedir_of(&index_path);
        let logs_dir = logs_dir.unwrap_or_else(|| basedir.join(".gitblogger").join("logs"));
        let lock_path = basedir.join(LOCK_FILE);
        Self {
            index_path,
            basedir,
            logs_dir,
            lock_path,
            audit_enabled,
        }
    }
}

pub fn resolve_paths(cli_index: Option<&Path>, cfg: &BlogConfig) -> BlogPaths {
    let index_path = cli_index
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&cfg.archive.index_path));
    let logs_dir = cfg.audit.logs_dir.as_deref().map(PathBuf::from);
    BlogPaths::for_index(index_path, logs_dir, cfg.audit.enabled)
}
