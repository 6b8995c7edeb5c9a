use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub index_path: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            index_path: "index.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenderConfig {
    /// Wraps rendered HTML in a standalone document when set.
    pub html_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub enabled: bool,
    pub logs_dir: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            logs_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlogConfig {
    pub archive: ArchiveConfig,
    pub render: RenderConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialBlogConfig {
    archive: Option<ArchiveConfig>,
    render: Option<RenderConfig>,
    audit: Option<AuditConfig>,
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_opt_string(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

fn validate(cfg: &BlogConfig) -> Result<()> {
    if cfg.archive.index_path.trim().is_empty() {
        return Err(anyhow!("invalid archive index path: cannot be empty"));
    }
    if let Some(dir) = &cfg.audit.logs_dir
        && dir.trim().is_empty()
    {
        return Err(anyhow!("invalid audit logs dir: cannot be empty"));
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("GITBLOGGER_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("gitblogger").join("gitblogger.toml"))
}

fn merge_toml(base: &mut BlogConfig, raw: &str) -> Result<()> {
    let parsed: PartialBlogConfig = toml::from_str(raw)?;
    if let Some(archive) = parsed.archive {
        base.archive = archive;
    }
    if let Some(render) = parsed.render {
        base.render = render;
    }
    if let Some(audit) = parsed.audit {
        base.audit = audit;
    }
    Ok(())
}

fn merge_file_config(base: &mut BlogConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    merge_toml(base, &raw)
        .map_err(|err| anyhow!("failed to parse gitblogger config {}: {err}", path.display()))
}

pub fn load_config() -> Result<BlogConfig> {
    let mut cfg = BlogConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.archive.index_path = env_or_string("GITBLOGGER_INDEX", &cfg.archive.index_path);
    cfg.audit.enabled = env_or_bool("GITBLOGGER_AUDIT_ENABLED", cfg.audit.enabled);
    cfg.audit.logs_dir = env_opt_string("GITBLOGGER_LOGS_DIR", cfg.audit.logs_dir.take());
    cfg.render.html_title = env_opt_string("GITBLOGGER_HTML_TITLE", cfg.render.html_title.take());

    validate(&cfg)?;
    Ok(cfg)
}
