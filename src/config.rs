use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{NotesError, NotesResult};
use crate::note::{validate_color, DEFAULT_COLOR};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme and host of the backend; routes are appended under `/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStoreKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub store: SessionStoreKind,
    /// Overrides the default `<data dir>/notecards/session.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// How note edits and deletions reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Applied to the local collection only and discarded by the next load.
    #[default]
    LocalOnly,
    /// Sent as PUT/DELETE before the local collection is touched.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_color")]
    pub default_color: String,
    #[serde(default)]
    pub sync_policy: SyncPolicy,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            sync_policy: SyncPolicy::default(),
        }
    }
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl AppConfig {
    /// Applies `NOTECARDS_API_BASE` and `NOTECARDS_SESSION_PATH` on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var("NOTECARDS_API_BASE") {
            if !base.is_empty() {
                tracing::debug!(base_url = %base, "api base overridden from env");
                self.api.base_url = base;
            }
        }
        if let Ok(path) = std::env::var("NOTECARDS_SESSION_PATH") {
            if !path.is_empty() {
                self.session.path = Some(PathBuf::from(path));
            }
        }
    }
}

fn resolve_config_path() -> NotesResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(NotesError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn parse_config(content: &str) -> NotesResult<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://") {
        return Err(NotesError::Config(format!(
            "api.base_url must start with http:// or https://, got '{}'",
            config.api.base_url
        )));
    }
    validate_color(&config.notes.default_color)
        .map_err(|e| NotesError::Config(format!("notes.default_color: {e}")))?;
    Ok(config)
}

pub fn load_config() -> NotesResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let mut config = parse_config(&content)?;
    config.apply_env_overrides();
    tracing::info!(
        path = %path.display(),
        base_url = %config.api.base_url,
        sync_policy = ?config.notes.sync_policy,
        "config loaded"
    );
    Ok(config)
}
