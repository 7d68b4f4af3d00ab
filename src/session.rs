use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::{SessionConfig, SessionStoreKind};
use crate::errors::NotesResult;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Holder of the single authentication token for the current user.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> NotesResult<Option<String>>;

    fn set_token(&self, token: &str) -> NotesResult<()>;

    fn clear(&self) -> NotesResult<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> NotesResult<Option<String>> {
        Ok(self.token.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn set_token(&self, token: &str) -> NotesResult<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> NotesResult<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Persists the token as a JSON object keyed by [`TOKEN_KEY`], surviving restarts.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> NotesResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> NotesResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> NotesResult<Option<String>> {
        Ok(self.read_entries()?.remove(TOKEN_KEY))
    }

    fn set_token(&self, token: &str) -> NotesResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), "session token stored");
        Ok(())
    }

    fn clear(&self) -> NotesResult<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
            tracing::debug!(path = %self.path.display(), "session token cleared");
        }
        Ok(())
    }
}

/// `~/.local/share/notecards/session.json` on Linux, the platform data dir elsewhere,
/// falling back to the working directory.
pub fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("notecards"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("session.json")
}

/// Explicit session context handed to everything that makes authenticated requests.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        match config.store {
            SessionStoreKind::Memory => Self::in_memory(),
            SessionStoreKind::File => {
                let path = config.path.clone().unwrap_or_else(default_session_path);
                tracing::info!(path = %path.display(), "using file session store");
                Self::new(Arc::new(FileSessionStore::new(path)))
            }
        }
    }

    /// The stored token, ignoring empty values.
    pub fn token(&self) -> NotesResult<Option<String>> {
        Ok(self.store.token()?.filter(|t| !t.is_empty()))
    }

    pub fn store_token(&self, token: &str) -> NotesResult<()> {
        self.store.set_token(token)
    }

    pub fn clear(&self) -> NotesResult<()> {
        self.store.clear()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}
