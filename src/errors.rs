use thiserror::Error;

use crate::note::NoteId;

#[derive(Debug, Error)]
pub enum NotesError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("Not logged in")]
    Unauthenticated,

    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Api { status: u16, message: Option<String> },

    #[error("Note {0} not found")]
    NoteNotFound(NoteId),

    #[error("No note is being edited")]
    NoDraft,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl NotesError {
    pub fn validation(msg: impl Into<String>) -> Self {
        NotesError::Validation(msg.into())
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, NotesError::Unauthenticated)
    }
}

impl serde::Serialize for NotesError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type NotesResult<T> = Result<T, NotesError>;
