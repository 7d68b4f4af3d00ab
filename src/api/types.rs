use serde::{Deserialize, Serialize};

use crate::note::Note;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of a 2xx login response. The token is absent when the backend misbehaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{"error": "..."}` as returned by the backend on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extracts the `error` text from a raw response body, if it is JSON and has one.
    pub fn message_from(raw: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(raw)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.is_empty())
    }
}

/// The backend stores only title and content; color, date and time stay client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

impl From<&Note> for CreateNoteRequest {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.body.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl From<&Note> for UpdateNoteRequest {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.body.clone(),
            color: note.color.clone(),
            date: note.date.clone(),
            time: note.time.clone(),
        }
    }
}
