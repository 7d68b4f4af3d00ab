use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::{NotesError, NotesResult};

pub const DEFAULT_COLOR: &str = "#FFF59D";

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

/// Identifier of a note.
///
/// Server ids are the backend's numeric primary keys. Pending ids belong to
/// drafts that were never saved and can never collide with a server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Server(u64),
    Pending(Uuid),
}

impl NoteId {
    pub fn new_pending() -> Self {
        NoteId::Pending(Uuid::new_v4())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, NoteId::Pending(_))
    }

    pub fn server_id(&self) -> Option<u64> {
        match self {
            NoteId::Server(id) => Some(*id),
            NoteId::Pending(_) => None,
        }
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Server(id) => write!(f, "{id}"),
            NoteId::Pending(uuid) => write!(f, "pending-{uuid}"),
        }
    }
}

impl From<u64> for NoteId {
    fn from(id: u64) -> Self {
        NoteId::Server(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    /// The backend calls this field `content`.
    #[serde(default, alias = "content")]
    pub body: String,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub color: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        default,
        rename = "createdAt",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl Note {
    /// A blank note under a fresh pending id.
    pub fn blank(color: impl Into<String>) -> Self {
        Self {
            id: NoteId::new_pending(),
            title: String::new(),
            body: String::new(),
            color: color.into(),
            date: None,
            time: None,
            created_at: None,
        }
    }

    pub fn titled(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: NoteId::Server(id),
            title: title.into(),
            ..Self::blank(DEFAULT_COLOR)
        }
    }
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn color_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|c| !c.is_empty()).unwrap_or_else(default_color))
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

pub fn validate_color(color: &str) -> NotesResult<String> {
    if HEX_COLOR.is_match(color) {
        Ok(color.to_string())
    } else {
        Err(NotesError::validation(format!("Invalid color '{color}', expected #RGB or #RRGGBB")))
    }
}

/// Accepts the `YYYY-MM-DD` form produced by date inputs. Empty clears the date.
pub fn parse_date(input: &str) -> NotesResult<Option<String>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| Some(d.format("%Y-%m-%d").to_string()))
        .map_err(|_| NotesError::validation(format!("Invalid date '{input}', expected YYYY-MM-DD")))
}

/// Accepts `HH:MM` or `HH:MM:SS`. Empty clears the time.
pub fn parse_time(input: &str) -> NotesResult<Option<String>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map(|_| Some(input.to_string()))
        .map_err(|_| NotesError::validation(format!("Invalid time '{input}', expected HH:MM")))
}
