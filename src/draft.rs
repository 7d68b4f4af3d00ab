use serde::Serialize;

use crate::errors::{NotesError, NotesResult};
use crate::note::{parse_date, parse_time, validate_color, Note};

pub const TITLE_REQUIRED: &str = "Title required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftMode {
    New,
    Existing,
}

/// Working copy of a note. Owned, so edits never reach the collection until committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub mode: DraftMode,
    pub note: Note,
}

impl Draft {
    /// "New Note" while the title is empty, "Edit Note" otherwise.
    pub fn heading(&self) -> &'static str {
        if self.note.title.is_empty() {
            "New Note"
        } else {
            "Edit Note"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Body,
    Color,
    Date,
    Time,
}

impl std::str::FromStr for DraftField {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(DraftField::Title),
            "body" | "content" => Ok(DraftField::Body),
            "color" => Ok(DraftField::Color),
            "date" => Ok(DraftField::Date),
            "time" => Ok(DraftField::Time),
            other => Err(NotesError::validation(format!("Unknown field '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NoteModal {
    #[default]
    Closed,
    Editing(Draft),
}

impl NoteModal {
    pub fn is_open(&self) -> bool {
        matches!(self, NoteModal::Editing(_))
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            NoteModal::Editing(draft) => Some(draft),
            NoteModal::Closed => None,
        }
    }

    /// Opens a blank draft under a pending id. Replaces any open draft.
    pub fn open_new(&mut self, default_color: &str) {
        let note = Note::blank(default_color);
        tracing::debug!(id = %note.id, "opening new note draft");
        *self = NoteModal::Editing(Draft {
            mode: DraftMode::New,
            note,
        });
    }

    pub fn open_existing(&mut self, note: &Note) {
        tracing::debug!(id = %note.id, "opening note for edit");
        *self = NoteModal::Editing(Draft {
            mode: DraftMode::Existing,
            note: note.clone(),
        });
    }

    /// Sets one field of the open draft. Invalid values leave the draft untouched.
    pub fn set_field(&mut self, field: DraftField, value: &str) -> NotesResult<()> {
        let NoteModal::Editing(draft) = self else {
            return Err(NotesError::NoDraft);
        };
        let note = &mut draft.note;
        match field {
            DraftField::Title => note.title = value.to_string(),
            DraftField::Body => note.body = value.to_string(),
            DraftField::Color => note.color = validate_color(value.trim())?,
            DraftField::Date => note.date = parse_date(value)?,
            DraftField::Time => note.time = parse_time(value)?,
        }
        Ok(())
    }

    /// Validates the draft and hands out a copy for committing. The modal stays open;
    /// call [`NoteModal::close`] once the commit went through.
    pub fn prepare_save(&self) -> NotesResult<Note> {
        let draft = self.draft().ok_or(NotesError::NoDraft)?;
        if draft.note.title.is_empty() {
            return Err(NotesError::validation(TITLE_REQUIRED));
        }
        Ok(draft.note.clone())
    }

    /// Cancel, or the end of a successful save. Returns the discarded draft.
    pub fn close(&mut self) -> Option<Draft> {
        match std::mem::take(self) {
            NoteModal::Editing(draft) => Some(draft),
            NoteModal::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{NoteId, DEFAULT_COLOR};

    #[test]
    fn new_draft_has_pending_id_and_defaults() {
        let mut modal = NoteModal::default();
        modal.open_new(DEFAULT_COLOR);

        let draft = modal.draft().unwrap();
        assert_eq!(draft.mode, DraftMode::New);
        assert!(draft.note.id.is_pending());
        assert_eq!(draft.note.color, DEFAULT_COLOR);
        assert_eq!(draft.note.date, None);
        assert_eq!(draft.heading(), "New Note");
    }

    #[test]
    fn editing_a_copy_leaves_original_alone() {
        let original = Note::titled(2, "B");
        let mut modal = NoteModal::default();
        modal.open_existing(&original);
        modal.set_field(DraftField::Title, "B2").unwrap();

        assert_eq!(original.title, "B");
        assert_eq!(modal.draft().unwrap().note.title, "B2");
        assert_eq!(modal.draft().unwrap().mode, DraftMode::Existing);
        assert_eq!(modal.draft().unwrap().heading(), "Edit Note");
    }

    #[test]
    fn empty_title_blocks_save() {
        let mut modal = NoteModal::default();
        modal.open_new(DEFAULT_COLOR);
        modal.set_field(DraftField::Body, "text").unwrap();

        let err = modal.prepare_save().unwrap_err();
        assert_eq!(err.to_string(), TITLE_REQUIRED);
        assert!(modal.is_open());
    }

    #[test]
    fn invalid_field_values_keep_previous_value() {
        let mut modal = NoteModal::default();
        modal.open_existing(&Note::titled(1, "A"));
        modal.set_field(DraftField::Date, "2025-03-01").unwrap();

        assert!(modal.set_field(DraftField::Date, "yesterday").is_err());
        assert!(modal.set_field(DraftField::Color, "blue").is_err());
        assert!(modal.set_field(DraftField::Time, "7pm").is_err());

        let note = &modal.draft().unwrap().note;
        assert_eq!(note.date.as_deref(), Some("2025-03-01"));
        assert_eq!(note.color, DEFAULT_COLOR);
        assert_eq!(note.time, None);

        modal.set_field(DraftField::Date, "").unwrap();
        assert_eq!(modal.draft().unwrap().note.date, None);
    }

    #[test]
    fn closed_modal_rejects_edits_and_saves() {
        let mut modal = NoteModal::default();
        assert!(matches!(modal.set_field(DraftField::Title, "x"), Err(NotesError::NoDraft)));
        assert!(matches!(modal.prepare_save(), Err(NotesError::NoDraft)));
        assert_eq!(modal.close(), None);
    }

    #[test]
    fn close_discards_draft() {
        let mut modal = NoteModal::default();
        modal.open_existing(&Note::titled(5, "E"));
        let draft = modal.close().unwrap();
        assert_eq!(draft.note.id, NoteId::Server(5));
        assert!(!modal.is_open());
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("content".parse::<DraftField>().unwrap(), DraftField::Body);
        assert!("colour".parse::<DraftField>().is_err());
    }
}
