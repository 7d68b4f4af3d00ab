use serde::Serialize;

use crate::errors::{NotesError, NotesResult};
use crate::note::{Note, NoteId};

/// Whether an entry still matches what the server last returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Synced,
    /// Changed locally and never sent; the next load discards the change.
    LocalOnly,
}

#[derive(Debug, Clone)]
struct Entry {
    note: Note,
    sync: SyncState,
}

/// Local changes the server does not know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnsyncedChanges {
    pub edited: Vec<NoteId>,
    pub deleted: Vec<NoteId>,
}

impl UnsyncedChanges {
    pub fn is_empty(&self) -> bool {
        self.edited.is_empty() && self.deleted.is_empty()
    }
}

/// Ordered in-memory notes of the current session. Ids are unique.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    entries: Vec<Entry>,
    local_deletions: Vec<NoteId>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything with a server snapshot. Local-only state is dropped.
    pub fn replace_all(&mut self, notes: Vec<Note>) {
        self.entries.clear();
        self.local_deletions.clear();
        for note in notes {
            if self.contains(&note.id) {
                tracing::warn!(id = %note.id, "duplicate note id in server list, keeping first");
                continue;
            }
            self.entries.push(Entry {
                note,
                sync: SyncState::Synced,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.position(id).map(|i| &self.entries[i].note)
    }

    pub fn sync_state(&self, id: &NoteId) -> Option<SyncState> {
        self.position(id).map(|i| self.entries[i].sync)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.entries.iter().map(|e| &e.note)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Note, SyncState)> {
        self.entries.iter().map(|e| (&e.note, e.sync))
    }

    pub fn to_vec(&self) -> Vec<Note> {
        self.notes().cloned().collect()
    }

    /// Swaps the entry with the same id, keeping its position.
    pub fn replace(&mut self, note: Note, sync: SyncState) -> NotesResult<()> {
        let index = self
            .position(&note.id)
            .ok_or(NotesError::NoteNotFound(note.id))?;
        self.entries[index] = Entry { note, sync };
        Ok(())
    }

    pub fn remove(&mut self, id: &NoteId, sync: SyncState) -> NotesResult<Note> {
        let index = self.position(id).ok_or(NotesError::NoteNotFound(*id))?;
        let entry = self.entries.remove(index);
        if sync == SyncState::LocalOnly {
            self.local_deletions.push(*id);
        }
        Ok(entry.note)
    }

    pub fn unsynced_changes(&self) -> UnsyncedChanges {
        UnsyncedChanges {
            edited: self
                .entries
                .iter()
                .filter(|e| e.sync == SyncState::LocalOnly)
                .map(|e| e.note.id)
                .collect(),
            deleted: self.local_deletions.clone(),
        }
    }

    fn position(&self, id: &NoteId) -> Option<usize> {
        self.entries.iter().position(|e| &e.note.id == id)
    }
}
