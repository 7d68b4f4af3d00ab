use std::sync::Arc;

use serde::Serialize;

use crate::api::client::NotesApi;
use crate::api::types::{CreateNoteRequest, UpdateNoteRequest};
use crate::config::SyncPolicy;
use crate::errors::{NotesError, NotesResult};
use crate::note::{Note, NoteId};
use crate::notes::collection::{NoteCollection, SyncState};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum LoadState {
    NotLoaded,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Sent to the server. `reloaded` is false when the follow-up load failed.
    Created { reloaded: bool },
    /// Replaced in place. `synced` is false under the local-only policy.
    Updated { synced: bool },
}

/// Keeps the note collection in step with the backend.
///
/// Loads replace the collection wholesale. Creation always goes through the
/// server and is followed by a full reload; edits and deletions follow the
/// configured [`SyncPolicy`].
pub struct NoteSync {
    api: Arc<dyn NotesApi>,
    session: Session,
    policy: SyncPolicy,
    collection: NoteCollection,
    load_state: LoadState,
    /// Why the reload after the last create failed, until taken.
    reload_error: Option<NotesError>,
}

impl NoteSync {
    pub fn new(api: Arc<dyn NotesApi>, session: Session, policy: SyncPolicy) -> Self {
        Self {
            api,
            session,
            policy,
            collection: NoteCollection::new(),
            load_state: LoadState::NotLoaded,
            reload_error: None,
        }
    }

    pub fn collection(&self) -> &NoteCollection {
        &self.collection
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn token(&self) -> NotesResult<String> {
        self.session.token()?.ok_or(NotesError::Unauthenticated)
    }

    /// A rejected token is useless from here on.
    fn forget_token_on_401(&self, err: &NotesError) {
        if err.is_unauthenticated() {
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "failed to clear rejected token");
            }
        }
    }

    /// Fetches the full list and replaces the collection with it.
    ///
    /// On failure the collection is left as it was and the load state records
    /// the error so it can be shown.
    pub async fn load(&mut self) -> NotesResult<usize> {
        let result = match self.token() {
            Ok(token) => self.api.list_notes(&token).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(notes) => {
                let count = notes.len();
                self.collection.replace_all(notes);
                self.load_state = LoadState::Loaded;
                tracing::info!(count, "notes loaded");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load notes");
                self.forget_token_on_401(&e);
                self.load_state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Commits a saved draft. Only a pending id creates; a server id must still be
    /// in the collection, otherwise the note was deleted or dropped by a reload.
    pub async fn commit(&mut self, note: Note) -> NotesResult<SaveOutcome> {
        if note.id.is_pending() {
            self.create(note).await
        } else if self.collection.contains(&note.id) {
            self.update(note).await
        } else {
            tracing::warn!(id = %note.id, "draft refers to a note no longer in the collection");
            Err(NotesError::NoteNotFound(note.id))
        }
    }

    /// The error behind the last `Created { reloaded: false }`.
    pub fn take_reload_error(&mut self) -> Option<NotesError> {
        self.reload_error.take()
    }

    async fn create(&mut self, note: Note) -> NotesResult<SaveOutcome> {
        let token = self.token()?;
        let request = CreateNoteRequest::from(&note);
        if let Err(e) = self.api.create_note(&token, &request).await {
            tracing::error!(error = %e, "note creation failed");
            self.forget_token_on_401(&e);
            return Err(e);
        }
        tracing::info!(title = %request.title, "note created, reloading");

        self.reload_error = self.load().await.err();
        Ok(SaveOutcome::Created {
            reloaded: self.reload_error.is_none(),
        })
    }

    async fn update(&mut self, note: Note) -> NotesResult<SaveOutcome> {
        match self.policy {
            SyncPolicy::LocalOnly => {
                let id = note.id;
                self.collection.replace(note, SyncState::LocalOnly)?;
                tracing::info!(id = %id, "note updated locally");
                Ok(SaveOutcome::Updated { synced: false })
            }
            SyncPolicy::Remote => {
                let id = note.id.server_id().ok_or(NotesError::NoteNotFound(note.id))?;
                let token = self.token()?;
                if let Err(e) = self.api.update_note(&token, id, &UpdateNoteRequest::from(&note)).await {
                    tracing::error!(id, error = %e, "note update failed");
                    self.forget_token_on_401(&e);
                    return Err(e);
                }
                self.collection.replace(note, SyncState::Synced)?;
                tracing::info!(id, "note updated");
                Ok(SaveOutcome::Updated { synced: true })
            }
        }
    }

    pub async fn delete(&mut self, id: NoteId) -> NotesResult<Note> {
        if !self.collection.contains(&id) {
            return Err(NotesError::NoteNotFound(id));
        }
        match self.policy {
            SyncPolicy::LocalOnly => {
                let removed = self.collection.remove(&id, SyncState::LocalOnly)?;
                tracing::info!(id = %id, "note deleted locally");
                Ok(removed)
            }
            SyncPolicy::Remote => {
                let server_id = id.server_id().ok_or(NotesError::NoteNotFound(id))?;
                let token = self.token()?;
                if let Err(e) = self.api.delete_note(&token, server_id).await {
                    tracing::error!(id = server_id, error = %e, "note deletion failed");
                    self.forget_token_on_401(&e);
                    return Err(e);
                }
                let removed = self.collection.remove(&id, SyncState::Synced)?;
                tracing::info!(id = server_id, "note deleted");
                Ok(removed)
            }
        }
    }
}
