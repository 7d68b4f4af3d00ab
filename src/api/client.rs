use async_trait::async_trait;

use crate::api::types::{
    CreateNoteRequest, LoginRequest, LoginResponse, RegisterRequest, UpdateNoteRequest,
};
use crate::errors::NotesResult;
use crate::note::Note;

/// Backend the client talks to. `HttpNotesApi` is the real one; tests inject a recorder.
///
/// Non-2xx responses come back as `NotesError::Api` carrying the server's
/// `error` text when it sent one. On the note endpoints a 401 is reported as
/// `NotesError::Unauthenticated` instead.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> NotesResult<LoginResponse>;

    async fn register(&self, request: &RegisterRequest) -> NotesResult<()>;

    /// The full list, in server order.
    async fn list_notes(&self, token: &str) -> NotesResult<Vec<Note>>;

    /// The response body is not used.
    async fn create_note(&self, token: &str, request: &CreateNoteRequest) -> NotesResult<()>;

    async fn update_note(&self, token: &str, id: u64, request: &UpdateNoteRequest) -> NotesResult<()>;

    async fn delete_note(&self, token: &str, id: u64) -> NotesResult<()>;
}
