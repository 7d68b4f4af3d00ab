use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::client::NotesApi;
use crate::api::types::{
    CreateNoteRequest, LoginRequest, LoginResponse, RegisterRequest, UpdateNoteRequest,
};
use crate::errors::{NotesError, NotesResult};
use crate::note::Note;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Login(LoginRequest),
    Register(RegisterRequest),
    ListNotes { token: String },
    CreateNote { token: String, request: CreateNoteRequest },
    UpdateNote { token: String, id: u64, request: UpdateNoteRequest },
    DeleteNote { token: String, id: u64 },
}

/// Records every call and answers from queued responses.
///
/// `list_notes` answers from the queue first and falls back to `notes`;
/// every other call succeeds unless a failure was queued for it.
#[derive(Default)]
pub struct MockNotesApi {
    calls: Mutex<Vec<ApiCall>>,
    pub notes: Mutex<Vec<Note>>,
    list_responses: Mutex<VecDeque<NotesResult<Vec<Note>>>>,
    login_responses: Mutex<VecDeque<NotesResult<LoginResponse>>>,
    register_responses: Mutex<VecDeque<NotesResult<()>>>,
    write_failures: Mutex<VecDeque<NotesError>>,
}

impl MockNotesApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        let api = Self::new();
        *api.notes.lock().unwrap() = notes;
        api
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn push_list(&self, response: NotesResult<Vec<Note>>) {
        self.list_responses.lock().unwrap().push_back(response);
    }

    pub fn push_login(&self, response: NotesResult<LoginResponse>) {
        self.login_responses.lock().unwrap().push_back(response);
    }

    pub fn push_register(&self, response: NotesResult<()>) {
        self.register_responses.lock().unwrap().push_back(response);
    }

    /// The next create/update/delete fails with `err`.
    pub fn fail_next_write(&self, err: NotesError) {
        self.write_failures.lock().unwrap().push_back(err);
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_write(&self) -> NotesResult<()> {
        match self.write_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotesApi for MockNotesApi {
    async fn login(&self, request: &LoginRequest) -> NotesResult<LoginResponse> {
        self.record(ApiCall::Login(request.clone()));
        self.login_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LoginResponse::default()))
    }

    async fn register(&self, request: &RegisterRequest) -> NotesResult<()> {
        self.record(ApiCall::Register(request.clone()));
        self.register_responses.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn list_notes(&self, token: &str) -> NotesResult<Vec<Note>> {
        self.record(ApiCall::ListNotes { token: token.to_string() });
        match self.list_responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(self.notes.lock().unwrap().clone()),
        }
    }

    async fn create_note(&self, token: &str, request: &CreateNoteRequest) -> NotesResult<()> {
        self.record(ApiCall::CreateNote {
            token: token.to_string(),
            request: request.clone(),
        });
        self.next_write()?;
        let mut notes = self.notes.lock().unwrap();
        let next_id = notes.iter().filter_map(|n| n.id.server_id()).max().unwrap_or(0) + 1;
        let mut note = Note::titled(next_id, request.title.clone());
        note.body = request.content.clone();
        notes.insert(0, note);
        Ok(())
    }

    async fn update_note(&self, token: &str, id: u64, request: &UpdateNoteRequest) -> NotesResult<()> {
        self.record(ApiCall::UpdateNote {
            token: token.to_string(),
            id,
            request: request.clone(),
        });
        self.next_write()
    }

    async fn delete_note(&self, token: &str, id: u64) -> NotesResult<()> {
        self.record(ApiCall::DeleteNote { token: token.to_string(), id });
        self.next_write()
    }
}
