use std::sync::Arc;

use serde::Serialize;

use crate::api::client::NotesApi;
use crate::api::http::HttpNotesApi;
use crate::auth::{self, LoginForm, RegisterForm};
use crate::config::{AppConfig, NotesConfig, SyncPolicy};
use crate::draft::{DraftField, NoteModal};
use crate::errors::{NotesError, NotesResult};
use crate::note::NoteId;
use crate::notes::collection::NoteCollection;
use crate::notes::sync::{LoadState, NoteSync, SaveOutcome};
use crate::session::Session;

pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    Register,
    Notes,
}

/// Page-level controller: which view is showing, the error banner, and the
/// notes dashboard state behind it.
///
/// Every method takes `&mut self`, so one interaction (and one commit) is in
/// flight at a time. A save closes the modal, so a repeated save finds no
/// draft instead of creating the note twice.
pub struct NotesApp {
    view: View,
    banner: Option<String>,
    notice: Option<String>,
    api: Arc<dyn NotesApi>,
    sync: NoteSync,
    modal: NoteModal,
    default_color: String,
}

impl NotesApp {
    pub fn new(api: Arc<dyn NotesApi>, session: Session, notes: &NotesConfig) -> Self {
        let view = if session.is_authenticated() {
            View::Notes
        } else {
            View::Login
        };
        Self {
            view,
            banner: None,
            notice: None,
            sync: NoteSync::new(api.clone(), session, notes.sync_policy),
            api,
            modal: NoteModal::default(),
            default_color: notes.default_color.clone(),
        }
    }

    pub fn from_config(config: &AppConfig) -> NotesResult<Self> {
        let api = Arc::new(HttpNotesApi::from_config(&config.api)?);
        let session = Session::from_config(&config.session);
        Ok(Self::new(api, session, &config.notes))
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn notes(&self) -> &NoteCollection {
        self.sync.collection()
    }

    pub fn load_state(&self) -> &LoadState {
        self.sync.load_state()
    }

    pub fn modal(&self) -> &NoteModal {
        &self.modal
    }

    pub fn session(&self) -> &Session {
        self.sync.session()
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        self.sync.policy()
    }

    /// Mounts the initial view.
    pub async fn start(&mut self) {
        if self.view == View::Notes {
            self.mount_notes().await;
        }
    }

    /// Switches views. Entering the notes view loads the list from the server.
    pub async fn navigate(&mut self, view: View) {
        tracing::debug!(from = ?self.view, to = ?view, "navigate");
        self.view = view;
        self.banner = None;
        self.modal.close();
        if view == View::Notes {
            self.mount_notes().await;
        }
    }

    async fn mount_notes(&mut self) {
        if let Err(e) = self.sync.load().await {
            self.show_error(e);
        }
    }

    pub async fn reload(&mut self) -> NotesResult<usize> {
        self.banner = None;
        match self.sync.load().await {
            Ok(count) => Ok(count),
            Err(e) => Err(self.show_error(e)),
        }
    }

    /// Puts the error in the banner and returns it. A lost session sends the user to login.
    fn show_error(&mut self, err: NotesError) -> NotesError {
        self.banner = Some(err.to_string());
        if err.is_unauthenticated() && self.view == View::Notes {
            tracing::info!("session no longer valid, back to login");
            self.view = View::Login;
            self.modal.close();
        }
        err
    }

    pub async fn submit_login(&mut self, form: LoginForm) -> NotesResult<()> {
        self.banner = None;
        self.notice = None;
        match auth::login(self.api.as_ref(), self.sync.session(), &form).await {
            Ok(()) => {
                self.navigate(View::Notes).await;
                Ok(())
            }
            Err(e) => Err(self.show_error(e)),
        }
    }

    pub async fn submit_register(&mut self, form: RegisterForm) -> NotesResult<()> {
        self.banner = None;
        self.notice = None;
        match auth::register(self.api.as_ref(), &form).await {
            Ok(()) => {
                self.navigate(View::Login).await;
                self.notice = Some(REGISTRATION_SUCCESSFUL.to_string());
                Ok(())
            }
            Err(e) => Err(self.show_error(e)),
        }
    }

    pub fn logout(&mut self) -> NotesResult<()> {
        self.sync.session().clear()?;
        self.modal.close();
        self.view = View::Login;
        self.banner = None;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn open_new_note(&mut self) {
        self.modal.open_new(&self.default_color);
    }

    pub fn open_edit_note(&mut self, id: NoteId) -> NotesResult<()> {
        let note = self
            .sync
            .collection()
            .get(&id)
            .ok_or(NotesError::NoteNotFound(id))?;
        self.modal.open_existing(note);
        Ok(())
    }

    pub fn set_draft_field(&mut self, field: DraftField, value: &str) -> NotesResult<()> {
        self.modal.set_field(field, value)
    }

    pub fn cancel_edit(&mut self) {
        if self.modal.close().is_some() {
            tracing::debug!("draft discarded");
        }
    }

    /// Validates and commits the open draft, closing the modal on success.
    ///
    /// Validation and commit failures leave the modal open with the draft intact.
    pub async fn save_note(&mut self) -> NotesResult<SaveOutcome> {
        self.banner = None;
        let note = match self.modal.prepare_save() {
            Ok(note) => note,
            Err(e) => return Err(self.show_error(e)),
        };

        match self.sync.commit(note).await {
            Ok(outcome) => {
                self.modal.close();
                if let Some(e) = self.sync.take_reload_error() {
                    self.show_error(e);
                }
                Ok(outcome)
            }
            Err(e) => Err(self.show_error(e)),
        }
    }

    pub async fn delete_note(&mut self, id: NoteId) -> NotesResult<()> {
        self.banner = None;
        match self.sync.delete(id).await {
            Ok(_) => {
                if self.modal.draft().is_some_and(|d| d.note.id == id) {
                    self.modal.close();
                    tracing::debug!(id = %id, "open draft belonged to the deleted note");
                }
                Ok(())
            }
            Err(e) => Err(self.show_error(e)),
        }
    }
}
