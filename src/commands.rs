use std::fmt::{self, Write as _};

use crate::app::{NotesApp, View};
use crate::auth::{LoginForm, RegisterForm};
use crate::config::SyncPolicy;
use crate::draft::DraftField;
use crate::errors::{NotesError, NotesResult};
use crate::note::NoteId;
use crate::notes::collection::SyncState;
use crate::notes::sync::{LoadState, SaveOutcome};

pub const HELP: &str = "\
Commands:
  login <email> <password>
  register <username> <email> <password>
  goto <login|register|notes>
  list | reload
  new | edit <id> | delete <id>
  set <title|body|color|date|time> [value...]
  save | cancel
  status | logout | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(LoginForm),
    Register(RegisterForm),
    Goto(View),
    List,
    Reload,
    New,
    Edit(NoteId),
    Set(DraftField, String),
    Save,
    Cancel,
    Delete(NoteId),
    Logout,
    Status,
    Help,
    Quit,
}

fn parse_id(arg: Option<&str>) -> NotesResult<NoteId> {
    let arg = arg.ok_or_else(|| NotesError::validation("Missing note id"))?;
    arg.parse::<u64>()
        .map(NoteId::Server)
        .map_err(|_| NotesError::validation(format!("Invalid note id '{arg}'")))
}

/// Parses one input line. Blank lines yield `None`.
///
/// Missing login/register arguments parse as empty fields so that form
/// validation reports them.
pub fn parse_command(line: &str) -> NotesResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();
    let mut next = || args.next().unwrap_or_default().to_string();

    let command = match name {
        "login" => Command::Login(LoginForm::new(next(), next())),
        "register" => Command::Register(RegisterForm::new(next(), next(), next())),
        "goto" => match rest {
            "login" => Command::Goto(View::Login),
            "register" => Command::Goto(View::Register),
            "notes" => Command::Goto(View::Notes),
            other => return Err(NotesError::validation(format!("Unknown view '{other}'"))),
        },
        "list" | "ls" => Command::List,
        "reload" => Command::Reload,
        "new" => Command::New,
        "edit" => Command::Edit(parse_id(rest.split_whitespace().next())?),
        "delete" | "rm" => Command::Delete(parse_id(rest.split_whitespace().next())?),
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                return Err(NotesError::validation("Missing field name"));
            }
            Command::Set(field.parse()?, value.trim_start().to_string())
        }
        "save" => Command::Save,
        "cancel" => Command::Cancel,
        "logout" => Command::Logout,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(NotesError::validation(format!("Unknown command '{other}', try 'help'"))),
    };
    Ok(Some(command))
}

/// Runs a command against the app and renders the result.
pub async fn execute(app: &mut NotesApp, command: Command) -> String {
    let result = match command {
        Command::Login(form) => app.submit_login(form).await.map(|_| None),
        Command::Register(form) => app.submit_register(form).await.map(|_| None),
        Command::Goto(view) => {
            app.navigate(view).await;
            Ok(None)
        }
        Command::List => Ok(None),
        Command::Reload => app.reload().await.map(|n| Some(format!("{n} notes loaded"))),
        Command::New => {
            app.open_new_note();
            Ok(None)
        }
        Command::Edit(id) => app.open_edit_note(id).map(|_| None),
        Command::Set(field, value) => app.set_draft_field(field, &value).map(|_| None),
        Command::Save => app.save_note().await.map(|outcome| {
            Some(match outcome {
                SaveOutcome::Created { .. } => "Note created".to_string(),
                SaveOutcome::Updated { synced: true } => "Note updated".to_string(),
                SaveOutcome::Updated { synced: false } => {
                    "Note updated locally (not sent to server)".to_string()
                }
            })
        }),
        Command::Cancel => {
            app.cancel_edit();
            Ok(None)
        }
        Command::Delete(id) => app.delete_note(id).await.map(|_| Some(format!("Note {id} deleted"))),
        Command::Logout => app.logout().map(|_| Some("Logged out".to_string())),
        Command::Status => Ok(Some(status_line(app))),
        Command::Help => return HELP.to_string(),
        Command::Quit => return String::new(),
    };

    let mut out = String::new();
    if let Err(e) = write_result(&mut out, app, result) {
        tracing::warn!(error = %e, "failed to render command output");
    }
    out
}

fn write_result(out: &mut String, app: &NotesApp, result: NotesResult<Option<String>>) -> fmt::Result {
    match result {
        Ok(Some(msg)) => writeln!(out, "{msg}")?,
        Ok(None) => {}
        Err(e) => {
            let text = e.to_string();
            // Already shown by the banner.
            if app.banner() != Some(text.as_str()) {
                writeln!(out, "error: {text}")?;
            }
        }
    }
    write_view(out, app)
}

fn status_line(app: &NotesApp) -> String {
    let load = match app.load_state() {
        LoadState::NotLoaded => "not loaded".to_string(),
        LoadState::Loaded => "loaded".to_string(),
        LoadState::Failed(e) => format!("failed ({e})"),
    };
    let sync = match app.sync_policy() {
        SyncPolicy::LocalOnly => "local only",
        SyncPolicy::Remote => "remote",
    };
    format!(
        "view: {:?}, logged in: {}, notes: {}, load: {}, edits: {}",
        app.view(),
        app.session().is_authenticated(),
        app.notes().len(),
        load,
        sync
    )
}

/// Text rendering of the current view.
pub fn render(app: &NotesApp) -> String {
    let mut out = String::new();
    if let Err(e) = write_view(&mut out, app) {
        tracing::warn!(error = %e, "failed to render view");
    }
    out
}

fn write_view(out: &mut impl fmt::Write, app: &NotesApp) -> fmt::Result {
    if let Some(banner) = app.banner() {
        writeln!(out, "[!] {banner}")?;
    }
    if let Some(notice) = app.notice() {
        writeln!(out, "[i] {notice}")?;
    }

    match app.view() {
        View::Login => writeln!(out, "== Log in ==  (login <email> <password>, goto register)"),
        View::Register => {
            writeln!(out, "== Sign up ==  (register <username> <email> <password>, goto login)")
        }
        View::Notes => write_notes(out, app),
    }
}

fn write_notes(out: &mut impl fmt::Write, app: &NotesApp) -> fmt::Result {
    writeln!(out, "== My Notes ==")?;
    if app.notes().is_empty() {
        writeln!(out, "(no notes)")?;
    }
    for (note, sync) in app.notes().entries() {
        let marker = match sync {
            SyncState::Synced => "",
            SyncState::LocalOnly => " *local only*",
        };
        writeln!(out, "#{} [{}] {}{}", note.id, note.color, note.title, marker)?;
        writeln!(out, "    {}", note.body)?;
        writeln!(
            out,
            "    {} | {}",
            note.date.as_deref().unwrap_or("No date"),
            note.time.as_deref().unwrap_or("No time"),
        )?;
    }

    let changes = app.notes().unsynced_changes();
    if !changes.is_empty() {
        writeln!(
            out,
            "({} edited, {} deleted locally; lost on reload)",
            changes.edited.len(),
            changes.deleted.len()
        )?;
    }

    if let Some(draft) = app.modal().draft() {
        let note = &draft.note;
        writeln!(out, "-- {} --", draft.heading())?;
        writeln!(out, "  title: {}", note.title)?;
        writeln!(out, "  body:  {}", note.body)?;
        writeln!(out, "  color: {}", note.color)?;
        writeln!(out, "  date:  {}", note.date.as_deref().unwrap_or(""))?;
        writeln!(out, "  time:  {}", note.time.as_deref().unwrap_or(""))?;
        writeln!(out, "  (set <field> <value>, save, cancel)")?;
    }
    Ok(())
}
