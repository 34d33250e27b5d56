//! Commands exposed to the command-line front end
//!
//! Each command plays the part of a view: it validates its input, dispatches
//! one store action and reads the outcome back from the store snapshot.

use crate::app::AppState;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, NoteDraft, NoteUpdate, RegisterRequest, User};
use crate::store::RequestStatus;
use crate::validation::{
    validate_login, validate_note, validate_note_update, validate_register, ValidationErrors,
};
use serde_json::{json, Value};

pub const USAGE: &str = "\
usage: noteonline <command> [args]

commands:
  register <name> <email> <password>
  login <email> <password>
  logout
  whoami
  list
  show <id>
  create <title> <content>
  update <id> <title> <content>
  delete <id>";

/// A parsed command line
#[derive(Clone)]
pub enum Command {
    Register(RegisterRequest),
    Login(LoginRequest),
    Logout,
    WhoAmI,
    List,
    Show(String),
    Create(NoteDraft),
    Update(NoteUpdate),
    Delete(String),
}

impl Command {
    /// Parse the arguments following the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let usage = || AppError::Generic(USAGE.to_string());

        let (name, rest) = args.split_first().ok_or_else(usage)?;
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("register", [name, email, password]) => {
                Command::Register(RegisterRequest::new(*name, *email, *password))
            }
            ("login", [email, password]) => Command::Login(LoginRequest::new(*email, *password)),
            ("logout", []) => Command::Logout,
            ("whoami", []) => Command::WhoAmI,
            ("list", []) => Command::List,
            ("show", [id]) => Command::Show(id.to_string()),
            ("create", [title, content]) => Command::Create(NoteDraft::new(*title, *content)),
            ("update", [id, title, content]) => {
                Command::Update(NoteUpdate::new(*id, *title, *content))
            }
            ("delete", [id]) => Command::Delete(id.to_string()),
            _ => return Err(usage()),
        };

        Ok(command)
    }

    /// Form checks that run before anything is dispatched
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        match self {
            Command::Register(req) => validate_register(req),
            Command::Login(req) => validate_login(req),
            Command::Create(draft) => validate_note(draft),
            Command::Update(update) => validate_note_update(update),
            _ => Ok(()),
        }
    }
}

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// False when the dispatched action ended `Failed`
    pub success: bool,
    pub body: Value,
}

impl CommandOutput {
    fn ok(body: Value) -> Self {
        Self {
            success: true,
            body,
        }
    }

    fn from_status(status: &RequestStatus, body: impl FnOnce() -> Value) -> Self {
        match status.message() {
            Some(message) => Self {
                success: false,
                body: json!({ "error": message }),
            },
            None => Self::ok(body()),
        }
    }
}

fn public_user(user: Option<&User>) -> Value {
    match user {
        Some(user) => json!({ "id": user.id, "name": user.name, "email": user.email }),
        None => Value::Null,
    }
}

/// Validate, dispatch and report one command.
///
/// Validation failures come back as `AppError::Validation` without touching
/// any store.
pub async fn execute(state: &AppState, command: Command) -> Result<CommandOutput> {
    command.validate().map_err(AppError::Validation)?;

    let output = match command {
        Command::Register(req) => {
            state.session.register(req).await;
            let session = state.session.snapshot();
            CommandOutput::from_status(&session.status, || public_user(session.user.as_ref()))
        }
        Command::Login(req) => {
            state.session.login(req).await;
            let session = state.session.snapshot();
            CommandOutput::from_status(&session.status, || public_user(session.user.as_ref()))
        }
        Command::Logout => {
            state.logout().await;
            CommandOutput::ok(json!({ "loggedOut": true }))
        }
        Command::WhoAmI => CommandOutput::ok(public_user(state.session.user().as_ref())),
        Command::List => {
            state.notes.list_notes().await;
            let notes = state.notes.snapshot();
            CommandOutput::from_status(&notes.status, || json!(notes.items))
        }
        Command::Show(id) => {
            state.notes.get_note(&id).await;
            let notes = state.notes.snapshot();
            CommandOutput::from_status(&notes.status, || json!(notes.selected))
        }
        Command::Create(draft) => {
            state.notes.create_note(draft).await;
            let notes = state.notes.snapshot();
            CommandOutput::from_status(&notes.status, || json!(notes.items.last()))
        }
        Command::Update(update) => {
            state.notes.update_note(update).await;
            let notes = state.notes.snapshot();
            CommandOutput::from_status(&notes.status, || json!(notes.selected))
        }
        Command::Delete(id) => {
            state.notes.delete_note(&id).await;
            let notes = state.notes.snapshot();
            CommandOutput::from_status(&notes.status, || json!({ "deleted": id }))
        }
    };

    Ok(output)
}
