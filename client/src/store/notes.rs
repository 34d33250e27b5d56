//! Notes store
//!
//! Caches the signed-in user's notes (`items`) and the note open in the
//! detail view (`selected`). Every network action reads the bearer token
//! from the [`SessionStore`] it was built with.

use super::{RequestStatus, SessionStore, StoreCell, Tracked};
use crate::api::NotesApi;
use crate::models::{Note, NoteDraft, NoteUpdate};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the notes collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotesState {
    /// Server response order
    pub items: Vec<Note>,
    /// Independent of `items` membership
    pub selected: Option<Note>,
    pub status: RequestStatus,
}

impl Tracked for NotesState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

struct NotesInner {
    api: Arc<dyn NotesApi>,
    session: SessionStore,
    cell: StoreCell<NotesState>,
}

/// Handle to the notes store. Clones share the same state.
#[derive(Clone)]
pub struct NotesStore {
    inner: Arc<NotesInner>,
}

impl NotesStore {
    pub fn new(api: Arc<dyn NotesApi>, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(NotesInner {
                api,
                session,
                cell: StoreCell::new(NotesState::default()),
            }),
        }
    }

    pub fn snapshot(&self) -> NotesState {
        self.inner.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotesState> {
        self.inner.cell.subscribe()
    }

    /// Replace `items` with the server's collection
    pub async fn list_notes(&self) {
        const ACTION: &str = "notes/getAll";

        let id = self.inner.cell.begin(ACTION);
        let token = self.inner.session.token();

        match self.inner.api.list_notes(token.as_deref()).await {
            Ok(notes) => {
                tracing::debug!("Loaded {} notes", notes.len());
                self.inner
                    .cell
                    .fulfill(ACTION, id, move |state| state.items = notes);
            }
            Err(e) => self.inner.cell.reject(ACTION, id, &e, |_| {}),
        }
    }

    /// Fetch one note into `selected`; `items` is left alone.
    ///
    /// A note the backend doesn't know leaves `selected` empty and is not
    /// treated as a failure.
    pub async fn get_note(&self, note_id: &str) {
        const ACTION: &str = "notes/getById";

        let id = self.inner.cell.begin(ACTION);
        let token = self.inner.session.token();

        match self.inner.api.get_note(token.as_deref(), note_id).await {
            Ok(note) => self
                .inner
                .cell
                .fulfill(ACTION, id, move |state| state.selected = Some(note)),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Note {} not found", note_id);
                self.inner
                    .cell
                    .fulfill(ACTION, id, |state| state.selected = None);
            }
            Err(e) => self.inner.cell.reject(ACTION, id, &e, |_| {}),
        }
    }

    /// Create a note; it shows up in `items` once the backend confirms it
    pub async fn create_note(&self, draft: NoteDraft) {
        const ACTION: &str = "notes/create";

        let id = self.inner.cell.begin(ACTION);
        let token = self.inner.session.token();

        match self.inner.api.create_note(token.as_deref(), &draft).await {
            Ok(note) => {
                tracing::debug!("Appending created note {}", note.id);
                self.inner
                    .cell
                    .fulfill(ACTION, id, move |state| state.items.push(note));
            }
            Err(e) => self.inner.cell.reject(ACTION, id, &e, |_| {}),
        }
    }

    /// Save changes; the returned note replaces its entry in `items` and
    /// becomes `selected`
    pub async fn update_note(&self, update: NoteUpdate) {
        const ACTION: &str = "notes/update";

        let id = self.inner.cell.begin(ACTION);
        let token = self.inner.session.token();

        match self.inner.api.update_note(token.as_deref(), &update).await {
            Ok(note) => {
                tracing::debug!("Replacing note {}", note.id);
                self.inner.cell.fulfill(ACTION, id, move |state| {
                    for item in state.items.iter_mut().filter(|item| item.id == note.id) {
                        *item = note.clone();
                    }
                    state.selected = Some(note);
                });
            }
            Err(e) => self.inner.cell.reject(ACTION, id, &e, |_| {}),
        }
    }

    /// Delete a note. `selected` is cleared whichever note it held.
    pub async fn delete_note(&self, note_id: &str) {
        const ACTION: &str = "notes/delete";

        let id = self.inner.cell.begin(ACTION);
        let token = self.inner.session.token();

        match self.inner.api.delete_note(token.as_deref(), note_id).await {
            Ok(()) => {
                tracing::debug!("Removing note {}", note_id);
                self.inner.cell.fulfill(ACTION, id, |state| {
                    state.items.retain(|item| item.id != note_id);
                    state.selected = None;
                });
            }
            Err(e) => self.inner.cell.reject(ACTION, id, &e, |_| {}),
        }
    }

    pub fn clear_selected(&self) {
        self.inner.cell.modify(|state| state.selected = None);
    }

    /// Drop every cached note
    pub fn clear_notes(&self) {
        self.inner.cell.modify(|state| state.items.clear());
    }

    /// Clear the status without touching cached notes
    pub fn reset_status(&self) {
        self.inner.cell.reset_status();
    }
}
