//! Notes backend API
//!
//! [`NotesApi`] is the transport boundary the stores talk to. Every failure
//! comes back as an [`AppError`](crate::error::AppError); a backend rejection
//! is always the typed `AppError::Api` variant, decided here and nowhere else.

pub mod client;

pub use client::HttpClient;

use crate::error::Result;
use crate::models::{LoginRequest, Note, NoteDraft, NoteUpdate, RegisterRequest, User};
use async_trait::async_trait;

/// Operations offered by the notes backend.
///
/// `token` is sent as a bearer credential when present; without one the
/// request goes out unauthenticated and the backend decides.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// POST /api/auth
    async fn register(&self, req: &RegisterRequest) -> Result<User>;

    /// POST /api/auth/login
    async fn login(&self, req: &LoginRequest) -> Result<User>;

    /// GET /api/note
    async fn list_notes(&self, token: Option<&str>) -> Result<Vec<Note>>;

    /// GET /api/note/{id}
    async fn get_note(&self, token: Option<&str>, id: &str) -> Result<Note>;

    /// POST /api/note
    async fn create_note(&self, token: Option<&str>, draft: &NoteDraft) -> Result<Note>;

    /// PUT /api/note/{id}
    async fn update_note(&self, token: Option<&str>, update: &NoteUpdate) -> Result<Note>;

    /// DELETE /api/note/{id}
    async fn delete_note(&self, token: Option<&str>, id: &str) -> Result<()>;
}
