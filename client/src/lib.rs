//! NoteOnline client library
//!
//! Session and notes stores that keep UI-facing state in step with the
//! NoteOnline REST backend. A front end builds an [`app::AppState`],
//! subscribes to the stores and dispatches their actions.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod store;
pub mod validation;
