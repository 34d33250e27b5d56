//! Form validation
//!
//! Checks run by a view before it dispatches an action. Failures are shown
//! next to the offending field and never reach a store.

use crate::config::{
    CONTENT_REQUIRED, EMAIL_REQUIRED, NAME_REQUIRED, PASSWORD_REQUIRED, TITLE_REQUIRED,
};
use crate::models::{LoginRequest, NoteDraft, NoteUpdate, RegisterRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Field name → message for every invalid field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, &'static str>,
}

impl ValidationErrors {
    fn require(&mut self, field: &'static str, value: &str, message: &'static str) {
        if value.trim().is_empty() {
            self.fields.insert(field, message);
        }
    }

    /// Message for a single field, if it failed
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.fields.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .fields
            .values()
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_login(req: &LoginRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("email", &req.email, EMAIL_REQUIRED);
    errors.require("password", &req.password, PASSWORD_REQUIRED);
    errors.into_result()
}

pub fn validate_register(req: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("name", &req.name, NAME_REQUIRED);
    errors.require("email", &req.email, EMAIL_REQUIRED);
    errors.require("password", &req.password, PASSWORD_REQUIRED);
    errors.into_result()
}

/// Title and content are both required for a new note.
pub fn validate_note(draft: &NoteDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("title", &draft.title, TITLE_REQUIRED);
    errors.require("content", &draft.content, CONTENT_REQUIRED);
    errors.into_result()
}

/// Same rules as [`validate_note`]; the id is not user input.
pub fn validate_note_update(update: &NoteUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.require("title", &update.title, TITLE_REQUIRED);
    errors.require("content", &update.content, CONTENT_REQUIRED);
    errors.into_result()
}
