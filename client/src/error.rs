//! Error types for the NoteOnline client
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a view as their display string.

use crate::config::FALLBACK_ERROR_MESSAGE;
use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The backend answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Api {
        status: u16,
        /// `message` field of the backend's JSON error body, if it had one
        message: Option<String>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Text shown to the user when an action fails.
    ///
    /// The backend's own message wins, then the error's text, then
    /// [`FALLBACK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        if let AppError::Api {
            message: Some(message),
            ..
        } = self
        {
            if !message.trim().is_empty() {
                return message.clone();
            }
        }

        let text = self.to_string();
        if text.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            text
        }
    }

    /// Whether this is a backend 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Api { status: 404, .. })
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
