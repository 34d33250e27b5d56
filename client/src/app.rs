//! Application state and initialization
//!
//! This module owns the client's state for one process. Everything a view
//! needs (settings, the session, the notes collection) is reachable from an
//! explicitly passed [`AppState`]; there are no process-wide globals.

use crate::api::{HttpClient, NotesApi};
use crate::config::{DATA_DIR_NAME, STORAGE_DIR_NAME};
use crate::error::Result;
use crate::services::{ClientSettings, SettingsService};
use crate::storage::LocalStorage;
use crate::store::{NotesStore, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding both stores
#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: ClientSettings,
    pub session: SessionStore,
    pub notes: NotesStore,
}

impl AppState {
    /// Load settings from `data_dir`, connect to the configured backend and
    /// restore any persisted session.
    ///
    /// `api_url` overrides the base URL from the settings file.
    pub async fn initialize(data_dir: PathBuf, api_url: Option<String>) -> Result<Self> {
        tracing::info!("Initializing client");
        tracing::info!("Data directory: {:?}", data_dir);

        tokio::fs::create_dir_all(&data_dir).await?;

        let mut settings = SettingsService::new(data_dir.clone()).load().await?;
        if let Some(api_url) = api_url {
            tracing::info!("API base URL overridden: {}", api_url);
            settings.api_base_url = api_url;
        }

        let api = Arc::new(HttpClient::new(&settings.api_base_url)?);
        let state = Self::with_api(data_dir, settings, api).await?;

        tracing::info!("Client initialized successfully");

        Ok(state)
    }

    /// Build the state around an existing transport
    pub async fn with_api(
        data_dir: PathBuf,
        settings: ClientSettings,
        api: Arc<dyn NotesApi>,
    ) -> Result<Self> {
        let storage = LocalStorage::new(data_dir.join(STORAGE_DIR_NAME));
        storage.initialize().await?;

        let session = SessionStore::restore(api.clone(), storage).await;
        let notes = NotesStore::new(api, session.clone());

        Ok(Self {
            data_dir,
            settings,
            session,
            notes,
        })
    }

    /// Log out and drop the previous user's cached notes
    pub async fn logout(&self) {
        self.session.logout().await;
        self.notes.clear_selected();
        self.notes.clear_notes();
        self.notes.reset_status();
    }
}

/// Platform data directory for the client, or `.noteonline` in the working
/// directory when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", DATA_DIR_NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SESSION_STORAGE_KEY;
    use crate::models::LoginRequest;
    use crate::store::testing::{note, user, FakeApi};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_session_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::with_user(user("1", "a@x.com")));

        {
            let state = AppState::with_api(
                temp_dir.path().to_path_buf(),
                ClientSettings::default(),
                api.clone(),
            )
            .await
            .unwrap();
            state.session.login(LoginRequest::new("a@x.com", "p")).await;
        }

        let state = AppState::with_api(
            temp_dir.path().to_path_buf(),
            ClientSettings::default(),
            api,
        )
        .await
        .unwrap();

        assert_eq!(state.session.user().map(|u| u.id), Some("1".to_string()));
        assert!(state.notes.snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_notes_and_storage() {
        let temp_dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::with_user(user("1", "a@x.com")));
        api.notes.lock().unwrap().push(note("a", "A"));

        let state = AppState::with_api(
            temp_dir.path().to_path_buf(),
            ClientSettings::default(),
            api,
        )
        .await
        .unwrap();
        state.session.login(LoginRequest::new("a@x.com", "p")).await;
        state.notes.list_notes().await;
        state.notes.get_note("a").await;

        state.logout().await;

        let notes = state.notes.snapshot();
        assert!(notes.items.is_empty());
        assert!(notes.selected.is_none());
        assert!(notes.status.is_idle());
        assert!(!state.session.is_authenticated());
        assert!(!temp_dir
            .path()
            .join(STORAGE_DIR_NAME)
            .join(format!("{}.json", SESSION_STORAGE_KEY))
            .exists());
    }

    #[tokio::test]
    async fn test_initialize_applies_url_override() {
        let temp_dir = TempDir::new().unwrap();

        let state = AppState::initialize(
            temp_dir.path().to_path_buf(),
            Some("http://127.0.0.1:9".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(state.settings.api_base_url, "http://127.0.0.1:9");
        assert!(!state.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_rejects_bad_url() {
        let temp_dir = TempDir::new().unwrap();

        let result =
            AppState::initialize(temp_dir.path().to_path_buf(), Some("::".to_string())).await;

        assert!(result.is_err());
    }
}
