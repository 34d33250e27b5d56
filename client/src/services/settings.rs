//! Settings service
//!
//! Manages client settings persistence using JSON file storage.

use crate::config::{DEFAULT_API_BASE_URL, SETTINGS_FILE_NAME};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Root URL of the notes backend
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
        }
    }
}

/// Service for managing client settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings_path: data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<ClientSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = ClientSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: ClientSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Generic(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &ClientSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Generic(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert!(temp.path().join(SETTINGS_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_path_buf();

        {
            let service = SettingsService::new(data_dir.clone());
            let mut settings = service.load().await.unwrap();
            settings.api_base_url = "https://notes.example.com".to_string();
            service.save(&settings).await.unwrap();
        }

        {
            let service = SettingsService::new(data_dir);
            let loaded = service.load().await.unwrap();
            assert_eq!(loaded.api_base_url, "https://notes.example.com");
        }
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(temp.path().join(SETTINGS_FILE_NAME), "{}").unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings, ClientSettings::default());
    }

    #[tokio::test]
    async fn test_invalid_settings_file_is_an_error() {
        let (service, temp) = create_test_service();
        std::fs::write(temp.path().join(SETTINGS_FILE_NAME), "[1, 2").unwrap();

        let result = service.load().await;

        assert!(matches!(result, Err(AppError::Generic(msg)) if msg.starts_with("Failed to parse settings")));
    }
}
