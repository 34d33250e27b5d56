//! Durable key/value storage
//!
//! Each key maps to one JSON file under the storage root.
//! Example: key "user" is stored at "storage/user.json"
//!
//! Writes go to a uniquely named temp file first and are renamed into place,
//! so a reader never sees a half-written record.

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// JSON record store rooted at a directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new storage at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the storage (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Local storage initialized at: {:?}", self.root);
        Ok(())
    }

    /// Read and decode the record under `key`, `None` if absent
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.get_path(key)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_str(&content)?;
        tracing::debug!("Read record: {}", key);

        Ok(Some(value))
    }

    /// Encode and write `value` under `key`, replacing any previous record
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.get_path(key)?;
        let content = serde_json::to_vec(value)?;

        fs::create_dir_all(&self.root).await?;

        let temp_path = self.root.join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;

        fs::rename(temp_path, &path).await?;

        tracing::debug!("Wrote record: {} ({} bytes)", key, content.len());

        Ok(())
    }

    /// Delete the record under `key`. Deleting a missing record is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.get_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Removed record: {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a record exists
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let path = self.get_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Get file path for a key
    fn get_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(AppError::Generic(format!("Invalid storage key: {:?}", key)));
        }

        Ok(self.root.join(format!("{}.json", key)))
    }

    /// Get storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}
