//! Application configuration constants
//!
//! Central location for storage keys, defaults and user-facing fixed strings
//! used throughout the client.

// ===== Backend =====

/// Base URL used when no settings file or environment override names one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("NoteOnline/", env!("CARGO_PKG_VERSION"));

/// Environment variable overriding the configured API base URL
pub const API_URL_ENV: &str = "NOTEONLINE_API_URL";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "NOTEONLINE_DATA_DIR";

// ===== Local Storage =====

/// Storage key holding the persisted session record
pub const SESSION_STORAGE_KEY: &str = "user";

/// Directory name for the client's data under the platform data dir
pub const DATA_DIR_NAME: &str = "noteonline";

/// Sub-directory of the data dir holding key/value records
pub const STORAGE_DIR_NAME: &str = "storage";

/// Settings file name inside the data dir
pub const SETTINGS_FILE_NAME: &str = "settings.json";

// ===== Messages =====

/// Shown when a failed action carries no usable text at all
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const NAME_REQUIRED: &str = "Name is required";
pub const TITLE_REQUIRED: &str = "Title is required";
pub const CONTENT_REQUIRED: &str = "Content is required";
