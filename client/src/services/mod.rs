//! Services module
//!
//! Supporting services used while setting up the client.

pub mod settings;

pub use settings::{ClientSettings, SettingsService};
