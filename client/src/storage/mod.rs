//! Storage module
//!
//! Provides durable key/value storage for records that outlive the process
//! (the persisted session).

pub mod local_storage;

pub use local_storage::LocalStorage;
