//! Persistent token storage.
//!
//! This module provides:
//! - `TokenStore`: the key/value capability the session manager is built on
//! - `MemoryTokenStore`: in-process storage for tests and throwaway sessions
//! - `FileTokenStore`: JSON file in the data directory, survives restarts
//! - `KeyringTokenStore`: OS keychain storage via keyring
//!
//! Stores are last-write-wins and hold plain strings. Nothing here knows
//! what a token means; pairing rules live in the session manager.

pub mod file;
pub mod keychain;
pub mod memory;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use file::FileTokenStore;
pub use keychain::KeyringTokenStore;
pub use memory::MemoryTokenStore;

/// Slot holding the bearer access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Slot holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Token store lock poisoned")]
    Poisoned,
}

/// Durable string slots keyed by name.
pub trait TokenStore: Send + Sync {
    /// Read a slot, `None` when it has never been set or was removed
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a slot, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// When the store was last written, if the backend tracks it
    fn last_modified(&self) -> Option<DateTime<Utc>> {
        None
    }
}
