use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use tracing::debug;

use super::{StoreError, TokenStore};

/// Default keychain service name
pub const DEFAULT_SERVICE_NAME: &str = "authgate";

/// Token store that keeps each slot as its own OS keychain entry.
///
/// Entries are created once per slot and reused. Some credential backends
/// (keyring's mock store in particular) tie the secret to the `Entry`
/// value, so a fresh `Entry` per call would never see earlier writes.
pub struct KeyringTokenStore {
    service: String,
    entries: Mutex<HashMap<String, Entry>>,
}

impl KeyringTokenStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Run `f` against the slot's entry, creating it on first use
    fn with_entry<T>(
        &self,
        key: &str,
        f: impl FnOnce(&Entry) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        if !entries.contains_key(key) {
            let entry = Entry::new(&self.service, key)?;
            entries.insert(key.to_string(), entry);
        }
        match entries.get(key) {
            Some(entry) => f(entry),
            None => Err(StoreError::Poisoned),
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entry(key, |entry| Ok(entry.set_password(value)?))?;
        debug!(service = %self.service, key, "Keychain slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        })
    }
}
