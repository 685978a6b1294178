use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{StoreError, TokenStore};

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(default)]
    slots: BTreeMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

/// Token store backed by a JSON file.
///
/// The file is read once on open and rewritten on every mutation. When the
/// last slot is removed the file itself is deleted, so a signed-out machine
/// carries no token file at all.
pub struct FileTokenStore {
    path: PathBuf,
    data: Mutex<TokenFile>,
}

impl FileTokenStore {
    /// Open (or lazily create) the token file inside `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = dir.as_ref().join(TOKEN_FILE);
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            TokenFile::default()
        };
        debug!(path = %path.display(), slots = data.slots.len(), "Token file opened");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &TokenFile) -> Result<(), StoreError> {
        if data.slots.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, contents)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(data.slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = data.clone();
        next.slots.insert(key.to_string(), value.to_string());
        next.updated_at = Some(Utc::now());
        self.persist(&next)?;
        *data = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        if !data.slots.contains_key(key) {
            return Ok(());
        }
        let mut next = data.clone();
        next.slots.remove(key);
        next.updated_at = Some(Utc::now());
        self.persist(&next)?;
        *data = next;
        Ok(())
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.data.lock().ok().and_then(|data| data.updated_at)
    }
}
