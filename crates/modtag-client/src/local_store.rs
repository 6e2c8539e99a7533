// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side key/value persistence for the session id and vote history.
//!
//! Values are opaque strings; callers serialize their own JSON. The file
//! backend keeps every key in one JSON object and rewrites it atomically.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use modtag_core::ModtagError;
use tracing::{debug, warn};

/// Key holding the anonymous session id.
pub const SESSION_ID_KEY: &str = "session_id";
/// Key holding the session creation time in epoch milliseconds.
pub const SESSION_CREATED_KEY: &str = "session_created";
/// Key holding the JSON array of local vote records.
pub const VOTE_HISTORY_KEY: &str = "vote_history";

/// String key/value storage that survives between client runs.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ModtagError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ModtagError>;

    fn remove(&self, key: &str) -> Result<(), ModtagError>;

    fn clear(&self) -> Result<(), ModtagError>;
}

fn poisoned() -> ModtagError {
    ModtagError::Internal("local store lock poisoned".to_string())
}

/// In-process store. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ModtagError> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ModtagError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ModtagError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), ModtagError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.clear();
        Ok(())
    }
}

/// JSON file store.
///
/// Reads the file on every access so several processes sharing a file see
/// each other's writes. Writes go to a sibling temp file that is renamed into
/// place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ModtagError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(ModtagError::storage(e)),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "local store is corrupt, starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), ModtagError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(ModtagError::storage)?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(ModtagError::storage)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(ModtagError::storage)?;
        std::fs::rename(&tmp, &self.path).map_err(ModtagError::storage)?;
        debug!(path = %self.path.display(), keys = entries.len(), "local store written");
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), ModtagError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ModtagError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ModtagError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), ModtagError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), ModtagError> {
        self.modify(BTreeMap::clear)
    }
}
