// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anonymous session identity.

use std::sync::Arc;

use modtag_core::ModtagError;
use tracing::info;

use crate::local_store::{LocalStore, SESSION_CREATED_KEY, SESSION_ID_KEY};

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Hands out the persisted session id, creating one on first use.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn LocalStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// The stored session id, or a fresh UUID v4 that is stored for next time.
    pub fn session_id(&self) -> Result<String, ModtagError> {
        if let Some(id) = self.store.get(SESSION_ID_KEY)?.filter(|id| !id.is_empty()) {
            return Ok(id);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.store.set(SESSION_ID_KEY, &id)?;
        self.store
            .set(SESSION_CREATED_KEY, &now_millis().to_string())?;
        info!(session_id = %id, "new anonymous session");
        Ok(id)
    }

    /// The stored session id without creating one.
    pub fn current(&self) -> Result<Option<String>, ModtagError> {
        Ok(self.store.get(SESSION_ID_KEY)?.filter(|id| !id.is_empty()))
    }

    /// When the session was created, in epoch milliseconds.
    pub fn created_at(&self) -> Result<Option<i64>, ModtagError> {
        Ok(self
            .store
            .get(SESSION_CREATED_KEY)?
            .and_then(|raw| raw.parse().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_store::MemoryStore;

    #[test]
    fn session_id_is_stable() {
        let sessions = SessionManager::new(Arc::new(MemoryStore::new()));
        assert_eq!(sessions.current().unwrap(), None);
        let first = sessions.session_id().unwrap();
        assert_eq!(sessions.session_id().unwrap(), first);
        assert_eq!(sessions.current().unwrap(), Some(first.clone()));
        assert!(uuid::Uuid::parse_str(&first).is_ok());
        assert!(sessions.created_at().unwrap().is_some());
    }

    #[test]
    fn existing_id_is_reused() {
        let store = Arc::new(MemoryStore::new());
        store.set(SESSION_ID_KEY, "legacy-id").unwrap();
        let sessions = SessionManager::new(store);
        assert_eq!(sessions.session_id().unwrap(), "legacy-id");
        assert_eq!(sessions.created_at().unwrap(), None);
    }
}
