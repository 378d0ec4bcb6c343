use std::fmt;

use crate::storage::{KeyValueStore, SESSION_KEY};

/// Opaque per-installation identity that scopes avatar records.
///
/// An empty id means storage was unavailable; avatar features go inert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Return the persisted session id, generating and storing one on first run.
pub fn get_or_create_session_id(store: &mut dyn KeyValueStore) -> SessionId {
    match store.get(SESSION_KEY) {
        Ok(Some(id)) if !id.is_empty() => SessionId(id),
        Ok(_) => {
            let id = uuid::Uuid::new_v4().to_string();
            match store.set(SESSION_KEY, &id) {
                Ok(()) => {
                    tracing::info!("Created new session {}", id);
                    SessionId(id)
                }
                Err(e) => {
                    tracing::warn!("Could not persist session id, avatars disabled: {}", e);
                    SessionId::default()
                }
            }
        }
        Err(e) => {
            tracing::warn!("Could not read session id, avatars disabled: {}", e);
            SessionId::default()
        }
    }
}
