//! Shared fakes for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::avatar::AvatarService;
use crate::avatar_store::AvatarRecord;
use crate::error::GenerationError;
use crate::session::SessionId;

/// In-memory avatar service that records every generate call.
pub struct FakeService {
    pub records: Mutex<Vec<AvatarRecord>>,
    pub next: Mutex<Result<String, GenerationError>>,
    pub calls: Mutex<Vec<(String, String)>>,
    pub gate: Option<Arc<Notify>>,
}

impl FakeService {
    pub fn returning(next: Result<String, GenerationError>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next: Mutex::new(next),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_prior(self, url: &str, session: &str) -> Self {
        self.records.lock().unwrap().push(AvatarRecord {
            url: url.to_string(),
            session_id: session.to_string(),
            class_name: "prior".to_string(),
            created_at: 0,
        });
        self
    }
}

#[async_trait]
impl AvatarService for FakeService {
    async fn generate(&self, character_class: &str, session: &SessionId) -> Result<AvatarRecord, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((character_class.to_string(), session.as_str().to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let url = self.next.lock().unwrap().clone()?;
        if url.is_empty() {
            return Err(GenerationError::EmptyUrl);
        }
        let record = AvatarRecord {
            url,
            session_id: session.as_str().to_string(),
            class_name: character_class.to_string(),
            created_at: 1,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn avatars(&self, session: &SessionId) -> Result<Vec<AvatarRecord>, GenerationError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.session_id == session.as_str())
            .cloned()
            .collect())
    }
}
