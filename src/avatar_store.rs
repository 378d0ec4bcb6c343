//! File-backed table of generated avatars.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::session::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarRecord {
    pub url: String,
    pub session_id: String,
    pub class_name: String,
    pub created_at: i64,
}

/// Records in creation order, persisted as a JSON array.
pub struct AvatarStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AvatarStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<AvatarRecord>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create(&self, record: AvatarRecord) -> Result<AvatarRecord, StorageError> {
        let _guard = self.lock.lock().await;

        let mut records = self.read_all().await?;
        records.push(record.clone());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&records)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Stored avatar #{} for session {}", records.len(), record.session_id);
        Ok(record)
    }

    pub async fn find_by_session(&self, session: &SessionId) -> Result<Vec<AvatarRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .filter(|r| r.session_id == session.as_str())
            .collect())
    }
}
