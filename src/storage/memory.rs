use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ProgressStore, ResponseLog, StoreError};
use crate::models::{ResponseRecord, UserProgress};

/// Хранилище в памяти процесса. Всё пропадает при перезапуске.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, UserProgress>>>,
    responses: Arc<RwLock<Vec<ResponseRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn responses(&self) -> Vec<ResponseRecord> {
        self.responses.read().await.clone()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn put(&self, progress: &UserProgress) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .insert(progress.user_id.clone(), progress.clone());
        Ok(())
    }
}

#[async_trait]
impl ResponseLog for MemoryStore {
    async fn append(&self, record: &ResponseRecord) -> Result<(), StoreError> {
        self.responses.write().await.push(record.clone());
        Ok(())
    }
}
