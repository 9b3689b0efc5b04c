use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::errors::ProfileError;
use super::store::{ProfileStore, USERS_COLLECTION};
use super::types::ProfileRecord;

/// In-process document store for tests and offline development
pub struct MemoryProfileStore {
    records: RwLock<HashMap<String, ProfileRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory profile store");
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn make_key(uid: &str) -> String {
        format!("{USERS_COLLECTION}:{uid}")
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, uid: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        let records = self.records.read().await;
        Ok(records.get(&Self::make_key(uid)).cloned())
    }

    async fn put(&self, uid: &str, record: &ProfileRecord) -> Result<(), ProfileError> {
        let mut records = self.records.write().await;
        records.insert(Self::make_key(uid), record.clone());
        Ok(())
    }

    async fn exists(&self, uid: &str) -> Result<bool, ProfileError> {
        let records = self.records.read().await;
        Ok(records.contains_key(&Self::make_key(uid)))
    }
}
