use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::RecordStore,
    error::{AppError, AppResult},
    models::WatchRecord,
};

/// Record store kept in process memory
///
/// Used for local runs without a database and as the store in tests.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Uuid, Vec<WatchRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: &WatchRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        let owned = records.entry(record.owner_id).or_default();

        if owned.iter().any(|r| r.id == record.id) {
            return Err(AppError::InvalidInput(format!(
                "Watch record {} already exists",
                record.id
            )));
        }

        owned.push(record.clone());
        Ok(())
    }

    async fn select_all(&self, owner_id: Uuid) -> AppResult<Vec<WatchRecord>> {
        let records = self.records.read().await;
        let mut owned = records.get(&owner_id).cloned().unwrap_or_default();
        // Equal dates: the most recently logged record comes first after the reverse
        owned.sort_by_key(|r| r.watched_date);
        owned.reverse();
        Ok(owned)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        let mut records = self.records.write().await;
        let owned = records
            .get_mut(&owner_id)
            .ok_or_else(|| AppError::NotFound(format!("Watch record {}", id)))?;

        let before = owned.len();
        owned.retain(|r| r.id != id);

        if owned.len() == before {
            return Err(AppError::NotFound(format!("Watch record {}", id)));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
