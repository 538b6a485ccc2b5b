use uuid::Uuid;

use crate::{error::AppResult, models::WatchRecord};

/// Persistent storage for watch records
///
/// Every operation is scoped to the owning user; implementations must never
/// return or touch another user's records.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a newly created record
    async fn insert(&self, record: &WatchRecord) -> AppResult<()>;

    /// Loads all records owned by `owner_id`, newest watch date first
    async fn select_all(&self, owner_id: Uuid) -> AppResult<Vec<WatchRecord>>;

    /// Deletes the record `id` if it belongs to `owner_id`
    ///
    /// Returns `AppError::NotFound` when no such record exists for the owner.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
