//! Per-user record list kept in memory and reconciled with the store.
//!
//! Mutations are applied locally first, then sent to the [`RecordStore`]; a
//! failed store call rolls the local change back so the list never drifts
//! from what is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    db::RecordStore,
    error::{AppError, AppResult},
    models::WatchRecord,
};

/// One user's watch records, newest first
#[derive(Debug, Clone)]
pub struct Journal {
    owner_id: Uuid,
    records: Vec<WatchRecord>,
}

impl Journal {
    /// Hydrates the journal from the store
    pub async fn load(store: &dyn RecordStore, owner_id: Uuid) -> AppResult<Self> {
        let records = store.select_all(owner_id).await?;
        tracing::debug!(user_id = %owner_id, records = records.len(), store = store.name(), "Journal loaded");
        Ok(Self { owner_id, records })
    }

    pub fn records(&self) -> &[WatchRecord] {
        &self.records
    }

    /// Adds a record locally, then persists it; rolls back if the insert fails
    pub async fn add(&mut self, store: &dyn RecordStore, record: WatchRecord) -> AppResult<()> {
        if record.owner_id != self.owner_id {
            return Err(AppError::Internal(format!(
                "Record {} does not belong to journal owner",
                record.id
            )));
        }

        let id = record.id;
        self.records.insert(0, record);

        // Index 0 is ours until this call returns
        if let Err(e) = store.insert(&self.records[0]).await {
            self.records.retain(|r| r.id != id);
            tracing::warn!(error = %e, record_id = %id, user_id = %self.owner_id, "Insert failed, local add rolled back");
            return Err(e);
        }

        tracing::info!(record_id = %id, user_id = %self.owner_id, "Watch record added");
        Ok(())
    }

    /// Removes a record locally, then deletes it in the store; restores it if the delete fails
    pub async fn delete(&mut self, store: &dyn RecordStore, id: Uuid) -> AppResult<()> {
        let removed = self
            .records
            .iter()
            .position(|r| r.id == id)
            .map(|index| (index, self.records.remove(index)));

        match store.delete(id, self.owner_id).await {
            Ok(()) => {
                tracing::info!(record_id = %id, user_id = %self.owner_id, "Watch record deleted");
                Ok(())
            }
            Err(e) => {
                if let Some((index, record)) = removed {
                    self.records.insert(index, record);
                }
                tracing::warn!(error = %e, record_id = %id, user_id = %self.owner_id, "Delete failed, local removal rolled back");
                Err(e)
            }
        }
    }

    /// Records watched in `year` (if given) whose title contains `query` (if given)
    pub fn filter(&self, year: Option<i32>, query: Option<&str>) -> Vec<WatchRecord> {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        self.records
            .iter()
            .filter(|r| year.map_or(true, |y| r.watched_in(y)))
            .filter(|r| {
                needle
                    .as_deref()
                    .map_or(true, |n| r.title.to_lowercase().contains(n))
            })
            .cloned()
            .collect()
    }

    /// Records watched in `year`
    pub fn for_year(&self, year: i32) -> Vec<WatchRecord> {
        self.filter(Some(year), None)
    }
}

/// Journals of all active users, hydrated on first access
#[derive(Default)]
pub struct JournalCache {
    journals: RwLock<HashMap<Uuid, Arc<Mutex<Journal>>>>,
}

impl JournalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's journal, loading it from the store if needed
    pub async fn journal(
        &self,
        store: &dyn RecordStore,
        owner_id: Uuid,
    ) -> AppResult<Arc<Mutex<Journal>>> {
        if let Some(journal) = self.journals.read().await.get(&owner_id) {
            return Ok(journal.clone());
        }

        let loaded = Journal::load(store, owner_id).await?;
        let mut journals = self.journals.write().await;
        // Another request may have hydrated it meanwhile
        let journal = journals
            .entry(owner_id)
            .or_insert_with(|| Arc::new(Mutex::new(loaded)));
        Ok(journal.clone())
    }

    /// Reloads the user's journal from the store
    pub async fn refresh(
        &self,
        store: &dyn RecordStore,
        owner_id: Uuid,
    ) -> AppResult<Arc<Mutex<Journal>>> {
        let loaded = Journal::load(store, owner_id).await?;
        let mut journals = self.journals.write().await;
        match journals.get(&owner_id) {
            Some(journal) => {
                let journal = journal.clone();
                drop(journals);
                *journal.lock().await = loaded;
                Ok(journal)
            }
            None => {
                let journal = Arc::new(Mutex::new(loaded));
                journals.insert(owner_id, journal.clone());
                Ok(journal)
            }
        }
    }

    /// Drops the cached journal, e.g. on sign-out
    pub async fn evict(&self, owner_id: Uuid) {
        self.journals.write().await.remove(&owner_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRecordStore;
    use crate::models::Rating;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose writes always fail
    struct BrokenStore;

    #[async_trait::async_trait]
    impl RecordStore for BrokenStore {
        async fn insert(&self, _record: &WatchRecord) -> AppResult<()> {
            Err(AppError::Internal("connection reset".to_string()))
        }

        async fn select_all(&self, _owner_id: Uuid) -> AppResult<Vec<WatchRecord>> {
            Ok(vec![])
        }

        async fn delete(&self, _id: Uuid, _owner_id: Uuid) -> AppResult<()> {
            Err(AppError::Internal("connection reset".to_string()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    /// In-memory store that counts full reloads
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryRecordStore,
        loads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RecordStore for CountingStore {
        async fn insert(&self, record: &WatchRecord) -> AppResult<()> {
            self.inner.insert(record).await
        }

        async fn select_all(&self, owner_id: Uuid) -> AppResult<Vec<WatchRecord>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.select_all(owner_id).await
        }

        async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
            self.inner.delete(id, owner_id).await
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn record(owner_id: Uuid, title: &str, watched: (i32, u32, u32)) -> WatchRecord {
        WatchRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            poster_path: None,
            overview: String::new(),
            rating: Rating::try_from(4).unwrap(),
            comments: None,
            watched_date: NaiveDate::from_ymd_opt(watched.0, watched.1, watched.2).unwrap(),
            genres: vec![],
            external_id: None,
        }
    }

    #[tokio::test]
    async fn test_add_persists_and_prepends() {
        let store = InMemoryRecordStore::new();
        let owner = Uuid::new_v4();
        let mut journal = Journal::load(&store, owner).await.unwrap();

        journal.add(&store, record(owner, "First", (2024, 1, 1))).await.unwrap();
        journal.add(&store, record(owner, "Second", (2024, 1, 2))).await.unwrap();

        assert_eq!(journal.records()[0].title, "Second");
        assert_eq!(store.select_all(owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_add_is_rolled_back() {
        let owner = Uuid::new_v4();
        let mut journal = Journal::load(&BrokenStore, owner).await.unwrap();

        let result = journal.add(&BrokenStore, record(owner, "Lost", (2024, 1, 1))).await;
        assert!(result.is_err());
        assert!(journal.records().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_restores_position() {
        let store = InMemoryRecordStore::new();
        let owner = Uuid::new_v4();
        let mut journal = Journal::load(&store, owner).await.unwrap();
        for (title, day) in [("A", 1), ("B", 2), ("C", 3)] {
            journal.add(&store, record(owner, title, (2024, 1, day))).await.unwrap();
        }
        let middle = journal.records()[1].id;

        let result = journal.delete(&BrokenStore, middle).await;
        assert!(result.is_err());
        let titles: Vec<&str> = journal.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_delete_removes_locally_and_in_store() {
        let store = InMemoryRecordStore::new();
        let owner = Uuid::new_v4();
        let mut journal = Journal::load(&store, owner).await.unwrap();
        let rec = record(owner, "Gone", (2024, 6, 1));
        let id = rec.id;
        journal.add(&store, rec).await.unwrap();

        journal.delete(&store, id).await.unwrap();
        assert!(journal.records().is_empty());
        assert!(store.select_all(owner).await.unwrap().is_empty());
        assert!(journal.for_year(2024).is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_foreign_record() {
        let store = InMemoryRecordStore::new();
        let mut journal = Journal::load(&store, Uuid::new_v4()).await.unwrap();
        let result = journal
            .add(&store, record(Uuid::new_v4(), "Theirs", (2024, 1, 1)))
            .await;
        assert!(result.is_err());
        assert!(journal.records().is_empty());
    }

    #[tokio::test]
    async fn test_filter_by_year_and_title() {
        let store = InMemoryRecordStore::new();
        let owner = Uuid::new_v4();
        let mut journal = Journal::load(&store, owner).await.unwrap();
        journal.add(&store, record(owner, "The Thing", (2023, 10, 31))).await.unwrap();
        journal.add(&store, record(owner, "Things to Come", (2024, 2, 1))).await.unwrap();
        journal.add(&store, record(owner, "Alien", (2024, 3, 1))).await.unwrap();

        assert_eq!(journal.for_year(2024).len(), 2);
        assert_eq!(journal.filter(None, Some("THING")).len(), 2);
        let both = journal.filter(Some(2024), Some(" thing "));
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "Things to Come");
        assert_eq!(journal.filter(None, Some("")).len(), 3);
    }

    #[tokio::test]
    async fn test_cache_hydrates_once_and_refreshes() {
        let store = InMemoryRecordStore::new();
        let owner = Uuid::new_v4();
        store.insert(&record(owner, "Seeded", (2024, 1, 1))).await.unwrap();

        let cache = JournalCache::new();
        let journal = cache.journal(&store, owner).await.unwrap();
        assert_eq!(journal.lock().await.records().len(), 1);

        // Written behind the cache's back
        store.insert(&record(owner, "Direct", (2024, 1, 2))).await.unwrap();
        let same = cache.journal(&store, owner).await.unwrap();
        assert!(Arc::ptr_eq(&journal, &same));
        assert_eq!(same.lock().await.records().len(), 1);

        let refreshed = cache.refresh(&store, owner).await.unwrap();
        assert_eq!(refreshed.lock().await.records().len(), 2);
        assert!(Arc::ptr_eq(&journal, &refreshed));

        cache.evict(owner).await;
        let reloaded = cache.journal(&store, owner).await.unwrap();
        assert!(!Arc::ptr_eq(&journal, &reloaded));
    }

    #[tokio::test]
    async fn test_cold_refresh_loads_once() {
        let store = CountingStore::default();
        let owner = Uuid::new_v4();
        store.insert(&record(owner, "Seeded", (2024, 1, 1))).await.unwrap();

        let cache = JournalCache::new();
        let journal = cache.refresh(&store, owner).await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
        assert_eq!(journal.lock().await.records().len(), 1);

        // The refreshed entry is the one later lookups get
        let cached = cache.journal(&store, owner).await.unwrap();
        assert!(Arc::ptr_eq(&journal, &cached));
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);

        cache.refresh(&store, owner).await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }
}
