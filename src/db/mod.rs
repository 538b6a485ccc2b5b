pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use self::memory::InMemoryRecordStore;
pub use self::postgres::{create_pool, run_migrations, PgRecordStore};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use self::store::RecordStore;
