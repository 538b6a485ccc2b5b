use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

/// Keys for cached metadata-service responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MovieSearch(String),
    GenreList,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieSearch(query) => {
                write!(f, "tmdb:search:{}", query.trim().to_lowercase())
            }
            CacheKey::GenreList => write!(f, "tmdb:genres"),
        }
    }
}

/// Creates a Redis client for caching
///
/// The client connects lazily, so this only validates the URL.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for metadata lookups
///
/// Reads go straight to Redis; writes are queued to a background task so a
/// slow or absent Redis never delays a search response.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        (
            Self {
                redis_client,
                write_tx,
            },
            CacheWriterHandle { shutdown_tx },
        )
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    let key = msg.key.clone();
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::warn!(error = %e, key = %key, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Senders live in every Cache clone, so drain what is queued rather than waiting for close
                    let mut flushed = 0;
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::warn!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Looks up a cached value
    ///
    /// A Redis outage is treated as a miss so lookups fall through to the
    /// metadata service. Corrupt entries are reported as errors.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached = match self.read_raw(key).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Redis read failed, treating as cache miss");
                return Ok(None);
            }
        };

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn read_raw(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;
        Ok(cached)
    }

    /// Queues a value for caching without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_movie_search() {
        let key = CacheKey::MovieSearch("Inception".to_string());
        assert_eq!(key.to_string(), "tmdb:search:inception");
    }

    #[test]
    fn test_cache_key_display_movie_search_normalized() {
        let key = CacheKey::MovieSearch("  THE MATRIX ".to_string());
        assert_eq!(key.to_string(), "tmdb:search:the matrix");
    }

    #[test]
    fn test_cache_key_display_genre_list() {
        assert_eq!(CacheKey::GenreList.to_string(), "tmdb:genres");
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_a_miss() {
        // Nothing listens on port 1
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, handle) = Cache::new(client);

        let key = CacheKey::MovieSearch("heat".to_string());
        let cached: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(cached, None);

        // Queued writes fail quietly
        cache.set_in_background(&key, &vec!["Heat".to_string()], 60);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_set_in_background_writes_to_cache() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = create_redis_client(&redis_url).unwrap();
        if client.get_multiplexed_async_connection().await.is_err() {
            eprintln!("skipping: no Redis at {}", redis_url);
            return;
        }

        let (cache, _handle) = Cache::new(client.clone());
        let key = CacheKey::MovieSearch("reel_journal_cache_test".to_string());
        let value = vec!["item1".to_string(), "item2".to_string()];

        cache.set_in_background(&key, &value, 60);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
