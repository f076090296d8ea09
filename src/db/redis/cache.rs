use redis::{AsyncCommands, Client};
use std::fmt::Display;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::error::{AppError, AppResult};

/// Keys for OMDb responses kept in Redis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// One page of `?s=` results; titles are case-insensitive
    OmdbSearch { title: String, page: u32 },
    /// `?i=` details for one IMDb id
    OmdbDetails(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::OmdbSearch { title, page } => {
                write!(f, "omdb:search:{}:{}", title.trim().to_lowercase(), page)
            }
            CacheKey::OmdbDetails(imdb_id) => write!(f, "omdb:details:{}", imdb_id),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// A pending `SETEX` queued by [`Cache::set_in_background`]
struct PendingWrite {
    key: String,
    value: String,
    ttl_secs: u64,
}

/// Read-through JSON cache over Redis.
///
/// Reads hit Redis inline. Writes are queued to a single writer task so request
/// handlers never wait on Redis round trips.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the writer task once everything queued so far has been written
pub struct CacheWriterHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl Cache {
    /// Spawns the writer task and returns the cache with its shutdown handle
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(Self::run_writer(redis_client.clone(), write_rx, shutdown_rx));

        (
            Self {
                redis_client,
                write_tx,
            },
            CacheWriterHandle { shutdown_tx, task },
        )
    }

    async fn run_writer(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        tracing::debug!("Cache writer started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => Self::apply(&client, write).await,
                _ = &mut shutdown_rx => break,
                else => return,
            }
        }

        // Cache clones may still hold senders, so drain without waiting for close
        let mut flushed = 0usize;
        while let Ok(write) = write_rx.try_recv() {
            Self::apply(&client, write).await;
            flushed += 1;
        }
        tracing::info!(flushed, "Cache writer flushed pending writes");
    }

    async fn apply(client: &Client, write: PendingWrite) {
        let key = write.key.clone();
        if let Err(e) = Self::write_to_redis(client, write).await {
            tracing::warn!(error = %e, key = %key, "Failed to write to Redis cache");
        }
    }

    async fn write_to_redis(client: &Client, write: PendingWrite) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(write.key, write.value, write.ttl_secs).await?;
        Ok(())
    }

    /// Looks up `key` and decodes the stored JSON. `Ok(None)` on a miss.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Queues `value` for storage under `key` for `ttl_secs` seconds.
    /// Returns immediately; failures are only logged.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl_secs: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value,
            ttl_secs,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer is stopped; dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OmdbSearchResponse;

    fn live_cache_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// A cache whose reads always fail, with the write queue exposed
    fn unreachable_cache() -> (Cache, mpsc::UnboundedReceiver<PendingWrite>) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let cache = Cache {
            redis_client: create_redis_client("redis://127.0.0.1:1").unwrap(),
            write_tx,
        };
        (cache, write_rx)
    }

    async fn search_page(cache: &Cache, body: &str) -> AppResult<OmdbSearchResponse> {
        let page: OmdbSearchResponse = serde_json::from_str(body).unwrap();
        crate::cached!(
            cache,
            CacheKey::OmdbSearch {
                title: "alien".to_string(),
                page: 1,
            },
            60,
            async { Ok::<_, AppError>(page) },
            keep_if = OmdbSearchResponse::is_success
        )
    }

    #[tokio::test]
    async fn test_cached_skips_values_failing_keep_if() {
        let (cache, mut writes) = unreachable_cache();

        let page = search_page(
            &cache,
            r#"{"Response":"False","Error":"Request limit reached!"}"#,
        )
        .await
        .unwrap();

        assert!(!page.is_success());
        assert!(writes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cached_queues_values_passing_keep_if() {
        let (cache, mut writes) = unreachable_cache();

        let page = search_page(
            &cache,
            r#"{"Search":[],"totalResults":"0","Response":"True"}"#,
        )
        .await
        .unwrap();

        assert!(page.is_success());
        let write = writes.try_recv().unwrap();
        assert_eq!(write.key, "omdb:search:alien:1");
        assert_eq!(write.ttl_secs, 60);
    }

    #[test]
    fn test_cache_key_omdb_search_is_case_insensitive() {
        let key = CacheKey::OmdbSearch {
            title: "  The MATRIX ".to_string(),
            page: 2,
        };
        assert_eq!(format!("{}", key), "omdb:search:the matrix:2");
    }

    #[test]
    fn test_cache_key_omdb_details() {
        let key = CacheKey::OmdbDetails("tt0133093".to_string());
        assert_eq!(format!("{}", key), "omdb:details:tt0133093");
    }

    #[test]
    fn test_cache_keys_differ_by_page() {
        let first = CacheKey::OmdbSearch {
            title: "alien".to_string(),
            page: 1,
        };
        let second = CacheKey::OmdbSearch {
            title: "alien".to_string(),
            page: 2,
        };
        assert_ne!(format!("{}", first), format!("{}", second));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_cache_miss() {
        let client = create_redis_client(&live_cache_url()).unwrap();
        let (cache, _handle) = Cache::new(client).await;

        let key = CacheKey::OmdbDetails("tt_missing_12345".to_string());
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_set_in_background_then_flush_on_shutdown() {
        let client = create_redis_client(&live_cache_url()).unwrap();
        let (cache, handle) = Cache::new(client.clone()).await;

        let key = CacheKey::OmdbSearch {
            title: "cache_writer_shutdown".to_string(),
            page: 1,
        };
        let value = vec!["tt0000001".to_string()];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(format!("{}", key)).await.unwrap();
    }
}
