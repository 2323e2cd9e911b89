//! Async Redis cache client shared by the cache-fronted services
//!
//! The cache is strictly a performance optimization, never a correctness
//! dependency: every backend failure is logged and degraded to a miss
//! (`get`) or a no-op (`set`/`delete`), so callers behave exactly as if the
//! cache were absent. A failed `connect` leaves the store permanently
//! disconnected for the process lifetime; there is no retry loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use tracing::{debug, error, info};

/// Byte-level backend behind [`CacheStore`].
///
/// Production runs on the Redis connection manager; tests inject
/// [`InMemoryBackend`] the same way the image store takes an in-memory
/// `ObjectStore`.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> RedisResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> RedisResult<()>;
    async fn delete(&self, key: &str) -> RedisResult<()>;
}

struct RedisBackend {
    conn: ConnectionManager,
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> RedisResult<Option<Vec<u8>>> {
        self.conn.clone().get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> RedisResult<()> {
        self.conn.clone().set_ex(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> RedisResult<()> {
        self.conn.clone().del(key).await
    }
}

/// In-memory backend with no expiry, for exercising cache-fronted request
/// paths without a Redis server.
#[derive(Default)]
pub struct InMemoryBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> RedisResult<Option<Vec<u8>>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], _ttl_seconds: u64) -> RedisResult<()> {
        self.entries().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> RedisResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Namespaced key-value cache with a default TTL.
///
/// Cloning is cheap: clones share one backend.
#[derive(Clone)]
pub struct CacheStore {
    url: String,
    prefix: String,
    default_ttl: Duration,
    backend: Option<Arc<dyn CacheBackend>>,
}

impl CacheStore {
    /// Configure a store; no connection is made until [`connect`](Self::connect).
    pub fn new(url: impl Into<String>, prefix: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            url: url.into(),
            prefix: prefix.into(),
            default_ttl,
            backend: None,
        }
    }

    /// Wrap an existing backend; used by tests with [`InMemoryBackend`].
    pub fn with_backend(
        backend: Arc<dyn CacheBackend>,
        prefix: impl Into<String>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            url: String::new(),
            prefix: prefix.into(),
            default_ttl,
            backend: Some(backend),
        }
    }

    /// Establish the Redis connection and verify it with a PING.
    ///
    /// Returns false on any failure, in which case the store stays
    /// disconnected and every subsequent operation degrades gracefully.
    pub async fn connect(&mut self) -> bool {
        let client = match redis::Client::open(self.url.as_str()) {
            Ok(client) => client,
            Err(e) => {
                error!("Invalid Redis URL {}: {}", self.url, e);
                return false;
            }
        };

        match ConnectionManager::new(client).await {
            Ok(mut conn) => match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
                Ok(_) => {
                    info!("Connected to Redis at {}", self.url);
                    self.backend = Some(Arc::new(RedisBackend { conn }));
                    true
                }
                Err(e) => {
                    error!("Redis ping failed: {}", e);
                    false
                }
            },
            Err(e) => {
                error!("Failed to connect to Redis: {}", e);
                false
            }
        }
    }

    /// Whether a backend is attached.
    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// Release the backend. Idempotent.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            info!("Cache connection closed");
        }
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Get a cached value, treating every backend failure as a miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let backend = self.backend.as_ref()?;
        let cache_key = self.make_key(key);

        match backend.get(&cache_key).await {
            Ok(value) => {
                if value.is_some() {
                    debug!("Cache hit: {}", cache_key);
                }
                value
            }
            Err(e) => {
                error!("Cache get error for {}: {}", key, e);
                None
            }
        }
    }

    /// Write a value with the given TTL, falling back to the default TTL.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        let cache_key = self.make_key(key);
        let ttl = ttl.unwrap_or(self.default_ttl);

        match backend.set(&cache_key, value, ttl.as_secs()).await {
            Ok(()) => {
                debug!("Cache set: {}", cache_key);
                true
            }
            Err(e) => {
                error!("Cache set error for {}: {}", key, e);
                false
            }
        }
    }

    /// Delete a key; same failure policy as [`set`](Self::set).
    pub async fn delete(&self, key: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        let cache_key = self.make_key(key);

        match backend.delete(&cache_key).await {
            Ok(()) => {
                debug!("Cache delete: {}", cache_key);
                true
            }
            Err(e) => {
                error!("Cache delete error for {}: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_prefix() {
        let store = CacheStore::new("redis://localhost", "search", Duration::from_secs(60));
        assert_eq!(store.make_key("Snail"), "search:Snail");

        let store = CacheStore::new("redis://localhost", "image", Duration::from_secs(60));
        assert_eq!(store.make_key("mob:100100"), "image:mob:100100");
    }

    #[tokio::test]
    async fn disconnected_store_degrades_to_misses_and_noops() {
        let store = CacheStore::new("redis://localhost", "search", Duration::from_secs(60));
        assert!(!store.is_connected());
        assert_eq!(store.get("Snail").await, None);
        assert!(!store.set("Snail", b"{}", None).await);
        assert!(!store.delete("Snail").await);
    }

    #[tokio::test]
    async fn values_round_trip_through_the_backend_under_the_prefix() {
        let backend = Arc::new(InMemoryBackend::default());
        let store = CacheStore::with_backend(backend.clone(), "search", Duration::from_secs(60));

        assert!(store.set("Snail", b"payload", None).await);
        assert_eq!(store.get("Snail").await.as_deref(), Some(&b"payload"[..]));
        // Stored under the namespaced key, not the raw one.
        assert_eq!(
            backend.get("search:Snail").await.unwrap().as_deref(),
            Some(&b"payload"[..])
        );

        assert!(store.delete("Snail").await);
        assert_eq!(store.get("Snail").await, None);
    }

    #[tokio::test]
    async fn stores_with_different_prefixes_do_not_collide() {
        let backend = Arc::new(InMemoryBackend::default());
        let search = CacheStore::with_backend(backend.clone(), "search", Duration::from_secs(60));
        let image = CacheStore::with_backend(backend, "image", Duration::from_secs(60));

        search.set("100100", b"search-bytes", None).await;
        assert_eq!(image.get("100100").await, None);
    }

    #[test]
    fn close_is_idempotent() {
        let mut store = CacheStore::new("redis://localhost", "search", Duration::from_secs(60));
        store.close();
        store.close();
        assert!(!store.is_connected());
    }
}
