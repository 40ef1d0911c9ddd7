//! Expiring key-value store clients.
//!
//! Services talk to the shared store through the [`KvStore`] trait, which
//! only exposes the three commands a TTL-backed session registry needs:
//! set-with-ttl, get, and delete. [`RedisStore`] is the production backend;
//! [`MemoryStore`] keeps entries in process and is used by tests and local
//! development.
//!
//! Both implementations prefix every key with the configured namespace.

use crate::PlatformError;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

/// Key-value store configuration.
#[derive(Debug, Clone)]
pub struct KvStoreConfig {
    /// Redis connection URL
    pub address: String,
    /// Namespace for key isolation
    pub namespace: String,
    /// Entry count above which the in-memory store sweeps expired entries.
    ///
    /// This triggers a sweep and is not a cap: live entries are never evicted,
    /// so the store keeps growing while every entry is live.
    pub local_capacity: usize,
}

impl Default for KvStoreConfig {
    fn default() -> Self {
        Self {
            address: "redis://localhost:6379".to_string(),
            namespace: "default".to_string(),
            local_capacity: 10_000,
        }
    }
}

impl KvStoreConfig {
    /// Create config with custom address.
    ///
    /// A bare `host:port` is accepted and turned into a `redis://` URL.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.address = if address.contains("://") {
            address
        } else {
            format!("redis://{address}")
        };
        self
    }

    /// Create config with custom namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the in-memory sweep threshold.
    #[must_use]
    pub const fn with_local_capacity(mut self, capacity: usize) -> Self {
        self.local_capacity = capacity;
        self
    }

    fn namespaced_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

/// An expiring key-value store.
///
/// Implementations must let the backend enforce expiry; callers never poll
/// for stale keys.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Create or overwrite `key`, expiring it after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError>;

    /// Fetch the live value for `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError>;

    /// Delete `key`, returning how many entries were removed.
    async fn delete(&self, key: &str) -> Result<u64, PlatformError>;
}

/// Convert a TTL to whole seconds for `SET EX`, rounding up.
fn ttl_seconds(ttl: Duration) -> Result<u64, PlatformError> {
    if ttl.is_zero() {
        return Err(PlatformError::invalid_input("TTL must be positive"));
    }
    let secs = ttl.as_secs();
    Ok(if ttl.subsec_nanos() > 0 { secs + 1 } else { secs })
}

/// Redis-backed store sharing one multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    config: KvStoreConfig,
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis and verify the connection with `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unavailable`] if the URL is invalid or the
    /// server cannot be reached.
    pub async fn connect(config: KvStoreConfig) -> Result<Self, PlatformError> {
        let client = redis::Client::open(config.address.as_str())?;
        let mut conn = ConnectionManager::new(client).await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!(namespace = %config.namespace, reply = %pong, "Connected to Redis");

        Ok(Self { config, conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError> {
        let seconds = ttl_seconds(ttl)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(self.config.namespaced_key(key), value, seconds)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.config.namespaced_key(key)).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<u64, PlatformError> {
        let mut conn = self.conn.clone();
        let deleted: u64 = conn.del(self.config.namespaced_key(key)).await?;
        Ok(deleted)
    }
}

/// In-memory entry.
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Process-local store with lazy expiry.
///
/// Uses the tokio clock, so tests can pause and advance time.
#[derive(Clone)]
pub struct MemoryStore {
    config: KvStoreConfig,
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: KvStoreConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of entries currently held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(KvStoreConfig::default())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError> {
        ttl_seconds(ttl)?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.insert(
            self.config.namespaced_key(key),
            MemoryEntry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );

        if entries.len() > self.config.local_capacity {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_live(now));
            debug!(swept = before - entries.len(), "Swept expired entries");
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(&self.config.namespaced_key(key))
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<u64, PlatformError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.remove(&self.config.namespaced_key(key)) {
            Some(entry) if entry.is_live(now) => Ok(1),
            _ => Ok(0),
        }
    }
}
