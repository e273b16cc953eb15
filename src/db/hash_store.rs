//! Minimal hash-of-fields storage used by the key-value exploit store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::{Config as RedisConfig, Pool, Runtime};
use redis::AsyncCommands;
use tracing::{debug, error, info};

use crate::errors::ExploitDbError;

pub const REDIS_BACKEND: &str = "redis";
pub const MEMORY_SCHEME: &str = "memory://";

/// One `HSET key field value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    pub key: String,
    pub field: String,
    pub value: String,
}

#[async_trait]
pub trait HashStore: Send + Sync {
    /// Connection target, for error context.
    fn target(&self) -> &str;

    /// Apply all writes in one pipelined round trip. Not transactional.
    async fn write_fields(&self, writes: &[FieldWrite]) -> Result<(), ExploitDbError>;

    /// All fields of one hash; a missing key yields an empty map.
    async fn read_hash(&self, key: &str) -> Result<BTreeMap<String, String>, ExploitDbError>;

    /// All fields of many hashes, pipelined, in the order of `keys`.
    async fn read_hashes(&self, keys: &[String]) -> Result<Vec<BTreeMap<String, String>>, ExploitDbError>;
}

/// Redis-backed hash store. Each operation checks a connection out of the pool
/// and returns it when done.
pub struct RedisHashStore {
    pool: Pool,
    target: String,
}

impl RedisHashStore {
    pub async fn connect(url: &str) -> Result<Self, ExploitDbError> {
        let pool = RedisConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| {
                error!("Failed to create Redis connection pool: {}", e);
                ExploitDbError::Config(format!("Invalid redis target {}: {}", url, e))
            })?;

        let store = Self { pool, target: url.to_string() };
        let mut conn = store.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| store.redis_error(e))?;

        info!(url = %url, "Redis connection established");
        Ok(store)
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, ExploitDbError> {
        self.pool.get().await.map_err(|e| {
            error!("Failed to get Redis connection: {}", e);
            ExploitDbError::connection(REDIS_BACKEND, &self.target, e.to_string())
        })
    }

    fn redis_error(&self, e: redis::RedisError) -> ExploitDbError {
        if e.is_io_error() || e.is_connection_refusal() || e.is_timeout() || e.is_connection_dropped() {
            ExploitDbError::connection(REDIS_BACKEND, &self.target, e.to_string())
        } else {
            ExploitDbError::Database(format!("Redis command failed: {}", e))
        }
    }
}

#[async_trait]
impl HashStore for RedisHashStore {
    fn target(&self) -> &str {
        &self.target
    }

    async fn write_fields(&self, writes: &[FieldWrite]) -> Result<(), ExploitDbError> {
        if writes.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for w in writes {
            pipe.hset(&w.key, &w.field, &w.value).ignore();
        }
        let mut conn = self.connection().await?;
        let _: () = pipe.query_async(&mut conn).await.map_err(|e| self.redis_error(e))?;
        Ok(())
    }

    async fn read_hash(&self, key: &str) -> Result<BTreeMap<String, String>, ExploitDbError> {
        let mut conn = self.connection().await?;
        let fields: BTreeMap<String, String> = conn.hgetall(key).await.map_err(|e| self.redis_error(e))?;
        debug!(key, fields = fields.len(), "HGETALL");
        Ok(fields)
    }

    async fn read_hashes(&self, keys: &[String]) -> Result<Vec<BTreeMap<String, String>>, ExploitDbError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.hgetall(key);
        }
        let mut conn = self.connection().await?;
        let hashes: Vec<BTreeMap<String, String>> =
            pipe.query_async(&mut conn).await.map_err(|e| self.redis_error(e))?;
        Ok(hashes)
    }
}

/// In-process hash store with the same semantics, for tests and `memory://` targets.
#[derive(Default)]
pub struct MemoryHashStore {
    hashes: DashMap<String, BTreeMap<String, String>>,
    target: String,
}

impl MemoryHashStore {
    pub fn new(target: &str) -> Self {
        Self { hashes: DashMap::new(), target: target.to_string() }
    }

    pub fn key_count(&self) -> usize {
        self.hashes.len()
    }
}

#[async_trait]
impl HashStore for MemoryHashStore {
    fn target(&self) -> &str {
        &self.target
    }

    async fn write_fields(&self, writes: &[FieldWrite]) -> Result<(), ExploitDbError> {
        for w in writes {
            self.hashes
                .entry(w.key.clone())
                .or_default()
                .insert(w.field.clone(), w.value.clone());
        }
        Ok(())
    }

    async fn read_hash(&self, key: &str) -> Result<BTreeMap<String, String>, ExploitDbError> {
        Ok(self.hashes.get(key).map(|h| h.clone()).unwrap_or_default())
    }

    async fn read_hashes(&self, keys: &[String]) -> Result<Vec<BTreeMap<String, String>>, ExploitDbError> {
        let mut hashes = Vec::with_capacity(keys.len());
        for key in keys {
            hashes.push(self.read_hash(key).await?);
        }
        Ok(hashes)
    }
}
