//! Key-value store adapter for Redis.

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

/// Capability set the aggregation engine needs from the key-value store.
///
/// Absence is modeled as `Ok(None)` / `Ok(false)`, never as an error;
/// every `Err` from these methods is a transport or store failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Health check - verify Redis connectivity.
    async fn health_check(&self) -> Result<bool>;

    /// Get the value mapped to a key, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a key/value pair with a TTL. Last write wins.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// All keys matching a glob pattern, fully drained across scan pages.
    async fn keys_by_prefix(&self, pattern: &str) -> Result<Vec<String>>;

    /// Whether a key currently exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Reset the TTL of an existing key.
    async fn set_ttl(&self, key: &str, ttl_secs: u64) -> Result<()>;
}

/// Redis implementation of CacheStore, pinned to one logical DB index.
#[derive(Clone)]
pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    /// Builds an adapter whose connections select `namespace` for their
    /// lifetime. Separate namespaces get separate adapter instances; a
    /// shared handle is never switched between namespaces mid-flight.
    pub fn new(client: &redis::Client, namespace: i64) -> Result<Self> {
        let mut info = client.get_connection_info().clone();
        info.redis.db = namespace;
        Ok(Self {
            client: redis::Client::open(info)?,
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(result == "PONG")
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn keys_by_prefix(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Callers assume the returned set is complete, so the scan cursor
        // must be driven all the way back to 0, not read as a single page.
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let found: bool = conn.exists(key).await?;
        Ok(found)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn set_ttl(&self, key: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.expire(key, ttl_secs as i64).await?;
        Ok(())
    }
}
