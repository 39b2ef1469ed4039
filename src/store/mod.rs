mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

/// Key prefix for link records (`short:<code>` → JSON [`LinkRecord`]).
pub const SHORT_PREFIX: &str = "short:";
/// Key prefix for reverse-lookup entries (`url:<original_url>` → code).
pub const URL_PREFIX: &str = "url:";

/// Minimal key-value contract the link service needs. Every value is a
/// string; expiry is per-key and fixed at write time.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Write only if `key` is currently absent. Returns whether the write
    /// happened. Backends must make the check-and-set atomic (Redis:
    /// `SET NX EX`), so two racing writers cannot both succeed.
    async fn set_with_ttl_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<bool, StoreError>;

    /// Delete all of `keys`. Missing keys are not an error.
    async fn delete(&self, keys: &[String]) -> Result<(), StoreError>;

    /// All keys starting with `prefix`.
    async fn keys_matching(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Open a store from a connection URL. `memory://` gives the in-process
/// store; anything else is handed to the redis client.
pub async fn connect(url: &str) -> anyhow::Result<Arc<dyn LinkStore>> {
    if url.starts_with("memory://") {
        tracing::warn!("using the in-memory store; links will not survive a restart");
        Ok(Arc::new(MemoryStore::new()))
    } else {
        Ok(Arc::new(RedisStore::connect(url).await?))
    }
}
