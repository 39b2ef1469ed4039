use anyhow::Context;
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands};

use super::LinkStore;
use crate::error::StoreError;

/// Redis-backed store. Holds one multiplexed connection; clones of it share
/// the underlying socket, so per-call cloning is cheap.
#[derive(Clone)]
pub struct RedisStore {
    con: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)
            .with_context(|| format!("invalid redis URL '{url}'"))?;
        let con = client
            .get_multiplexed_tokio_connection()
            .await
            .context("failed to connect to redis")?;
        Ok(Self { con })
    }
}

#[async_trait]
impl LinkStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.con.clone();
        Ok(con.get(key).await?)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        let _: () = con.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn set_with_ttl_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<bool, StoreError> {
        let mut con = self.con.clone();
        // SET NX EX replies OK on write, nil when the key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut con)
            .await?;
        Ok(reply.is_some())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut con = self.con.clone();
        let _: () = con.del(keys).await?;
        Ok(())
    }

    async fn keys_matching(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut con = self.con.clone();
        Ok(con.keys(format!("{prefix}*")).await?)
    }
}
