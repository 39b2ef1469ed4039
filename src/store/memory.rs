use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use super::LinkStore;
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct Stored {
    value: String,
    expires_at: Instant,
}

impl Stored {
    fn live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// In-process store backed by a DashMap. Expiry is lazy: dead entries are
/// skipped on read and dropped when touched. Used as the `memory://` backend
/// and as the test double for the link service.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: DashMap<String, Stored>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn stored(value: &str, ttl_secs: u64) -> Stored {
        let now = Instant::now();
        // A TTL too large for the clock saturates to roughly a century out
        // instead of overflowing.
        let expires_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .unwrap_or_else(|| now + Duration::from_secs(100 * 365 * 24 * 3600));
        Stored {
            value: value.to_owned(),
            expires_at,
        }
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if let Some(stored) = self.inner.get(key) {
            if stored.live() {
                return Ok(Some(stored.value.clone()));
            }
        }
        // Either absent or expired; expired entries are reaped here.
        self.inner.remove_if(key, |_, s| !s.live());
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.inner.insert(key.to_owned(), Self::stored(value, ttl_secs));
        Ok(())
    }

    async fn set_with_ttl_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<bool, StoreError> {
        // The entry API holds the shard lock across the check and the
        // insert, matching the atomicity of SET NX EX.
        match self.inner.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().live() {
                    Ok(false)
                } else {
                    occupied.insert(Self::stored(value, ttl_secs));
                    Ok(true)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Self::stored(value, ttl_secs));
                Ok(true)
            }
        }
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.inner.remove(key);
        }
        Ok(())
    }

    async fn keys_matching(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .iter()
            .filter(|entry| entry.key().starts_with(prefix) && entry.value().live())
            .map(|entry| entry.key().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete_roundtrip() {
        let store = MemoryStore::new();
        store.set_with_ttl("short:abc", "v1", 60).await.unwrap();

        assert_eq!(store.get("short:abc").await.unwrap().as_deref(), Some("v1"));
        assert_eq!(store.get("short:xyz").await.unwrap(), None);

        store.delete(&["short:abc".to_owned()]).await.unwrap();
        assert_eq!(store.get("short:abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", "old", 60).await.unwrap();
        store.set_with_ttl("k", "new", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn set_if_absent_refuses_live_keys() {
        let store = MemoryStore::new();
        assert!(store.set_with_ttl_if_absent("k", "first", 60).await.unwrap());
        assert!(!store.set_with_ttl_if_absent("k", "second", 60).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn keys_matching_filters_by_prefix() {
        let store = MemoryStore::new();
        store.set_with_ttl("short:a", "1", 60).await.unwrap();
        store.set_with_ttl("short:b", "2", 60).await.unwrap();
        store.set_with_ttl("url:https://x", "a", 60).await.unwrap();

        let mut keys = store.keys_matching("short:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["short:a", "short:b"]);
    }

    #[tokio::test]
    async fn huge_ttl_does_not_overflow() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", "v", u64::MAX).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(!store.set_with_ttl_if_absent("k", "v2", u64::MAX).await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = MemoryStore::new();
        store.set_with_ttl("k", "v", 1).await.unwrap();
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.keys_matching("k").await.unwrap().is_empty());
        // An expired key may be claimed again.
        assert!(store.set_with_ttl_if_absent("k", "v2", 60).await.unwrap());
    }
}
