//! Link service behavior, driven over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chopurl::codegen::{self, CodeStrategy};
use chopurl::error::{LinkError, StoreError};
use chopurl::service::LinkService;
use chopurl::store::{LinkStore, MemoryStore};

const BASE_URL: &str = "http://localhost:8000";

/// Store double for an unreachable backend: every call fails the way the
/// redis client does when the connection is gone.
struct DownStore;

impl DownStore {
    fn error() -> StoreError {
        StoreError::Unavailable(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )))
    }
}

#[async_trait]
impl LinkStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(Self::error())
    }

    async fn set_with_ttl(
        &self,
        _key: &str,
        _value: &str,
        _ttl_secs: u64,
    ) -> Result<(), StoreError> {
        Err(Self::error())
    }

    async fn set_with_ttl_if_absent(
        &self,
        _key: &str,
        _value: &str,
        _ttl_secs: u64,
    ) -> Result<bool, StoreError> {
        Err(Self::error())
    }

    async fn delete(&self, _keys: &[String]) -> Result<(), StoreError> {
        Err(Self::error())
    }

    async fn keys_matching(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(Self::error())
    }
}

fn service() -> LinkService {
    LinkService::new(
        Arc::new(MemoryStore::new()),
        BASE_URL,
        6,
        3600,
        CodeStrategy::Random,
    )
}

fn code_of(short_url: &str) -> String {
    short_url.rsplit('/').next().unwrap().to_owned()
}

#[tokio::test]
async fn create_then_resolve_returns_original_url() {
    let svc = service();
    let url = "https://example.com/a?q=1&r=%20x";

    let short_url = svc.create(url, None).await.unwrap();
    let resolved = svc.resolve(&code_of(&short_url)).await.unwrap();

    assert_eq!(resolved, url);
}

#[tokio::test]
async fn short_url_shape() {
    let svc = service();
    let short_url = svc.create("https://example.com/a", None).await.unwrap();
    let code = code_of(&short_url);

    assert_eq!(short_url, format!("{BASE_URL}/{code}"));
    assert_eq!(code.len(), 6);
    assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn creating_same_url_twice_is_idempotent() {
    let svc = service();
    let url = "https://example.com/dup";

    let first = svc.create(url, None).await.unwrap();
    let code = code_of(&first);

    // Touch the record so we can tell whether the second create resets it.
    svc.resolve(&code).await.unwrap();
    let before = svc.stats(&code).await.unwrap();

    let second = svc.create(url, None).await.unwrap();
    assert_eq!(first, second);

    let after = svc.stats(&code).await.unwrap();
    assert_eq!(after.clicks, before.clicks);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn duplicate_custom_code_is_rejected() {
    let svc = service();
    svc.create("https://example.com/1", Some("promo"))
        .await
        .unwrap();

    let err = svc
        .create("https://example.com/2", Some("promo"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkError::DuplicateCode(code) if code == "promo"));
}

#[tokio::test]
async fn custom_codes_are_exempt_from_dedup() {
    let svc = service();
    let url = "https://example.com/custom";

    let custom = svc.create(url, Some("my-custom-code")).await.unwrap();
    assert_eq!(custom, format!("{BASE_URL}/my-custom-code"));

    // No reverse-lookup entry was written, so a plain create must not find
    // the custom-coded link.
    let auto = svc.create(url, None).await.unwrap();
    assert_ne!(auto, custom);
}

#[tokio::test]
async fn unknown_codes_are_not_found() {
    let svc = service();

    assert!(matches!(
        svc.resolve("nosuch").await.unwrap_err(),
        LinkError::NotFound
    ));
    assert!(matches!(
        svc.stats("nosuch").await.unwrap_err(),
        LinkError::NotFound
    ));
    assert!(!svc.delete("nosuch").await);
}

#[tokio::test]
async fn sequential_resolutions_count_clicks_exactly() {
    let svc = service();
    let short_url = svc.create("https://example.com/n", None).await.unwrap();
    let code = code_of(&short_url);

    assert_eq!(svc.stats(&code).await.unwrap().clicks, 0);
    for _ in 0..5 {
        svc.resolve(&code).await.unwrap();
    }
    assert_eq!(svc.stats(&code).await.unwrap().clicks, 5);
}

#[tokio::test]
async fn stats_does_not_count_a_click() {
    let svc = service();
    let short_url = svc.create("https://example.com/s", None).await.unwrap();
    let code = code_of(&short_url);

    svc.stats(&code).await.unwrap();
    svc.stats(&code).await.unwrap();
    assert_eq!(svc.stats(&code).await.unwrap().clicks, 0);
}

#[tokio::test]
async fn list_paginates_newest_first() {
    let svc = service();
    for i in 0..20 {
        svc.create(&format!("https://example.com/page/{i}"), None)
            .await
            .unwrap();
        // Keep created_at strictly increasing at microsecond precision.
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let first = svc.list(0, 15).await;
    assert_eq!(first.len(), 15);
    assert_eq!(first[0].original_url, "https://example.com/page/19");
    assert!(first
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    let second = svc.list(15, 15).await;
    assert_eq!(second.len(), 5);
    assert_eq!(second[4].original_url, "https://example.com/page/0");

    assert!(svc.list(40, 15).await.is_empty());
}

#[tokio::test]
async fn list_summaries_carry_full_projection() {
    let svc = service();
    let short_url = svc.create("https://example.com/one", None).await.unwrap();

    let links = svc.list(0, 15).await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].short_url, short_url);
    assert_eq!(links[0].short_code, code_of(&short_url));
    assert_eq!(links[0].original_url, "https://example.com/one");
    assert_eq!(links[0].clicks, 0);
    assert!(!links[0].created_at.is_empty());
}

#[tokio::test]
async fn delete_removes_record_and_reverse_entry() {
    let svc = service();
    let url = "https://example.com/del";
    let short_url = svc.create(url, None).await.unwrap();
    let code = code_of(&short_url);

    assert!(svc.delete(&code).await);
    assert!(matches!(
        svc.resolve(&code).await.unwrap_err(),
        LinkError::NotFound
    ));
    // Deleting again fails: the record is gone.
    assert!(!svc.delete(&code).await);

    // The reverse-lookup entry went with it, so the URL can be shortened
    // afresh instead of resolving to the dead code.
    let fresh = svc.create(url, None).await.unwrap();
    svc.resolve(&code_of(&fresh)).await.unwrap();
}

#[tokio::test]
async fn clear_all_empties_the_store() {
    let svc = service();
    for i in 0..5 {
        svc.create(&format!("https://example.com/bulk/{i}"), None)
            .await
            .unwrap();
    }
    svc.create("https://example.com/bulk/custom", Some("keepme"))
        .await
        .unwrap();

    assert!(svc.clear_all().await);
    assert!(svc.list(0, 100).await.is_empty());
    assert!(matches!(
        svc.resolve("keepme").await.unwrap_err(),
        LinkError::NotFound
    ));
}

#[tokio::test]
async fn store_failure_propagates_for_reads_and_degrades_for_admin_ops() {
    let svc = LinkService::new(Arc::new(DownStore), BASE_URL, 6, 3600, CodeStrategy::Random);

    // create/resolve/stats surface the failure to the caller.
    assert!(matches!(
        svc.create("https://example.com/x", None).await.unwrap_err(),
        LinkError::Store(_)
    ));
    assert!(matches!(
        svc.create("https://example.com/x", Some("promo"))
            .await
            .unwrap_err(),
        LinkError::Store(_)
    ));
    assert!(matches!(
        svc.resolve("abc123").await.unwrap_err(),
        LinkError::Store(_)
    ));
    assert!(matches!(
        svc.stats("abc123").await.unwrap_err(),
        LinkError::Store(_)
    ));

    // list/delete/clear swallow it and degrade.
    assert!(svc.list(0, 15).await.is_empty());
    assert!(!svc.delete("abc123").await);
    assert!(!svc.clear_all().await);
}

#[tokio::test]
async fn hash_strategy_maps_a_url_to_its_deterministic_code() {
    let svc = LinkService::new(
        Arc::new(MemoryStore::new()),
        BASE_URL,
        6,
        3600,
        CodeStrategy::Hash,
    );
    let url = "https://example.com/hashed";

    let short_url = svc.create(url, None).await.unwrap();
    assert_eq!(code_of(&short_url), codegen::generate_deterministic(url, 6));
}
