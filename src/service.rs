use std::sync::Arc;

use chrono::Utc;

use crate::{
    codegen::{self, CodeStrategy},
    error::{LinkError, StoreError},
    models::{LinkRecord, LinkStats, LinkSummary},
    store::{LinkStore, SHORT_PREFIX, URL_PREFIX},
};

/// The sole mutator of link records and reverse-lookup entries.
///
/// All operations go through the injected [`LinkStore`]. Create/resolve/stats
/// surface store failures to the caller; list/delete/clear degrade to an
/// empty result or `false` and log instead.
#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    base_url: String,
    code_length: usize,
    ttl_secs: u64,
    strategy: CodeStrategy,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn LinkStore>,
        base_url: impl Into<String>,
        code_length: usize,
        ttl_secs: u64,
        strategy: CodeStrategy,
    ) -> Self {
        Self {
            store,
            base_url: base_url.into(),
            code_length,
            ttl_secs,
            strategy,
        }
    }

    fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    fn record_key(code: &str) -> String {
        format!("{SHORT_PREFIX}{code}")
    }

    fn reverse_key(original_url: &str) -> String {
        format!("{URL_PREFIX}{original_url}")
    }

    fn new_record(original_url: &str) -> LinkRecord {
        LinkRecord {
            original_url: original_url.to_owned(),
            created_at: Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            clicks: 0,
        }
    }

    /// Shorten `original_url`, returning the fully-qualified short URL.
    ///
    /// With a custom code: fails with [`LinkError::DuplicateCode`] when the
    /// code is taken (atomic check-and-set, so racing creates cannot both
    /// win), and writes no reverse-lookup entry — custom codes are exempt
    /// from deduplication.
    ///
    /// Without one: an existing reverse-lookup entry short-circuits to the
    /// prior short URL, leaving `created_at` and `clicks` untouched.
    /// Otherwise a code is generated and the record plus reverse entry are
    /// written with matching TTLs.
    pub async fn create(
        &self,
        original_url: &str,
        custom_code: Option<&str>,
    ) -> Result<String, LinkError> {
        if let Some(code) = custom_code {
            let record = serde_json::to_string(&Self::new_record(original_url))
                .map_err(StoreError::Corrupt)?;
            let claimed = self
                .store
                .set_with_ttl_if_absent(&Self::record_key(code), &record, self.ttl_secs)
                .await?;
            if !claimed {
                return Err(LinkError::DuplicateCode(code.to_owned()));
            }
            return Ok(self.short_url(code));
        }

        if let Some(existing) = self.store.get(&Self::reverse_key(original_url)).await? {
            return Ok(self.short_url(&existing));
        }

        let code = match self.strategy {
            CodeStrategy::Random => codegen::generate_random(self.code_length),
            CodeStrategy::Hash => codegen::generate_deterministic(original_url, self.code_length),
        };

        let record = serde_json::to_string(&Self::new_record(original_url))
            .map_err(StoreError::Corrupt)?;
        self.store
            .set_with_ttl(&Self::record_key(&code), &record, self.ttl_secs)
            .await?;
        self.store
            .set_with_ttl(&Self::reverse_key(original_url), &code, self.ttl_secs)
            .await?;

        Ok(self.short_url(&code))
    }

    /// Resolve a short code to its original URL, counting the click and
    /// refreshing the record's TTL.
    ///
    /// The increment is read-modify-write: concurrent resolutions of the
    /// same code may under-count. Sequential resolutions count exactly.
    pub async fn resolve(&self, short_code: &str) -> Result<String, LinkError> {
        let key = Self::record_key(short_code);
        let raw = self.store.get(&key).await?.ok_or(LinkError::NotFound)?;

        let mut record: LinkRecord = serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;
        record.clicks += 1;

        let updated = serde_json::to_string(&record).map_err(StoreError::Corrupt)?;
        self.store.set_with_ttl(&key, &updated, self.ttl_secs).await?;

        Ok(record.original_url)
    }

    /// Read-only view of one record; does not touch `clicks` or the TTL.
    pub async fn stats(&self, short_code: &str) -> Result<LinkStats, LinkError> {
        let raw = self
            .store
            .get(&Self::record_key(short_code))
            .await?
            .ok_or(LinkError::NotFound)?;
        let record: LinkRecord = serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;

        Ok(LinkStats {
            short_code: short_code.to_owned(),
            original_url: record.original_url,
            clicks: record.clicks,
            created_at: record.created_at,
        })
    }

    /// All links, newest first, paginated as `[skip, skip + limit)`.
    ///
    /// A store failure yields an empty list, never an error; the failure is
    /// logged. Out-of-range `skip` yields an empty list too.
    pub async fn list(&self, skip: usize, limit: usize) -> Vec<LinkSummary> {
        let mut links = match self.collect_all().await {
            Ok(links) => links,
            Err(e) => {
                tracing::error!("failed to list links: {e:?}");
                return Vec::new();
            }
        };

        // created_at strings are zero-padded UTC timestamps, so the
        // lexicographic order is the chronological order.
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        links.into_iter().skip(skip).take(limit).collect()
    }

    async fn collect_all(&self) -> Result<Vec<LinkSummary>, StoreError> {
        let keys = self.store.keys_matching(SHORT_PREFIX).await?;
        let mut links = Vec::with_capacity(keys.len());

        for key in keys {
            // A key can expire between the scan and the fetch; skip it.
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            let record: LinkRecord = serde_json::from_str(&raw)?;
            let short_code = key.trim_start_matches(SHORT_PREFIX).to_owned();

            links.push(LinkSummary {
                short_url: self.short_url(&short_code),
                short_code,
                original_url: record.original_url,
                clicks: record.clicks,
                created_at: record.created_at,
            });
        }

        Ok(links)
    }

    /// Delete one link and its reverse-lookup entry (best-effort; the
    /// reverse entry is removed by URL without verifying it pointed back at
    /// this code). Returns `false` for unknown codes and on store failure.
    pub async fn delete(&self, short_code: &str) -> bool {
        match self.try_delete(short_code).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!("failed to delete link '{short_code}': {e:?}");
                false
            }
        }
    }

    async fn try_delete(&self, short_code: &str) -> Result<bool, StoreError> {
        let key = Self::record_key(short_code);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(false);
        };
        let record: LinkRecord = serde_json::from_str(&raw)?;

        self.store
            .delete(&[key, Self::reverse_key(&record.original_url)])
            .await?;
        Ok(true)
    }

    /// Bulk-delete every link record and reverse-lookup entry. Returns
    /// `false` on store failure; a partial deletion is not rolled back.
    pub async fn clear_all(&self) -> bool {
        match self.try_clear_all().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to clear links: {e:?}");
                false
            }
        }
    }

    async fn try_clear_all(&self) -> Result<(), StoreError> {
        let record_keys = self.store.keys_matching(SHORT_PREFIX).await?;
        let reverse_keys = self.store.keys_matching(URL_PREFIX).await?;

        self.store.delete(&record_keys).await?;
        self.store.delete(&reverse_keys).await?;
        Ok(())
    }
}
