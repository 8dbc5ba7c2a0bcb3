//! Read-through cache of generation records, keyed by region.
//!
//! A region is filled from upstream the first time it is requested (or once
//! it goes stale under [`RefreshPolicy::MaxAge`]) and served from the store
//! afterwards. Fills for one region are serialised through a per-region
//! lock, so concurrent misses cost one upstream call and write one set of
//! rows.

use std::{collections::HashMap, sync::Arc, time::Duration};

use energy_client::domain::GenerationRecord;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{error::EnergyError, store::GenerationStore, upstream::GenerationUpstream};

/// When cached rows for a region stop being trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// A non-empty region is served from the store forever.
    Never,
    /// A region whose oldest row is older than this is fetched again and
    /// replaced.
    MaxAge(Duration),
}

enum Lookup {
    Fresh(Vec<GenerationRecord>),
    Stale(Vec<GenerationRecord>),
    Miss,
}

pub struct CacheFill {
    store: Arc<dyn GenerationStore>,
    upstream: Arc<dyn GenerationUpstream>,
    history_window: i64,
    refresh: RefreshPolicy,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CacheFill {
    pub fn new(
        store: Arc<dyn GenerationStore>,
        upstream: Arc<dyn GenerationUpstream>,
        history_window: i64,
        refresh: RefreshPolicy,
    ) -> Self {
        Self {
            store,
            upstream,
            history_window,
            refresh,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Records for a region: cached rows (newest first, capped at the
    /// history window) on a hit, the freshly fetched upstream page in
    /// upstream order on a miss.
    pub async fn fetch_region(&self, region_code: &str) -> Result<Vec<GenerationRecord>, EnergyError> {
        if let Lookup::Fresh(rows) = self.lookup(region_code).await? {
            metrics::counter!("energy_cache_hits_total").increment(1);
            tracing::debug!(region = region_code, rows = rows.len(), "cache hit");
            return Ok(rows);
        }

        let lock = self.region_lock(region_code).await;
        let result = {
            let _guard = lock.lock().await;
            self.fill_locked(region_code).await
        };
        drop(lock);
        self.release_region_lock(region_code).await;

        result
    }

    /// Drop every cached row for a region. The next fetch goes upstream.
    pub async fn invalidate(&self, region_code: &str) -> Result<u64, EnergyError> {
        let lock = self.region_lock(region_code).await;
        let result = {
            let _guard = lock.lock().await;
            self.store.delete_region(region_code).await
        };
        drop(lock);
        self.release_region_lock(region_code).await;

        let deleted = result?;
        tracing::info!(region = region_code, deleted, "cache invalidated");
        Ok(deleted)
    }

    /// Must be called with the region's lock held.
    async fn fill_locked(&self, region_code: &str) -> Result<Vec<GenerationRecord>, EnergyError> {
        // Another request may have filled the region while we waited.
        let stale = match self.lookup(region_code).await? {
            Lookup::Fresh(rows) => {
                metrics::counter!("energy_cache_coalesced_total").increment(1);
                tracing::debug!(region = region_code, rows = rows.len(), "cache filled by concurrent request");
                return Ok(rows);
            }
            Lookup::Stale(rows) => {
                metrics::counter!("energy_cache_refreshes_total").increment(1);
                Some(rows)
            }
            Lookup::Miss => {
                metrics::counter!("energy_cache_misses_total").increment(1);
                None
            }
        };
        let replace = stale.is_some();

        let records = self.upstream.fetch_region(region_code).await?;

        let written = match stale {
            // An empty refresh page must not erase the region.
            Some(rows) if records.is_empty() => {
                metrics::counter!("energy_cache_empty_refreshes_total").increment(1);
                tracing::warn!(
                    region = region_code,
                    rows = rows.len(),
                    "upstream returned no records on refresh; keeping stale rows"
                );
                return Ok(rows);
            }
            Some(_) => self.store.replace_region(region_code, &records).await?,
            None => self.store.insert_records(&records).await?,
        };

        tracing::info!(
            region = region_code,
            records = records.len(),
            written,
            refreshed = replace,
            "cache filled from upstream"
        );

        Ok(records)
    }

    async fn lookup(&self, region_code: &str) -> Result<Lookup, EnergyError> {
        let rows = self
            .store
            .recent_for_region(region_code, self.history_window)
            .await?;
        if rows.is_empty() {
            return Ok(Lookup::Miss);
        }

        if let RefreshPolicy::MaxAge(max_age) = self.refresh {
            if let Some(oldest) = self.store.oldest_fetch(region_code).await? {
                if OffsetDateTime::now_utc() - oldest > max_age {
                    return Ok(Lookup::Stale(rows));
                }
            }
        }

        Ok(Lookup::Fresh(rows))
    }

    async fn region_lock(&self, region_code: &str) -> Arc<Mutex<()>> {
        let mut map = self.inflight.lock().await;
        Arc::clone(
            map.entry(region_code.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Forget a region's lock once nobody else holds or waits on it.
    async fn release_region_lock(&self, region_code: &str) {
        let mut map = self.inflight.lock().await;
        if map
            .get(region_code)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(region_code);
        }
    }
}
