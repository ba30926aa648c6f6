//! Fetch-with-cache-fallback reconciliation of the tracked item list.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, CacheStorage};
use crate::catalog::{Fetcher, PlaceholderReason, Record, RecordOrigin, TrackedItem};
use crate::connectivity::OnlineSignal;
use crate::error::RemoteError;

/// One record of a pass, with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
  pub record: Record,
  pub origin: RecordOrigin,
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
  /// Exactly one entry per tracked item, in input order
  pub entries: Vec<Reconciled>,
  /// Whether any entry was served from the cache
  pub any_from_cache: bool,
}

impl ReconcileOutcome {
  fn push(&mut self, record: Record, origin: RecordOrigin) {
    if origin == RecordOrigin::Cache {
      self.any_from_cache = true;
    }
    self.entries.push(Reconciled { record, origin });
  }
}

/// Decides per item between the network and the cache.
///
/// Items are handled strictly one after another; nothing for item N+1
/// starts before item N (including its cache fallback) is finished.
pub struct Reconciler<F, S: CacheStorage, C> {
  fetcher: F,
  cache: CacheLayer<S>,
  connectivity: C,
  web_url: String,
  fetch_timeout: Duration,
}

impl<F, S, C> Reconciler<F, S, C>
where
  F: Fetcher,
  S: CacheStorage,
  C: OnlineSignal,
{
  pub fn new(
    fetcher: F,
    cache: CacheLayer<S>,
    connectivity: C,
    web_url: impl Into<String>,
    fetch_timeout: Duration,
  ) -> Self {
    Self {
      fetcher,
      cache,
      connectivity,
      web_url: web_url.into(),
      fetch_timeout,
    }
  }

  #[cfg(test)]
  pub fn cache(&self) -> &CacheLayer<S> {
    &self.cache
  }

  /// Run one full pass over `items`. Never fails.
  pub async fn reconcile(&self, items: &[TrackedItem]) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for item in items {
      let (record, origin) = self.reconcile_item(item).await;
      debug!(item = %item, ?origin, "reconciled");
      outcome.push(record, origin);
    }

    let from_network = outcome
      .entries
      .iter()
      .filter(|e| e.origin == RecordOrigin::Network)
      .count();
    info!(
      items = items.len(),
      from_network,
      any_from_cache = outcome.any_from_cache,
      "reconciliation pass finished"
    );

    outcome
  }

  async fn reconcile_item(&self, item: &TrackedItem) -> (Record, RecordOrigin) {
    // Connectivity can change mid-pass, so it is read per item
    if !self.connectivity.is_online() {
      return self.from_cache(item, PlaceholderReason::Offline).await;
    }

    match self.fetch(item).await {
      Ok(record) => {
        if !self.cache.set(&item.key(), &record).await {
          warn!(item = %item, "fetched record was not cached");
        }
        (record, RecordOrigin::Network)
      }
      Err(e) => {
        warn!(item = %item, error = %e, "fetch failed, falling back to cache");
        self.from_cache(item, PlaceholderReason::FetchFailed).await
      }
    }
  }

  async fn fetch(&self, item: &TrackedItem) -> Result<Record, RemoteError> {
    tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(item))
      .await
      .unwrap_or(Err(RemoteError::Timeout(self.fetch_timeout)))
  }

  async fn from_cache(
    &self,
    item: &TrackedItem,
    miss: PlaceholderReason,
  ) -> (Record, RecordOrigin) {
    match self.cache.get::<Record>(&item.key()).await {
      Some(cached) => {
        debug!(item = %item, cached_at = %cached.cached_at, "serving cached record");
        (cached.entity, RecordOrigin::Cache)
      }
      None => (
        Record::placeholder(item, &self.web_url, miss),
        RecordOrigin::Placeholder(miss),
      ),
    }
  }
}
