//! Best-effort cache layer over a storage backend.

use std::sync::Arc;
use tracing::warn;

use super::storage::CacheStorage;
use super::traits::{CachedEntity, Cacheable};
use crate::error::CacheError;

/// Cache layer that never lets a storage failure escape.
///
/// Every backend error is logged and reported as a miss (reads) or as
/// `false` (writes), so callers treat an unavailable cache exactly like an
/// empty one. Storage calls run on the blocking pool since the SQLite
/// backend does file I/O under a mutex.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Look up an entity; storage errors read as absent.
  pub async fn get<T: Cacheable>(&self, key: &str) -> Option<CachedEntity<T>> {
    let storage = Arc::clone(&self.storage);
    let owned = key.to_string();

    match blocking(move || storage.get_entity::<T>(&owned)).await {
      Ok(entry) => entry,
      Err(e) => {
        warn!(key, error = %e, "cache read failed");
        None
      }
    }
  }

  /// Store an entity, returning whether it was persisted.
  pub async fn set<T: Cacheable>(&self, key: &str, entity: &T) -> bool {
    let storage = Arc::clone(&self.storage);
    let owned = key.to_string();
    let entity = entity.clone();

    match blocking(move || storage.store_entity(&owned, &entity)).await {
      Ok(()) => true,
      Err(e) => {
        warn!(key, error = %e, "cache write failed");
        false
      }
    }
  }

  /// Remove an entity, returning whether one was removed.
  pub async fn remove<T: Cacheable>(&self, key: &str) -> bool {
    let storage = Arc::clone(&self.storage);
    let owned = key.to_string();

    match blocking(move || storage.remove_entity::<T>(&owned)).await {
      Ok(removed) => removed,
      Err(e) => {
        warn!(key, error = %e, "cache remove failed");
        false
      }
    }
  }
}

async fn blocking<R, F>(f: F) -> Result<R, CacheError>
where
  F: FnOnce() -> Result<R, CacheError> + Send + 'static,
  R: Send + 'static,
{
  tokio::task::spawn_blocking(f).await?
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use super::*;

  /// Storage whose every operation fails, for exercising error paths.
  pub struct BrokenStorage;

  impl CacheStorage for BrokenStorage {
    fn get_entity<T: Cacheable>(&self, _key: &str) -> Result<Option<CachedEntity<T>>, CacheError> {
      Err(CacheError::LockPoisoned)
    }

    fn store_entity<T: Cacheable>(&self, _key: &str, _entity: &T) -> Result<(), CacheError> {
      Err(CacheError::LockPoisoned)
    }

    fn remove_entity<T: Cacheable>(&self, _key: &str) -> Result<bool, CacheError> {
      Err(CacheError::LockPoisoned)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::testing::BrokenStorage;
  use super::*;
  use crate::cache::SqliteStorage;
  use crate::catalog::{PlaceholderReason, Record, TrackedItem};
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::time::Duration;

  fn record() -> Record {
    Record::placeholder(
      &TrackedItem::new("a", "b"),
      "https://github.com",
      PlaceholderReason::Offline,
    )
  }

  #[tokio::test]
  async fn test_round_trip_through_sqlite() {
    let cache = CacheLayer::new(SqliteStorage::open_in_memory().unwrap());
    assert!(cache.set("a/b", &record()).await);

    let cached = cache.get::<Record>("a/b").await.unwrap();
    assert_eq!(cached.entity, record());
    assert!(cache.remove::<Record>("a/b").await);
    assert!(cache.get::<Record>("a/b").await.is_none());
  }

  #[tokio::test]
  async fn test_broken_storage_reads_as_miss() {
    let cache = CacheLayer::new(BrokenStorage);
    assert!(cache.get::<Record>("a/b").await.is_none());
    assert!(!cache.set("a/b", &record()).await);
    assert!(!cache.remove::<Record>("a/b").await);
  }

  #[tokio::test]
  async fn test_clones_share_storage() {
    let cache = CacheLayer::new(SqliteStorage::open_in_memory().unwrap());
    let other = cache.clone();
    cache.set("a/b", &record()).await;

    assert!(other.get::<Record>("a/b").await.is_some());
  }

  /// Removal succeeds only if another task gets to run while it is blocked
  struct GatedStorage(Arc<AtomicBool>);

  impl CacheStorage for GatedStorage {
    fn get_entity<T: Cacheable>(&self, _key: &str) -> Result<Option<CachedEntity<T>>, CacheError> {
      Ok(None)
    }

    fn store_entity<T: Cacheable>(&self, _key: &str, _entity: &T) -> Result<(), CacheError> {
      Ok(())
    }

    fn remove_entity<T: Cacheable>(&self, _key: &str) -> Result<bool, CacheError> {
      for _ in 0..200 {
        if self.0.load(Ordering::SeqCst) {
          return Ok(true);
        }
        std::thread::sleep(Duration::from_millis(10));
      }
      Ok(false)
    }
  }

  #[tokio::test]
  async fn test_storage_does_not_block_the_runtime() {
    let gate = Arc::new(AtomicBool::new(false));
    let cache = CacheLayer::new(GatedStorage(Arc::clone(&gate)));

    let opener = tokio::spawn(async move { gate.store(true, Ordering::SeqCst) });

    assert!(cache.remove::<Record>("a/b").await);
    opener.await.unwrap();
  }
}
