//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::traits::{CachedEntity, Cacheable};
use crate::error::CacheError;

/// Trait for cache storage backends.
///
/// Keys are opaque strings; values of different entity types never collide.
pub trait CacheStorage: Send + Sync + 'static {
  /// Get a single entity by key.
  fn get_entity<T: Cacheable>(&self, key: &str) -> Result<Option<CachedEntity<T>>, CacheError>;

  /// Store a single entity, replacing any previous value.
  fn store_entity<T: Cacheable>(&self, key: &str, entity: &T) -> Result<(), CacheError>;

  /// Remove an entity. Returns whether anything was removed.
  fn remove_entity<T: Cacheable>(&self, key: &str) -> Result<bool, CacheError>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get_entity<T: Cacheable>(&self, _key: &str) -> Result<Option<CachedEntity<T>>, CacheError> {
    Ok(None) // Always miss
  }

  fn store_entity<T: Cacheable>(&self, _key: &str, _entity: &T) -> Result<(), CacheError> {
    Ok(()) // Discard
  }

  fn remove_entity<T: Cacheable>(&self, _key: &str) -> Result<bool, CacheError> {
    Ok(false)
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open or create the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self, CacheError> {
    let open_error = |reason: String| CacheError::Open {
      path: path.display().to_string(),
      reason,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| open_error(e.to_string()))?;
    }

    let conn = Connection::open(path).map_err(|e| open_error(e.to_string()))?;
    Self::with_connection(conn)
  }

  /// Create a throwaway in-memory cache.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self, CacheError> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self, CacheError> {
    conn.execute_batch(CACHE_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
    self.conn.lock().map_err(|_| CacheError::LockPoisoned)
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Last-known-good entities (stores serialized JSON)
CREATE TABLE IF NOT EXISTS record_cache (
    entity_type TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (entity_type, entity_key)
);
"#;

impl CacheStorage for SqliteStorage {
  fn get_entity<T: Cacheable>(&self, key: &str) -> Result<Option<CachedEntity<T>>, CacheError> {
    let conn = self.conn()?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, cached_at FROM record_cache
         WHERE entity_type = ? AND entity_key = ?",
        params![T::entity_type(), key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    match row {
      Some((data, cached_at_str)) => {
        let entity: T = serde_json::from_slice(&data).map_err(|source| CacheError::Corrupt {
          key: key.to_string(),
          source,
        })?;
        // An unreadable timestamp should not cost us the entity itself
        let cached_at = parse_datetime(&cached_at_str).unwrap_or_else(Utc::now);
        Ok(Some(CachedEntity { entity, cached_at }))
      }
      None => Ok(None),
    }
  }

  fn store_entity<T: Cacheable>(&self, key: &str, entity: &T) -> Result<(), CacheError> {
    let data = serde_json::to_vec(entity).map_err(CacheError::Serialize)?;
    let conn = self.conn()?;

    conn.execute(
      "INSERT OR REPLACE INTO record_cache (entity_type, entity_key, data, cached_at)
       VALUES (?, ?, ?, datetime('now'))",
      params![T::entity_type(), key, data],
    )?;

    Ok(())
  }

  fn remove_entity<T: Cacheable>(&self, key: &str) -> Result<bool, CacheError> {
    let conn = self.conn()?;
    let removed = conn.execute(
      "DELETE FROM record_cache WHERE entity_type = ? AND entity_key = ?",
      params![T::entity_type(), key],
    )?;
    Ok(removed > 0)
  }
}

/// Storage picked at startup: SQLite normally, no-op when disabled or broken.
pub enum AnyStorage {
  Sqlite(SqliteStorage),
  Noop(NoopStorage),
}

impl CacheStorage for AnyStorage {
  fn get_entity<T: Cacheable>(&self, key: &str) -> Result<Option<CachedEntity<T>>, CacheError> {
    match self {
      AnyStorage::Sqlite(s) => s.get_entity(key),
      AnyStorage::Noop(s) => s.get_entity(key),
    }
  }

  fn store_entity<T: Cacheable>(&self, key: &str, entity: &T) -> Result<(), CacheError> {
    match self {
      AnyStorage::Sqlite(s) => s.store_entity(key, entity),
      AnyStorage::Noop(s) => s.store_entity(key, entity),
    }
  }

  fn remove_entity<T: Cacheable>(&self, key: &str) -> Result<bool, CacheError> {
    match self {
      AnyStorage::Sqlite(s) => s.remove_entity::<T>(key),
      AnyStorage::Noop(s) => s.remove_entity::<T>(key),
    }
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .ok()
}
