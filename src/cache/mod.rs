//! Persistent key-value cache for last-known-good records.
//!
//! - Entities are stored as JSON, keyed by type and an opaque string key
//! - Last write wins; there is no expiry or versioning
//! - Every failure is absorbed by [`CacheLayer`] and reads as a miss

mod layer;
mod storage;
mod traits;

#[cfg(test)]
pub(crate) use layer::testing;
pub use layer::CacheLayer;
pub use storage::{AnyStorage, CacheStorage, NoopStorage, SqliteStorage};
pub use traits::Cacheable;

use crate::catalog::Record;

impl Cacheable for Record {
  fn entity_type() -> &'static str {
    "record"
  }
}
