//! Typed errors for the fetch and cache seams.
//!
//! Both are recovered inside a reconciliation pass and never reach `main`.
//! Application-level failures use `color_eyre::Result` instead.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a record from the remote source
#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("request to {url} failed: {source}")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} returned {status}")]
  Status { url: String, status: StatusCode },

  #[error("rate limited by {url}")]
  RateLimited { url: String },

  #[error("failed to decode response from {url}: {source}")]
  Decode {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("no response within {0:?}")]
  Timeout(Duration),
}

/// Failure of the local storage backend
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("failed to open cache at {path}: {reason}")]
  Open { path: String, reason: String },

  #[error("sqlite: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("failed to serialize cache entry: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("corrupt cache entry {key}: {source}")]
  Corrupt {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("cache lock poisoned")]
  LockPoisoned,

  #[error("cache worker failed: {0}")]
  Worker(#[from] tokio::task::JoinError),
}
