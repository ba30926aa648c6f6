//! Wiring of fetcher, cache and connectivity monitor from configuration.

use color_eyre::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{AnyStorage, CacheLayer, NoopStorage, SqliteStorage};
use crate::catalog::client::build_http_client;
use crate::catalog::GitHubClient;
use crate::config::Config;
use crate::connectivity::{
  watch_link, ConnectivityHandle, ConnectivityMonitor, HttpProbe, SystemLink, LINK_POLL_INTERVAL,
};
use crate::reconcile::Reconciler;

pub type HubReconciler = Reconciler<GitHubClient, AnyStorage, ConnectivityHandle>;

/// Long-lived components shared by the TUI and `--once` mode
pub struct Services {
  pub reconciler: Arc<HubReconciler>,
  pub monitor: ConnectivityMonitor,
}

impl Services {
  /// Must be called from within the tokio runtime.
  pub fn start(config: &Config, use_cache: bool) -> Result<Self> {
    let token = Config::get_api_token();
    let client = GitHubClient::new(config, token.clone())?;
    if !client.is_authenticated() {
      info!("no GitHub token configured, using unauthenticated rate limits");
    }

    let probe = HttpProbe::new(build_http_client()?, config.probe_url.clone(), token);
    let (link_up, link_events) = watch_link(SystemLink, LINK_POLL_INTERVAL);
    let monitor = ConnectivityMonitor::spawn(
      probe,
      link_up,
      link_events,
      config.probe_interval(),
      config.probe_timeout(),
    );

    let reconciler = Reconciler::new(
      client,
      CacheLayer::new(open_storage(config, use_cache)),
      monitor.handle(),
      config.web_url.clone(),
      config.fetch_timeout(),
    );

    Ok(Self {
      reconciler: Arc::new(reconciler),
      monitor,
    })
  }
}

/// Open the cache database, degrading to no caching if that fails.
pub fn open_storage(config: &Config, use_cache: bool) -> AnyStorage {
  if !use_cache {
    info!("cache disabled");
    return AnyStorage::Noop(NoopStorage);
  }

  let path = match config.cache_path() {
    Ok(path) => path,
    Err(e) => {
      warn!(error = %e, "no cache location, continuing without cache");
      return AnyStorage::Noop(NoopStorage);
    }
  };

  match SqliteStorage::open(&path) {
    Ok(storage) => {
      info!(path = %path.display(), "cache opened");
      AnyStorage::Sqlite(storage)
    }
    Err(e) => {
      warn!(error = %e, "cache unavailable, continuing without cache");
      AnyStorage::Noop(NoopStorage)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{PlaceholderReason, Record, TrackedItem};

  #[test]
  fn test_disabled_cache_is_noop() {
    assert!(matches!(
      open_storage(&Config::default(), false),
      AnyStorage::Noop(_)
    ));
  }

  #[test]
  fn test_unopenable_cache_degrades_to_noop() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the database file should be
    let config = Config {
      cache_path: Some(dir.path().to_path_buf()),
      ..Config::default()
    };
    assert!(matches!(open_storage(&config, true), AnyStorage::Noop(_)));
  }

  #[tokio::test]
  async fn test_configured_cache_path_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let config = Config {
      cache_path: Some(path.clone()),
      ..Config::default()
    };

    let item = TrackedItem::new("a", "b");
    let record = Record::placeholder(&item, &config.web_url, PlaceholderReason::Offline);
    let cache = CacheLayer::new(open_storage(&config, true));
    assert!(cache.set(&item.key(), &record).await);
    assert!(path.exists());
  }
}
