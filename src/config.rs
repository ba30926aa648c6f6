use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::TrackedItem;

/// Repositories shown when the config file does not list any
const DEFAULT_ITEMS: &[(&str, &str)] = &[
  ("opendatakerala", "lsg-kerala-data"),
  ("geohacker", "kerala"),
  ("osmkerala", "District-Maps-Panchayathwise"),
  ("rameshvoltella", "KeralaAICameraTracker"),
  ("karthik324", "Kerala-schools-api"),
  ("opendatakerala", "map.opendatakerala.org"),
  ("osmkerala", "kerala-wards-2024"),
  ("SwathanthraMalayalamComputing", "SMC-fonts"),
  ("opendatakerala", "civil_registrations"),
  ("pucardotorg", "kerala-configs"),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Custom title for header
  pub title: Option<String>,
  /// Tracked repositories, as "namespace/name"
  pub items: Vec<TrackedItem>,
  /// REST API base used for record fetches
  pub api_url: String,
  /// Web base used to derive homepage links
  pub web_url: String,
  /// Cheap endpoint used for connectivity probes
  pub probe_url: String,
  pub probe_interval_secs: u64,
  /// Upper bound on a single connectivity probe
  pub probe_timeout_secs: u64,
  pub fetch_timeout_secs: u64,
  /// Override for the cache database location
  pub cache_path: Option<PathBuf>,
  /// Override for the log file directory
  pub log_dir: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      title: None,
      items: DEFAULT_ITEMS
        .iter()
        .map(|(namespace, name)| TrackedItem::new(*namespace, *name))
        .collect(),
      api_url: "https://api.github.com".to_string(),
      web_url: "https://github.com".to_string(),
      probe_url: "https://api.github.com/zen".to_string(),
      probe_interval_secs: 30,
      probe_timeout_secs: 10,
      fetch_timeout_secs: 15,
      cache_path: None,
      log_dir: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./fosshub.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/fosshub/config.yaml
  ///
  /// Having no config file at all is fine; defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };
    config.validate()?;

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("fosshub.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("fosshub").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    for (key, value) in [
      ("api_url", &self.api_url),
      ("web_url", &self.web_url),
      ("probe_url", &self.probe_url),
    ] {
      url::Url::parse(value).map_err(|e| eyre!("Invalid {} '{}': {}", key, value, e))?;
    }

    if self.probe_interval_secs == 0 {
      return Err(eyre!("probe_interval_secs must be greater than zero"));
    }
    if self.probe_timeout_secs == 0 {
      return Err(eyre!("probe_timeout_secs must be greater than zero"));
    }
    if self.fetch_timeout_secs == 0 {
      return Err(eyre!("fetch_timeout_secs must be greater than zero"));
    }

    Ok(())
  }

  pub fn probe_interval(&self) -> Duration {
    Duration::from_secs(self.probe_interval_secs)
  }

  pub fn probe_timeout(&self) -> Duration {
    Duration::from_secs(self.probe_timeout_secs)
  }

  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs)
  }

  /// Directory for the cache database and log file.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("fosshub"))
  }

  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache_path {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("cache.db")),
    }
  }

  pub fn log_dir(&self) -> Result<PathBuf> {
    match &self.log_dir {
      Some(p) => Ok(p.clone()),
      None => Self::data_dir(),
    }
  }

  /// Get the GitHub token from environment variables.
  ///
  /// Checks FOSSHUB_GITHUB_TOKEN first, then GITHUB_TOKEN. No token is a
  /// valid setup, only with lower rate limits.
  pub fn get_api_token() -> Option<String> {
    ["FOSSHUB_GITHUB_TOKEN", "GITHUB_TOKEN"]
      .iter()
      .filter_map(|var| std::env::var(var).ok())
      .map(|token| token.trim().to_string())
      .find(|token| !token.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_track_ten_items() {
    let config = Config::default();
    assert_eq!(config.items.len(), 10);
    assert_eq!(config.items[1], TrackedItem::new("geohacker", "kerala"));
    assert_eq!(config.probe_interval(), Duration::from_secs(30));
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_yaml_keeps_defaults() {
    let config = Config::from_yaml(
      r#"
title: My Hub
items:
  - rust-lang/rust
  - tokio-rs/tokio
fetch_timeout_secs: 5
"#,
    )
    .unwrap();

    assert_eq!(config.title.as_deref(), Some("My Hub"));
    assert_eq!(
      config.items,
      vec![
        TrackedItem::new("rust-lang", "rust"),
        TrackedItem::new("tokio-rs", "tokio")
      ]
    );
    assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
    assert_eq!(config.api_url, "https://api.github.com");
  }

  #[test]
  fn test_malformed_item_is_rejected() {
    assert!(Config::from_yaml("items: [\"no-slash\"]").is_err());
  }

  #[test]
  fn test_invalid_url_fails_validation() {
    let config = Config {
      probe_url: "not a url".to_string(),
      ..Config::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_probe_timeout_default_and_validation() {
    assert_eq!(Config::default().probe_timeout(), Duration::from_secs(10));

    let config = Config::from_yaml("probe_timeout_secs: 0").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let result = Config::load(Some(Path::new("/nonexistent/fosshub.yaml")));
    assert!(result.is_err());
  }

  #[test]
  fn test_load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fosshub.yaml");
    std::fs::write(&path, "items: [\"a/b\"]\nprobe_interval_secs: 10\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.items, vec![TrackedItem::new("a", "b")]);
    assert_eq!(config.probe_interval_secs, 10);
  }
}
