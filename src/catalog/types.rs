use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// License shown when the upstream repository declares none
pub const LICENSE_UNKNOWN: &str = "Unknown";

/// License shown on placeholder records
pub const LICENSE_UNAVAILABLE: &str = "N/A";

/// A statically configured repository, identified by `namespace/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct TrackedItem {
  pub namespace: String,
  pub name: String,
}

impl TrackedItem {
  pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      namespace: namespace.into(),
      name: name.into(),
    }
  }

  /// Composite key used for cache entries
  pub fn key(&self) -> String {
    format!("{}/{}", self.namespace, self.name)
  }

  /// Web page for this item, derivable without any fetched data
  pub fn homepage_url(&self, web_base: &str) -> String {
    format!(
      "{}/{}/{}",
      web_base.trim_end_matches('/'),
      self.namespace,
      self.name
    )
  }
}

impl fmt::Display for TrackedItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.namespace, self.name)
  }
}

impl FromStr for TrackedItem {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (namespace, name) = s
      .trim()
      .split_once('/')
      .ok_or_else(|| format!("expected namespace/name, got '{}'", s))?;

    if namespace.is_empty() || name.is_empty() || name.contains('/') {
      return Err(format!("expected namespace/name, got '{}'", s));
    }

    Ok(Self::new(namespace, name))
  }
}

impl TryFrom<String> for TrackedItem {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

/// Popularity count, or the "unavailable" sentinel
///
/// Stored in the cache as a nullable integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Popularity {
  Count(u64),
  #[default]
  Unavailable,
}

impl From<Option<u64>> for Popularity {
  fn from(value: Option<u64>) -> Self {
    match value {
      Some(n) => Popularity::Count(n),
      None => Popularity::Unavailable,
    }
  }
}

impl From<Popularity> for Option<u64> {
  fn from(value: Popularity) -> Self {
    match value {
      Popularity::Count(n) => Some(n),
      Popularity::Unavailable => None,
    }
  }
}

impl fmt::Display for Popularity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Popularity::Count(n) => write!(f, "{}", n),
      Popularity::Unavailable => f.write_str("N/A"),
    }
  }
}

/// Display-ready projection of one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  pub identifier: String,
  pub description: Option<String>,
  pub popularity: Popularity,
  pub license: String,
  pub last_updated: Option<DateTime<Utc>>,
  pub homepage_url: String,
  #[serde(default)]
  pub avatar_url: String,
}

impl Record {
  /// Synthesized record for an item with neither network nor cached data
  pub fn placeholder(item: &TrackedItem, web_base: &str, reason: PlaceholderReason) -> Self {
    Self {
      identifier: item.key(),
      description: Some(reason.message().to_string()),
      popularity: Popularity::Unavailable,
      license: LICENSE_UNAVAILABLE.to_string(),
      last_updated: None,
      homepage_url: item.homepage_url(web_base),
      avatar_url: String::new(),
    }
  }
}

/// Why a placeholder had to be synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
  /// Offline, and nothing cached
  Offline,
  /// The fetch failed, and nothing cached
  FetchFailed,
}

impl PlaceholderReason {
  pub fn message(&self) -> &'static str {
    match self {
      PlaceholderReason::Offline => "No network and no cached data available",
      PlaceholderReason::FetchFailed => "Could not fetch (rate limit or offline); no cache.",
    }
  }
}

/// Where a record in a reconciliation pass came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
  Network,
  Cache,
  Placeholder(PlaceholderReason),
}

impl RecordOrigin {
  pub fn is_placeholder(&self) -> bool {
    matches!(self, RecordOrigin::Placeholder(_))
  }

  pub fn label(&self) -> &'static str {
    match self {
      RecordOrigin::Network => "network",
      RecordOrigin::Cache => "cache",
      RecordOrigin::Placeholder(_) => "placeholder",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_tracked_item() {
    let item: TrackedItem = "geohacker/kerala".parse().unwrap();
    assert_eq!(item, TrackedItem::new("geohacker", "kerala"));
    assert_eq!(item.key(), "geohacker/kerala");
  }

  #[test]
  fn test_parse_tracked_item_rejects_malformed() {
    assert!("kerala".parse::<TrackedItem>().is_err());
    assert!("/kerala".parse::<TrackedItem>().is_err());
    assert!("geohacker/".parse::<TrackedItem>().is_err());
    assert!("a/b/c".parse::<TrackedItem>().is_err());
  }

  #[test]
  fn test_homepage_url_ignores_trailing_slash() {
    let item = TrackedItem::new("a", "b");
    assert_eq!(item.homepage_url("https://github.com/"), "https://github.com/a/b");
    assert_eq!(item.homepage_url("https://github.com"), "https://github.com/a/b");
  }

  #[test]
  fn test_placeholder_uses_sentinels() {
    let item = TrackedItem::new("a", "b");
    let record = Record::placeholder(&item, "https://github.com", PlaceholderReason::Offline);

    assert_eq!(record.identifier, "a/b");
    assert_eq!(record.license, "N/A");
    assert_eq!(record.popularity.to_string(), "N/A");
    assert_eq!(record.homepage_url, "https://github.com/a/b");
    assert_eq!(
      record.description.as_deref(),
      Some("No network and no cached data available")
    );
  }

  #[test]
  fn test_popularity_serializes_as_nullable_integer() {
    assert_eq!(serde_json::to_string(&Popularity::Count(10)).unwrap(), "10");
    assert_eq!(serde_json::to_string(&Popularity::Unavailable).unwrap(), "null");
    let parsed: Popularity = serde_json::from_str("null").unwrap();
    assert_eq!(parsed, Popularity::Unavailable);
  }
}
