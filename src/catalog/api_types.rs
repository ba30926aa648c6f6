//! Serde-deserializable types matching GitHub API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::types::{Popularity, Record, TrackedItem, LICENSE_UNKNOWN};

#[derive(Debug, Deserialize)]
pub struct ApiLicense {
  pub spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiOwner {
  pub avatar_url: Option<String>,
}

/// `GET /repos/{owner}/{repo}` response, reduced to the fields we display
#[derive(Debug, Deserialize)]
pub struct ApiRepo {
  pub full_name: Option<String>,
  pub description: Option<String>,
  pub stargazers_count: Option<u64>,
  pub license: Option<ApiLicense>,
  pub pushed_at: Option<DateTime<Utc>>,
  pub html_url: Option<String>,
  pub owner: Option<ApiOwner>,
}

impl ApiRepo {
  /// Normalize into a `Record`, filling gaps from the requested item.
  ///
  /// The identifier is always the requested pair, so it matches the cache
  /// key even when upstream reports a renamed or recased repository.
  pub fn into_record(self, item: &TrackedItem, web_base: &str) -> Record {
    let identifier = item.key();
    if let Some(full_name) = self.full_name.as_deref().filter(|n| *n != identifier) {
      debug!(item = %item, full_name, "upstream reports a different name");
    }

    let license = self
      .license
      .and_then(|l| l.spdx_id)
      .filter(|id| !id.is_empty())
      .unwrap_or_else(|| LICENSE_UNKNOWN.to_string());

    Record {
      identifier,
      description: self.description,
      popularity: Popularity::from(self.stargazers_count),
      license,
      last_updated: self.pushed_at,
      homepage_url: self
        .html_url
        .unwrap_or_else(|| item.homepage_url(web_base)),
      avatar_url: self.owner.and_then(|o| o.avatar_url).unwrap_or_default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const WEB: &str = "https://github.com";

  #[test]
  fn test_full_response() {
    let json = r#"{
      "full_name": "geohacker/kerala",
      "description": "Kerala maps",
      "stargazers_count": 42,
      "license": { "key": "mit", "spdx_id": "MIT" },
      "pushed_at": "2024-03-01T10:00:00Z",
      "html_url": "https://github.com/geohacker/kerala",
      "owner": { "login": "geohacker", "avatar_url": "https://avatars.example/u/1" }
    }"#;
    let repo: ApiRepo = serde_json::from_str(json).unwrap();
    let record = repo.into_record(&TrackedItem::new("geohacker", "kerala"), WEB);

    assert_eq!(record.identifier, "geohacker/kerala");
    assert_eq!(record.description.as_deref(), Some("Kerala maps"));
    assert_eq!(record.popularity, Popularity::Count(42));
    assert_eq!(record.license, "MIT");
    assert_eq!(
      record.last_updated.map(|t| t.to_rfc3339()),
      Some("2024-03-01T10:00:00+00:00".to_string())
    );
    assert_eq!(record.avatar_url, "https://avatars.example/u/1");
  }

  #[test]
  fn test_sparse_response() {
    let json = r#"{ "full_name": "a/b", "description": null, "license": null }"#;
    let repo: ApiRepo = serde_json::from_str(json).unwrap();
    let record = repo.into_record(&TrackedItem::new("a", "b"), WEB);

    assert_eq!(record.license, "Unknown");
    assert_eq!(record.description, None);
    assert_eq!(record.popularity, Popularity::Unavailable);
    assert_eq!(record.homepage_url, "https://github.com/a/b");
    assert_eq!(record.avatar_url, "");
  }

  #[test]
  fn test_identifier_follows_requested_pair() {
    let json = r#"{
      "full_name": "NewOwner/Renamed",
      "html_url": "https://github.com/NewOwner/Renamed"
    }"#;
    let repo: ApiRepo = serde_json::from_str(json).unwrap();
    let item = TrackedItem::new("oldowner", "renamed");
    let record = repo.into_record(&item, WEB);

    assert_eq!(record.identifier, item.key());
    assert_eq!(record.homepage_url, "https://github.com/NewOwner/Renamed");
  }

  #[test]
  fn test_missing_full_name_uses_requested_pair() {
    let repo: ApiRepo = serde_json::from_str("{}").unwrap();
    let record = repo.into_record(&TrackedItem::new("a", "b"), WEB);
    assert_eq!(record.identifier, "a/b");
  }

  #[test]
  fn test_zero_stars_is_not_unavailable() {
    let json = r#"{ "full_name": "a/b", "stargazers_count": 0 }"#;
    let repo: ApiRepo = serde_json::from_str(json).unwrap();
    let record = repo.into_record(&TrackedItem::new("a", "b"), WEB);
    assert_eq!(record.popularity, Popularity::Count(0));
  }
}
