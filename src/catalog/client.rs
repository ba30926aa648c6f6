use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::Config;
use crate::error::RemoteError;

use super::api_types::ApiRepo;
use super::types::{Record, TrackedItem};

const USER_AGENT: &str = concat!("fosshub/", env!("CARGO_PKG_VERSION"));

/// Source of records for tracked items
///
/// Implementations perform exactly one attempt per call; retry and
/// fallback policy belongs to the caller.
#[async_trait]
pub trait Fetcher: Send + Sync {
  async fn fetch(&self, item: &TrackedItem) -> Result<Record, RemoteError>;
}

/// GitHub REST API client
#[derive(Clone)]
pub struct GitHubClient {
  http: reqwest::Client,
  api_url: String,
  web_url: String,
  token: Option<String>,
}

impl GitHubClient {
  pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
    Ok(Self {
      http: build_http_client()?,
      api_url: config.api_url.trim_end_matches('/').to_string(),
      web_url: config.web_url.clone(),
      token,
    })
  }

  /// Whether requests carry a credential
  pub fn is_authenticated(&self) -> bool {
    self.token.is_some()
  }

  fn repo_url(&self, item: &TrackedItem) -> String {
    format!("{}/repos/{}/{}", self.api_url, item.namespace, item.name)
  }
}

#[async_trait]
impl Fetcher for GitHubClient {
  async fn fetch(&self, item: &TrackedItem) -> Result<Record, RemoteError> {
    let url = self.repo_url(item);

    let mut request = self
      .http
      .get(&url)
      .header(ACCEPT, "application/vnd.github+json");
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|source| RemoteError::Transport {
      url: url.clone(),
      source,
    })?;

    let status = response.status();
    if is_rate_limited(status, response.headers()) {
      return Err(RemoteError::RateLimited { url });
    }
    if !status.is_success() {
      return Err(RemoteError::Status { url, status });
    }

    let repo: ApiRepo = response
      .json()
      .await
      .map_err(|source| RemoteError::Decode {
        url: url.clone(),
        source,
      })?;

    Ok(repo.into_record(item, &self.web_url))
  }
}

/// Shared HTTP client settings for the fetcher and the connectivity probe
pub fn build_http_client() -> Result<reqwest::Client> {
  reqwest::Client::builder()
    .user_agent(USER_AGENT)
    .connect_timeout(Duration::from_secs(10))
    .build()
    .map_err(|e| eyre!("Failed to create HTTP client: {}", e))
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
  if status == StatusCode::TOO_MANY_REQUESTS {
    return true;
  }
  status == StatusCode::FORBIDDEN
    && headers
      .get("x-ratelimit-remaining")
      .and_then(|v| v.to_str().ok())
      .is_some_and(|v| v.trim() == "0")
}
