use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use tracing::debug;

/// Active reachability check
#[async_trait]
pub trait Probe: Send + Sync {
  /// True when the endpoint answered with a success status
  async fn probe(&self) -> bool;
}

/// Probe that issues a GET and only looks at the status code
pub struct HttpProbe {
  http: reqwest::Client,
  url: String,
  token: Option<String>,
}

impl HttpProbe {
  pub fn new(http: reqwest::Client, url: impl Into<String>, token: Option<String>) -> Self {
    Self {
      http,
      url: url.into(),
      token,
    }
  }
}

#[async_trait]
impl Probe for HttpProbe {
  async fn probe(&self) -> bool {
    let mut request = self.http.get(&self.url).header(CACHE_CONTROL, "no-cache");
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    match request.send().await {
      Ok(response) => {
        let ok = response.status().is_success();
        debug!(url = %self.url, status = %response.status(), ok, "probe finished");
        ok
      }
      Err(e) => {
        debug!(url = %self.url, error = %e, "probe failed");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Server;

  #[tokio::test]
  async fn test_success_status_is_online() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/zen")
      .match_header("cache-control", "no-cache")
      .with_status(200)
      .with_body("Keep it logically awesome.")
      .create_async()
      .await;

    let probe = HttpProbe::new(reqwest::Client::new(), format!("{}/zen", server.url()), None);
    assert!(probe.probe().await);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_error_status_is_offline() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/zen")
      .with_status(503)
      .create_async()
      .await;

    let probe = HttpProbe::new(reqwest::Client::new(), format!("{}/zen", server.url()), None);
    assert!(!probe.probe().await);
  }

  #[tokio::test]
  async fn test_unreachable_is_offline() {
    // Port 9 (discard) on localhost is essentially never listening
    let probe = HttpProbe::new(reqwest::Client::new(), "http://127.0.0.1:9/zen", None);
    assert!(!probe.probe().await);
  }
}
