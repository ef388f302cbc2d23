//! reqwest-backed [`Fetcher`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ByteStream, FetchError, Fetcher};
use crate::consts::{DEFAULT_PROFILE_URL, USER_AGENT};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP implementation of [`Fetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: Client,
  profile_url: String,
  document_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
  id: String,
}

impl HttpFetcher {
  /// Build a fetcher pointing at the default account lookup endpoint.
  pub fn new() -> Result<Self, FetchError> {
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .connect_timeout(CONNECT_TIMEOUT)
      .build()
      .map_err(|e| FetchError::Transport {
        url: String::new(),
        message: e.to_string(),
      })?;

    Ok(Self {
      client,
      profile_url: DEFAULT_PROFILE_URL.to_string(),
      document_timeout: DOCUMENT_TIMEOUT,
    })
  }

  /// Override the timeout for catalog documents and account lookups.
  /// Binary downloads are not bounded by it.
  pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
    self.document_timeout = timeout;
    self
  }

  /// Override the account lookup endpoint (the name is appended as a path segment).
  pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
    self.profile_url = url.into();
    self
  }

  async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<Response, FetchError> {
    let mut request = self.client.get(url);
    if let Some(timeout) = timeout {
      request = request.timeout(timeout);
    }
    request.send().await.map_err(|e| FetchError::Transport {
      url: url.to_string(),
      message: e.to_string(),
    })
  }
}

fn check_status(url: &str, response: Response) -> Result<Response, FetchError> {
  if response.status().is_success() {
    Ok(response)
  } else {
    Err(FetchError::Status {
      url: url.to_string(),
      status: response.status().as_u16(),
    })
  }
}

#[async_trait]
impl Fetcher for HttpFetcher {
  async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
    debug!(url = %url, "fetching document");
    let response = check_status(url, self.get(url, Some(self.document_timeout)).await?)?;
    response.json::<Value>().await.map_err(|e| FetchError::Decode {
      url: url.to_string(),
      message: e.to_string(),
    })
  }

  async fn fetch_stream(&self, url: &str) -> Result<Box<dyn ByteStream>, FetchError> {
    debug!(url = %url, "opening download");
    let response = check_status(url, self.get(url, None).await?)?;
    Ok(Box::new(HttpStream {
      url: url.to_string(),
      response,
    }))
  }

  async fn fetch_identity(&self, name: &str) -> Result<Option<String>, FetchError> {
    let url = format!("{}/{}", self.profile_url.trim_end_matches('/'), name);
    let response = self.get(&url, Some(self.document_timeout)).await?;

    // The profile API answers unknown names with 204 (older) or 404 (newer).
    if matches!(response.status(), StatusCode::NO_CONTENT | StatusCode::NOT_FOUND) {
      return Ok(None);
    }
    let response = check_status(&url, response)?;

    let profile = response.json::<ProfileResponse>().await.map_err(|e| FetchError::Decode {
      url: url.clone(),
      message: e.to_string(),
    })?;
    Ok(Some(profile.id))
  }
}

struct HttpStream {
  url: String,
  response: Response,
}

#[async_trait]
impl ByteStream for HttpStream {
  fn content_length(&self) -> Option<u64> {
    self.response.content_length()
  }

  async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
    let chunk = self.response.chunk().await.map_err(|e| FetchError::Transport {
      url: self.url.clone(),
      message: e.to_string(),
    })?;
    Ok(chunk.map(|bytes| bytes.to_vec()))
  }
}
