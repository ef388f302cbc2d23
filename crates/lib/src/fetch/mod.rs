//! Remote retrieval interfaces consumed by the engine.
//!
//! The engine never talks to the network directly. Everything remote goes
//! through [`Fetcher`], which [`HttpFetcher`] implements on top of reqwest and
//! tests replace with an in-memory fake.

mod http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpFetcher;

/// Errors raised by a [`Fetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
  /// The request could not be sent or the body could not be read.
  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },

  /// The server answered with a non-success status.
  #[error("request to {url} returned HTTP {status}")]
  Status { url: String, status: u16 },

  /// The body was not the JSON document we expected.
  #[error("failed to decode response from {url}: {message}")]
  Decode { url: String, message: String },
}

/// An incremental byte stream with an optional declared length.
#[async_trait]
pub trait ByteStream: Send {
  /// Total length announced by the remote, if any.
  fn content_length(&self) -> Option<u64>;

  /// Next chunk of the body, `None` once the body is exhausted.
  async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError>;
}

/// Remote collaborator used by the catalog, artifact and identity modules.
#[async_trait]
pub trait Fetcher: Send + Sync {
  /// Retrieve and parse a JSON document.
  async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;

  /// Open a streaming download.
  async fn fetch_stream(&self, url: &str) -> Result<Box<dyn ByteStream>, FetchError>;

  /// Look up the raw account identifier for `name`.
  ///
  /// Returns `Ok(None)` when the lookup service does not know the name.
  async fn fetch_identity(&self, name: &str) -> Result<Option<String>, FetchError>;
}

/// Hands out a progress tracker for each download.
pub trait ProgressSink: Send + Sync {
  fn start(&self, label: &str, total: Option<u64>) -> Box<dyn DownloadProgress>;
}

/// Progress of a single download.
pub trait DownloadProgress: Send {
  fn advance(&mut self, bytes: u64);
  fn finish(&mut self);
}

/// A [`ProgressSink`] that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
  fn start(&self, _label: &str, _total: Option<u64>) -> Box<dyn DownloadProgress> {
    Box::new(NoProgress)
  }
}

impl DownloadProgress for NoProgress {
  fn advance(&mut self, _bytes: u64) {}
  fn finish(&mut self) {}
}
