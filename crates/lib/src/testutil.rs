//! Test utilities for craftfleet-lib.
//!
//! [`FakeFetcher`] serves documents, downloads and identities from memory and
//! counts how often each kind of request was made.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use sha1::{Digest, Sha1};

use crate::fetch::{ByteStream, FetchError, Fetcher};

#[derive(Default)]
pub struct FakeFetcher {
  documents: HashMap<String, Value>,
  files: HashMap<String, Vec<u8>>,
  broken_files: HashMap<String, Vec<u8>>,
  identities: HashMap<String, String>,
  identity_failures: Vec<String>,
  downloads: AtomicUsize,
  identity_lookups: AtomicUsize,
  looked_up: Mutex<Vec<String>>,
}

impl FakeFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_document(mut self, url: &str, doc: Value) -> Self {
    self.documents.insert(url.to_string(), doc);
    self
  }

  pub fn with_file(mut self, url: &str, content: &[u8]) -> Self {
    self.files.insert(url.to_string(), content.to_vec());
    self
  }

  /// A download that yields `partial` and then fails mid-stream.
  pub fn with_broken_file(mut self, url: &str, partial: &[u8]) -> Self {
    self.broken_files.insert(url.to_string(), partial.to_vec());
    self
  }

  pub fn with_identity(mut self, name: &str, raw_id: &str) -> Self {
    self.identities.insert(name.to_string(), raw_id.to_string());
    self
  }

  pub fn with_identity_failure(mut self, name: &str) -> Self {
    self.identity_failures.push(name.to_string());
    self
  }

  pub fn downloads(&self) -> usize {
    self.downloads.load(Ordering::SeqCst)
  }

  pub fn identity_lookups(&self) -> usize {
    self.identity_lookups.load(Ordering::SeqCst)
  }

  pub fn looked_up(&self) -> Vec<String> {
    self.looked_up.lock().unwrap().clone()
  }
}

#[async_trait]
impl Fetcher for FakeFetcher {
  async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
    self.documents.get(url).cloned().ok_or_else(|| FetchError::Status {
      url: url.to_string(),
      status: 404,
    })
  }

  async fn fetch_stream(&self, url: &str) -> Result<Box<dyn ByteStream>, FetchError> {
    self.downloads.fetch_add(1, Ordering::SeqCst);
    if let Some(content) = self.files.get(url) {
      return Ok(Box::new(MemoryStream::new(url, content.clone(), false)));
    }
    if let Some(partial) = self.broken_files.get(url) {
      return Ok(Box::new(MemoryStream::new(url, partial.clone(), true)));
    }
    Err(FetchError::Status {
      url: url.to_string(),
      status: 404,
    })
  }

  async fn fetch_identity(&self, name: &str) -> Result<Option<String>, FetchError> {
    self.identity_lookups.fetch_add(1, Ordering::SeqCst);
    self.looked_up.lock().unwrap().push(name.to_string());
    if self.identity_failures.iter().any(|n| n == name) {
      return Err(FetchError::Status {
        url: format!("fake://profiles/{}", name),
        status: 429,
      });
    }
    Ok(self.identities.get(name).cloned())
  }
}

struct MemoryStream {
  url: String,
  chunks: Vec<Vec<u8>>,
  total: u64,
  fail_at_end: bool,
}

impl MemoryStream {
  fn new(url: &str, content: Vec<u8>, fail_at_end: bool) -> Self {
    let total = content.len() as u64;
    let mut chunks: Vec<Vec<u8>> = content.chunks(4).map(|c| c.to_vec()).collect();
    chunks.reverse();
    Self {
      url: url.to_string(),
      chunks,
      // A broken stream announces more than it delivers.
      total: if fail_at_end { total * 2 + 1 } else { total },
      fail_at_end,
    }
  }
}

#[async_trait]
impl ByteStream for MemoryStream {
  fn content_length(&self) -> Option<u64> {
    Some(self.total)
  }

  async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
    match self.chunks.pop() {
      Some(chunk) => Ok(Some(chunk)),
      None if self.fail_at_end => Err(FetchError::Transport {
        url: self.url.clone(),
        message: "connection reset".to_string(),
      }),
      None => Ok(None),
    }
  }
}

pub fn sha1_hex(content: &[u8]) -> String {
  hex::encode(Sha1::digest(content))
}

pub const MANIFEST_URL: &str = "fake://manifest.json";

/// A catalog with a release `1.21.1`, a snapshot `24w40a` and a client-only `c0.0.11a`.
///
/// Each server-capable version's jar is served at `fake://jars/<id>.jar` with
/// content `jar-<id>`.
pub fn catalog_fetcher() -> FakeFetcher {
  let mut fetcher = FakeFetcher::new().with_document(
    MANIFEST_URL,
    json!({
      "latest": { "release": "1.21.1", "snapshot": "24w40a" },
      "versions": [
        { "id": "24w40a", "type": "snapshot", "url": "fake://versions/24w40a.json" },
        { "id": "1.21.1", "type": "release", "url": "fake://versions/1.21.1.json" },
        { "id": "c0.0.11a", "type": "old_alpha", "url": "fake://versions/c0.0.11a.json" }
      ]
    }),
  );

  for id in ["1.21.1", "24w40a"] {
    let content = format!("jar-{}", id);
    let jar_url = format!("fake://jars/{}.jar", id);
    fetcher = fetcher
      .with_document(
        &format!("fake://versions/{}.json", id),
        json!({
          "id": id,
          "downloads": {
            "client": { "sha1": "00", "size": 1, "url": "fake://client.jar" },
            "server": { "sha1": sha1_hex(content.as_bytes()), "size": content.len(), "url": jar_url }
          }
        }),
      )
      .with_file(&jar_url, content.as_bytes());
  }

  fetcher.with_document(
    "fake://versions/c0.0.11a.json",
    json!({ "id": "c0.0.11a", "downloads": { "client": { "sha1": "00", "size": 1, "url": "fake://client.jar" } } }),
  )
}
