//! Version catalog resolution.
//!
//! The catalog is the remote version manifest: a `latest` map of channel name
//! to version id, and a `versions` list whose entries point at per-version
//! detail documents. Resolution turns a configured version reference into a
//! [`VersionDescriptor`] naming the server binary and its SHA-1.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "latest": { "release": "1.21.1", "snapshot": "24w40a" },
//!   "versions": [
//!     { "id": "1.21.1", "type": "release", "url": "https://.../1.21.1.json" }
//!   ]
//! }
//! ```

mod types;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::consts::{CUSTOM_VERSION, LATEST_PREFIX};
use crate::fetch::{FetchError, Fetcher};

pub use types::{ManifestEntry, VersionDescriptor, VersionManifest};

/// Errors that can occur while resolving a version.
#[derive(Debug, Error)]
pub enum CatalogError {
  /// The resolved id is not listed in the catalog.
  #[error("version {0} not found in catalog")]
  VersionNotFound(String),

  /// `latest:<channel>` named a channel the catalog does not publish.
  #[error("catalog has no latest version for channel '{0}'")]
  UnknownChannel(String),

  /// The version exists but ships no server binary.
  #[error("version {0} has no server download")]
  NoServerArtifact(String),

  /// Catalog or detail document could not be retrieved.
  #[error(transparent)]
  Transport(#[from] FetchError),

  /// The catalog document did not have the expected shape.
  #[error("malformed version catalog: {0}")]
  MalformedCatalog(#[source] serde_json::Error),

  /// A version detail document did not have the expected shape.
  #[error("malformed detail document for {version}: {message}")]
  MalformedDetail { version: String, message: String },
}

impl CatalogError {
  /// Whether this error should stop the rest of the server's pipeline.
  pub fn is_fatal(&self) -> bool {
    !matches!(self, CatalogError::NoServerArtifact(_))
  }
}

/// A configured version reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRef {
  /// `custom`: the binary is managed by hand.
  Custom,
  /// `latest:<channel>`.
  Latest(String),
  /// A concrete version id.
  Exact(String),
}

impl VersionRef {
  pub fn parse(reference: &str) -> Self {
    if reference == CUSTOM_VERSION {
      VersionRef::Custom
    } else if let Some(channel) = reference.strip_prefix(LATEST_PREFIX) {
      VersionRef::Latest(channel.to_string())
    } else {
      VersionRef::Exact(reference.to_string())
    }
  }
}

impl VersionManifest {
  /// Fetch and parse the catalog at `url`.
  pub async fn fetch(fetcher: &dyn Fetcher, url: &str) -> Result<Self, CatalogError> {
    let doc = fetcher.fetch_json(url).await?;
    Self::from_value(doc)
  }

  pub fn from_value(doc: Value) -> Result<Self, CatalogError> {
    serde_json::from_value(doc).map_err(CatalogError::MalformedCatalog)
  }

  /// Map a reference to a concrete version id without consulting the version list.
  pub fn resolve_id(&self, reference: &str) -> Result<String, CatalogError> {
    match VersionRef::parse(reference) {
      VersionRef::Latest(channel) => self
        .latest
        .get(&channel)
        .cloned()
        .ok_or(CatalogError::UnknownChannel(channel)),
      VersionRef::Custom | VersionRef::Exact(_) => Ok(reference.to_string()),
    }
  }

  /// First catalog entry with the given id.
  pub fn find(&self, id: &str) -> Option<&ManifestEntry> {
    self.versions.iter().find(|entry| entry.id == id)
  }

  /// Resolve `reference` all the way to the server binary descriptor.
  ///
  /// Fetches the matching entry's detail document through `fetcher`.
  pub async fn resolve(&self, reference: &str, fetcher: &dyn Fetcher) -> Result<VersionDescriptor, CatalogError> {
    let id = self.resolve_id(reference)?;
    let entry = self.find(&id).ok_or_else(|| CatalogError::VersionNotFound(id.clone()))?;
    debug!(reference = %reference, version = %id, "resolved version reference");

    let detail = fetcher.fetch_json(&entry.url).await?;
    VersionDescriptor::from_detail(&id, &detail)
  }
}
