//! Catalog document types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CatalogError;

/// The remote version manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionManifest {
  /// Channel name (`release`, `snapshot`) to version id.
  #[serde(default)]
  pub latest: BTreeMap<String, String>,
  /// Every published version, newest first.
  #[serde(default)]
  pub versions: Vec<ManifestEntry>,
}

/// One entry of the manifest's version list.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
  pub id: String,
  #[serde(rename = "type", default)]
  pub kind: Option<String>,
  /// Location of the version's detail document.
  pub url: String,
}

/// A concrete, downloadable server build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
  pub id: String,
  pub download_url: String,
  /// Lowercase hex SHA-1 of the binary.
  pub sha1: String,
  pub size: Option<u64>,
}

const SHA1_HEX_LEN: usize = 40;

#[derive(Debug, Deserialize)]
struct DownloadEntry {
  sha1: String,
  url: String,
  #[serde(default)]
  size: Option<u64>,
}

impl VersionDescriptor {
  /// Extract the server download from a version detail document.
  pub fn from_detail(id: &str, detail: &Value) -> Result<Self, CatalogError> {
    let server = match detail.get("downloads").and_then(|d| d.get("server")) {
      Some(server) if !server.is_null() => server,
      _ => return Err(CatalogError::NoServerArtifact(id.to_string())),
    };

    let entry: DownloadEntry = serde_json::from_value(server.clone()).map_err(|e| CatalogError::MalformedDetail {
      version: id.to_string(),
      message: e.to_string(),
    })?;

    if entry.sha1.len() != SHA1_HEX_LEN || !entry.sha1.bytes().all(|b| b.is_ascii_hexdigit()) {
      return Err(CatalogError::MalformedDetail {
        version: id.to_string(),
        message: format!("invalid sha1 '{}'", entry.sha1),
      });
    }

    Ok(Self {
      id: id.to_string(),
      download_url: entry.url,
      sha1: entry.sha1.to_ascii_lowercase(),
      size: entry.size,
    })
  }
}
