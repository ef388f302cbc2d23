//! Configuration document types.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::CUSTOM_VERSION;

/// The configuration file as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
  #[serde(default)]
  pub install_dir: Option<PathBuf>,
  #[serde(default)]
  pub manifest_url: Option<String>,
  #[serde(default)]
  pub icon: Option<PathBuf>,
  #[serde(default)]
  pub defaults: ServerOverrides,
  pub servers: Vec<ServerEntry>,
}

/// Optional per-server settings, used both for `defaults` and each server entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOverrides {
  pub version: Option<String>,
  pub skip_download: Option<bool>,
  pub properties: Option<BTreeMap<String, PropertyValue>>,
  pub eula_accepted: Option<bool>,
  pub whitelist: Option<Vec<String>>,
  pub ops: Option<Vec<String>>,
  pub banned_players: Option<Vec<String>>,
  #[serde(rename = "bannedIPs", alias = "bannedIps")]
  pub banned_ips: Option<Vec<String>>,
}

/// One entry of the `servers` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerEntry {
  pub id: String,
  #[serde(flatten)]
  pub settings: ServerOverrides,
}

/// A scalar `server.properties` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
  Bool(bool),
  Integer(i64),
  Float(f64),
  Text(String),
}

impl fmt::Display for PropertyValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PropertyValue::Bool(b) => write!(f, "{}", b),
      PropertyValue::Integer(i) => write!(f, "{}", i),
      PropertyValue::Float(x) => write!(f, "{}", x),
      PropertyValue::Text(s) => f.write_str(s),
    }
  }
}

/// Fully merged desired state for one server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDesiredState {
  pub id: String,
  /// Literal id, `custom`, or `latest:<channel>`.
  pub version: String,
  pub skip_download: bool,
  pub properties: BTreeMap<String, PropertyValue>,
  pub eula_accepted: bool,
  pub whitelist: Vec<String>,
  pub ops: Vec<String>,
  pub banned_players: Vec<String>,
  #[serde(rename = "bannedIPs")]
  pub banned_ips: Vec<String>,
}

impl ServerDesiredState {
  /// Whether version resolution and binary sync are skipped.
  pub fn bypasses_download(&self) -> bool {
    self.skip_download || self.version == CUSTOM_VERSION
  }

  /// Properties rendered to the strings written to disk.
  pub fn rendered_properties(&self) -> BTreeMap<String, String> {
    self
      .properties
      .iter()
      .map(|(k, v)| (k.clone(), v.to_string()))
      .collect()
  }
}
