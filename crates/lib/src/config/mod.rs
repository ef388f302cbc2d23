//! Fleet configuration.
//!
//! The configuration is a JSON document listing every server plus a shared
//! `defaults` object merged under each entry (see [`merge`]).
//!
//! # Config File Format
//!
//! ```json
//! {
//!   "installDir": "minecraft_servers",
//!   "defaults": { "version": "latest:release", "properties": { "difficulty": "hard" } },
//!   "servers": [
//!     { "id": "survival", "whitelist": ["Alice"] },
//!     { "id": "creative", "version": "1.20.4", "properties": { "gamemode": "creative" } }
//!   ]
//! }
//! ```

mod merge;
mod types;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_INSTALL_DIR, DEFAULT_MANIFEST_URL, ICON_FILE};
use crate::state::validate_property;

pub use merge::merge;
pub use types::{ConfigFile, PropertyValue, ServerDesiredState, ServerEntry, ServerOverrides};

/// Errors that can occur while loading the configuration. All are fatal to the run.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("server #{index} has an empty id")]
  EmptyServerId { index: usize },

  #[error("server id '{id}' cannot be used as a directory name")]
  InvalidServerId { id: String },

  #[error("server '{id}' is configured more than once")]
  DuplicateServer { id: String },

  #[error("server '{id}' has no version and defaults do not provide one")]
  MissingVersion { id: String },

  #[error("server '{id}' has an unusable property '{key}': {reason}")]
  InvalidProperty {
    id: String,
    key: String,
    reason: &'static str,
  },
}

/// Loaded, merged and validated configuration.
#[derive(Debug, Clone)]
pub struct FleetConfig {
  /// Root under which each server gets a directory named by its id.
  pub install_dir: PathBuf,
  /// Version catalog location.
  pub manifest_url: String,
  /// Shared icon copied into servers that lack one.
  pub icon: Option<PathBuf>,
  /// One desired state per server, in configuration order.
  pub servers: Vec<ServerDesiredState>,
}

impl FleetConfig {
  /// Load the configuration at `path`.
  ///
  /// Relative paths inside the file resolve against the file's directory.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    let base_dir = match path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };
    let file: ConfigFile = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;
    Self::from_file(file, &base_dir)
  }

  /// Merge and validate an already-parsed config file.
  pub fn from_file(file: ConfigFile, base_dir: &Path) -> Result<Self, ConfigError> {
    let mut seen = HashSet::new();
    let mut servers = Vec::with_capacity(file.servers.len());

    for (index, entry) in file.servers.iter().enumerate() {
      validate_id(index, &entry.id)?;
      if !seen.insert(entry.id.clone()) {
        return Err(ConfigError::DuplicateServer { id: entry.id.clone() });
      }
      let desired = merge(&file.defaults, entry)?;
      for (key, value) in desired.rendered_properties() {
        validate_property(&key, &value).map_err(|reason| ConfigError::InvalidProperty {
          id: desired.id.clone(),
          key,
          reason,
        })?;
      }
      servers.push(desired);
    }

    let install_dir = base_dir.join(file.install_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_DIR)));
    let icon = base_dir.join(file.icon.unwrap_or_else(|| PathBuf::from(ICON_FILE)));
    debug!(install_dir = ?install_dir, servers = servers.len(), "configuration loaded");

    Ok(Self {
      install_dir,
      manifest_url: file.manifest_url.unwrap_or_else(|| DEFAULT_MANIFEST_URL.to_string()),
      icon: Some(icon),
      servers,
    })
  }

  /// Directory owned by the server with the given id.
  pub fn server_dir(&self, id: &str) -> PathBuf {
    self.install_dir.join(id)
  }
}

fn validate_id(index: usize, id: &str) -> Result<(), ConfigError> {
  if id.trim().is_empty() {
    return Err(ConfigError::EmptyServerId { index });
  }
  if id == "." || id == ".." || id.contains(['/', '\\']) {
    return Err(ConfigError::InvalidServerId { id: id.to_string() });
  }
  Ok(())
}
