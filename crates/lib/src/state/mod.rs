//! Per-server state file reconciliation.
//!
//! Each reconciler loads the current file (if any), merges in the desired
//! values and writes the file back only when something changed. Nothing here
//! ever deletes a file or removes an entry that is already present.

mod eula;
mod icon;
mod lists;
mod properties;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;

pub use eula::{parse_eula, reconcile_eula};
pub use icon::reconcile_icon;
pub use lists::{BannedIpEntry, BannedPlayerEntry, ListKind, OpEntry, WhitelistEntry, reconcile_list};
pub use properties::{Properties, parse_properties, reconcile_properties, render_properties, validate_property};

/// The files a server directory is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
  Binary,
  Properties,
  Eula,
  Whitelist,
  Ops,
  BannedPlayers,
  BannedIps,
  Icon,
}

impl FileKind {
  pub fn file_name(self) -> &'static str {
    use crate::consts::*;
    match self {
      FileKind::Binary => SERVER_JAR,
      FileKind::Properties => PROPERTIES_FILE,
      FileKind::Eula => EULA_FILE,
      FileKind::Whitelist => WHITELIST_FILE,
      FileKind::Ops => OPS_FILE,
      FileKind::BannedPlayers => BANNED_PLAYERS_FILE,
      FileKind::BannedIps => BANNED_IPS_FILE,
      FileKind::Icon => ICON_FILE,
    }
  }
}

impl fmt::Display for FileKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.file_name())
  }
}

/// What a reconciliation step decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  /// The file already matched.
  Unchanged,
  /// The file did not exist and was written.
  Created,
  /// The file existed and was rewritten.
  Updated { detail: String },
  /// The server binary was (re)downloaded.
  Downloaded { version: String },
  /// The step did not apply to this server.
  Skipped { reason: String },
}

impl Outcome {
  /// Whether this outcome wrote to disk.
  pub fn wrote(&self) -> bool {
    matches!(self, Outcome::Created | Outcome::Updated { .. } | Outcome::Downloaded { .. })
  }
}

impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Outcome::Unchanged => write!(f, "unchanged"),
      Outcome::Created => write!(f, "created"),
      Outcome::Updated { detail } => write!(f, "updated ({})", detail),
      Outcome::Downloaded { version } => write!(f, "downloaded {}", version),
      Outcome::Skipped { reason } => write!(f, "skipped ({})", reason),
    }
  }
}

/// Errors that can occur while reconciling a state file.
#[derive(Debug, Error)]
pub enum StateError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize {path}: {source}")]
  Serialize {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Raw content of `path`, `None` if it does not exist.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StateError> {
  match fs::read(path).await {
    Ok(bytes) => Ok(Some(bytes)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(StateError::Read {
      path: path.to_path_buf(),
      source: e,
    }),
  }
}

async fn write_file(path: &Path, content: &[u8]) -> Result<(), StateError> {
  fs::write(path, content).await.map_err(|e| StateError::Write {
    path: path.to_path_buf(),
    source: e,
  })
}
