//! Access-list reconciliation (`whitelist.json`, `ops.json`, `banned-*.json`).
//!
//! All four files are JSON arrays of records keyed by an identity field
//! (`name` for accounts, `ip` for addresses). Reconciliation is append-only:
//! configured entries that are missing get a fresh record with kind-specific
//! defaults, existing records are written back untouched and in their original
//! order.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{FileKind, Outcome, StateError, read_optional, write_file};
use crate::consts::{BAN_EXPIRES_FOREVER, DEFAULT_OP_LEVEL};
use crate::identity::IdentityResolver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhitelistEntry {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpEntry {
  pub id: String,
  pub name: String,
  pub level: u8,
  pub bypasses_player_limit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannedPlayerEntry {
  pub id: String,
  pub name: String,
  pub created: String,
  pub source: String,
  pub expires: String,
  pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannedIpEntry {
  pub ip: String,
  pub created: String,
  pub source: String,
  pub expires: String,
  pub reason: String,
}

/// The four list files and their record policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
  Whitelist,
  Ops,
  BannedPlayers,
  BannedIps,
}

impl ListKind {
  pub fn file_kind(self) -> FileKind {
    match self {
      ListKind::Whitelist => FileKind::Whitelist,
      ListKind::Ops => FileKind::Ops,
      ListKind::BannedPlayers => FileKind::BannedPlayers,
      ListKind::BannedIps => FileKind::BannedIps,
    }
  }

  /// Field that identifies a record within the file.
  pub fn identity_field(self) -> &'static str {
    match self {
      ListKind::BannedIps => "ip",
      _ => "name",
    }
  }

  /// Whether new records carry a looked-up account identifier.
  pub fn resolves_identity(self) -> bool {
    !matches!(self, ListKind::BannedIps)
  }

  /// Default record for `key`, with `id` already resolved for account lists.
  fn new_record(self, key: &str, id: String) -> Result<Value, serde_json::Error> {
    let name = key.to_string();
    match self {
      ListKind::Whitelist => serde_json::to_value(WhitelistEntry { id, name }),
      ListKind::Ops => serde_json::to_value(OpEntry {
        id,
        name,
        level: DEFAULT_OP_LEVEL,
        bypasses_player_limit: false,
      }),
      ListKind::BannedPlayers => serde_json::to_value(BannedPlayerEntry {
        id,
        name,
        created: String::new(),
        source: String::new(),
        expires: BAN_EXPIRES_FOREVER.to_string(),
        reason: String::new(),
      }),
      ListKind::BannedIps => serde_json::to_value(BannedIpEntry {
        ip: name,
        created: String::new(),
        source: String::new(),
        expires: BAN_EXPIRES_FOREVER.to_string(),
        reason: String::new(),
      }),
    }
  }
}

/// Parse a list file, treating anything that is not a JSON array as empty.
fn parse_records(path: &Path, content: &[u8]) -> Vec<Value> {
  match serde_json::from_slice::<Value>(content) {
    Ok(Value::Array(records)) => records,
    Ok(_) => {
      warn!(path = ?path, "state file is not a JSON array, treating as empty");
      Vec::new()
    }
    Err(e) => {
      warn!(path = ?path, error = %e, "state file is malformed, treating as empty");
      Vec::new()
    }
  }
}

/// Append every entry of `desired` missing from the list file at `path`.
///
/// An empty `desired` leaves the file alone entirely, whether or not it exists.
pub async fn reconcile_list(
  path: &Path,
  kind: ListKind,
  desired: &[String],
  identities: &mut IdentityResolver<'_>,
) -> Result<Outcome, StateError> {
  if desired.is_empty() {
    return Ok(Outcome::Skipped {
      reason: "no entries configured".to_string(),
    });
  }

  let existing = read_optional(path).await?;
  let existed = existing.is_some();
  let mut records = existing.as_deref().map(|c| parse_records(path, c)).unwrap_or_default();

  let field = kind.identity_field();
  let mut present: HashSet<String> = records
    .iter()
    .filter_map(|r| r.get(field).and_then(Value::as_str))
    .map(str::to_string)
    .collect();

  let mut added = Vec::new();
  for key in desired {
    if present.contains(key) {
      continue;
    }
    let id = if kind.resolves_identity() {
      identities.resolve(key).await
    } else {
      String::new()
    };
    let record = kind.new_record(key, id).map_err(|e| StateError::Serialize {
      path: path.to_path_buf(),
      source: e,
    })?;
    records.push(record);
    present.insert(key.clone());
    added.push(key.as_str());
  }

  if added.is_empty() {
    debug!(path = ?path, "list unchanged");
    return Ok(Outcome::Unchanged);
  }

  let mut content = serde_json::to_string_pretty(&records).map_err(|e| StateError::Serialize {
    path: path.to_path_buf(),
    source: e,
  })?;
  content.push('\n');
  write_file(path, content.as_bytes()).await?;
  info!(path = ?path, file = %kind.file_kind(), added = ?added, "list updated");

  if existed {
    Ok(Outcome::Updated {
      detail: format!("added {}", added.join(", ")),
    })
  } else {
    Ok(Outcome::Created)
  }
}
