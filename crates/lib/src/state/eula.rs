//! `eula.txt` reconciliation. A single boolean, no merge.

use std::path::Path;

use tracing::{debug, info};

use super::{Outcome, StateError, read_optional, write_file};

/// Value of the `eula=` line, if there is one.
pub fn parse_eula(content: &str) -> Option<bool> {
  content
    .lines()
    .map(str::trim)
    .find_map(|line| line.strip_prefix("eula="))
    .map(|value| value.trim().eq_ignore_ascii_case("true"))
}

pub async fn reconcile_eula(path: &Path, accepted: bool) -> Result<Outcome, StateError> {
  let existing = read_optional(path).await?;
  // Only the flag line is inspected and any write replaces the whole file.
  let current = existing.as_deref().and_then(|bytes| parse_eula(&String::from_utf8_lossy(bytes)));

  if current == Some(accepted) {
    debug!(path = ?path, accepted, "eula unchanged");
    return Ok(Outcome::Unchanged);
  }

  write_file(path, format!("eula={}\n", accepted).as_bytes()).await?;
  info!(path = ?path, accepted, "eula written");

  Ok(match existing {
    None => Outcome::Created,
    Some(_) => Outcome::Updated {
      detail: format!("eula={}", accepted),
    },
  })
}
