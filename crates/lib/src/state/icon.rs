//! `server-icon.png` reconciliation.
//!
//! Existence check only: an icon already in place is never compared or replaced.

use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use super::{Outcome, StateError};

pub async fn reconcile_icon(source: Option<&Path>, dest: &Path) -> Result<Outcome, StateError> {
  let Some(source) = source else {
    return Ok(Outcome::Skipped {
      reason: "no icon configured".to_string(),
    });
  };

  if !fs::try_exists(source).await.unwrap_or(false) {
    debug!(source = ?source, "source icon not present");
    return Ok(Outcome::Skipped {
      reason: format!("{} not found", source.display()),
    });
  }

  if fs::try_exists(dest).await.map_err(|e| StateError::Read {
    path: dest.to_path_buf(),
    source: e,
  })? {
    debug!(path = ?dest, "icon already present");
    return Ok(Outcome::Unchanged);
  }

  fs::copy(source, dest).await.map_err(|e| StateError::Write {
    path: dest.to_path_buf(),
    source: e,
  })?;
  info!(source = ?source, dest = ?dest, "icon copied");
  Ok(Outcome::Created)
}
