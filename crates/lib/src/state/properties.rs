//! `server.properties` reconciliation.
//!
//! The merge is a union: keys on disk that are not configured are kept as-is.
//! Whenever the file is written it is rendered sorted by key, so its content
//! depends only on the key/value set.
//!
//! Keys and values are handled as raw bytes. Only the line terminator and the
//! whitespace around a key are dropped on read, so an entry that is not
//! managed survives a rewrite byte for byte whatever its encoding.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use super::{Outcome, StateError, read_optional, write_file};

/// Key/value pairs of a properties file, sorted by key.
pub type Properties = BTreeMap<Vec<u8>, Vec<u8>>;

/// Parse `key=value` lines, skipping blanks, `#` comments and lines without `=`.
///
/// The value is everything after the first `=`, including surrounding spaces.
pub fn parse_properties(content: &[u8]) -> Properties {
  content
    .split(|&b| b == b'\n')
    .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
    .map(<[u8]>::trim_ascii_start)
    .filter(|line| !line.is_empty() && !line.starts_with(b"#"))
    .filter_map(|line| {
      let eq = line.iter().position(|&b| b == b'=')?;
      Some((line[..eq].trim_ascii_end().to_vec(), line[eq + 1..].to_vec()))
    })
    .collect()
}

/// Render sorted `key=value\n` lines.
pub fn render_properties(props: &Properties) -> Vec<u8> {
  let mut out = Vec::new();
  for (key, value) in props {
    out.extend_from_slice(key);
    out.push(b'=');
    out.extend_from_slice(value);
    out.push(b'\n');
  }
  out
}

/// Why `key=value` would not read back as the same pair, if it would not.
pub fn validate_property(key: &str, value: &str) -> Result<(), &'static str> {
  if key.is_empty() {
    return Err("key is empty");
  }
  if key.trim() != key {
    return Err("key has surrounding whitespace");
  }
  if key.starts_with('#') {
    return Err("key would be read as a comment");
  }
  if key.contains('=') {
    return Err("key contains '='");
  }
  if key.contains(['\n', '\r']) || value.contains(['\n', '\r']) {
    return Err("line breaks are not allowed");
  }
  Ok(())
}

pub async fn reconcile_properties(path: &Path, desired: &BTreeMap<String, String>) -> Result<Outcome, StateError> {
  let existing = read_optional(path).await?;
  let existed = existing.is_some();
  let mut props = existing.as_deref().map(parse_properties).unwrap_or_default();

  let mut changed_keys = Vec::new();
  for (key, value) in desired {
    if props.get(key.as_bytes()).map(Vec::as_slice) != Some(value.as_bytes()) {
      props.insert(key.as_bytes().to_vec(), value.as_bytes().to_vec());
      changed_keys.push(key.as_str());
    }
  }

  if existed && changed_keys.is_empty() {
    debug!(path = ?path, "properties unchanged");
    return Ok(Outcome::Unchanged);
  }

  write_file(path, &render_properties(&props)).await?;

  if existed {
    info!(path = ?path, keys = ?changed_keys, "properties updated");
    Ok(Outcome::Updated {
      detail: format!("set {}", changed_keys.join(", ")),
    })
  } else {
    info!(path = ?path, count = props.len(), "properties created");
    Ok(Outcome::Created)
  }
}
