//! Defaults merging.
//!
//! `properties` is merged key by key with the server's keys winning. Every
//! other field is taken whole from the server entry when present, otherwise
//! from the defaults, otherwise from the built-in default.

use super::ConfigError;
use super::types::{ServerDesiredState, ServerEntry, ServerOverrides};

/// Merge `defaults` under `entry`. Neither input is modified.
pub fn merge(defaults: &ServerOverrides, entry: &ServerEntry) -> Result<ServerDesiredState, ConfigError> {
  let server = &entry.settings;

  let version = server
    .version
    .as_ref()
    .or(defaults.version.as_ref())
    .cloned()
    .ok_or_else(|| ConfigError::MissingVersion { id: entry.id.clone() })?;

  let mut properties = defaults.properties.clone().unwrap_or_default();
  if let Some(overrides) = &server.properties {
    properties.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
  }

  Ok(ServerDesiredState {
    id: entry.id.clone(),
    version,
    skip_download: server.skip_download.or(defaults.skip_download).unwrap_or(false),
    properties,
    eula_accepted: server.eula_accepted.or(defaults.eula_accepted).unwrap_or(true),
    whitelist: pick_list(&server.whitelist, &defaults.whitelist),
    ops: pick_list(&server.ops, &defaults.ops),
    banned_players: pick_list(&server.banned_players, &defaults.banned_players),
    banned_ips: pick_list(&server.banned_ips, &defaults.banned_ips),
  })
}

fn pick_list(server: &Option<Vec<String>>, defaults: &Option<Vec<String>>) -> Vec<String> {
  server.as_ref().or(defaults.as_ref()).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;
  use crate::config::PropertyValue;

  fn entry(json: &str) -> ServerEntry {
    serde_json::from_str(json).unwrap()
  }

  fn overrides(json: &str) -> ServerOverrides {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn properties_are_unioned_with_server_winning() {
    let defaults = overrides(r#"{ "version": "1.0", "properties": { "motd": "default", "pvp": true } }"#);
    let merged = merge(&defaults, &entry(r#"{ "id": "a", "properties": { "motd": "mine", "port": 1 } }"#)).unwrap();

    let expected: BTreeMap<String, PropertyValue> = [
      ("motd".to_string(), PropertyValue::Text("mine".into())),
      ("port".to_string(), PropertyValue::Integer(1)),
      ("pvp".to_string(), PropertyValue::Bool(true)),
    ]
    .into_iter()
    .collect();
    assert_eq!(merged.properties, expected);
  }

  #[test]
  fn lists_are_replaced_not_concatenated() {
    let defaults = overrides(r#"{ "version": "1.0", "ops": ["Admin"], "whitelist": ["Admin", "Mod"] }"#);
    let merged = merge(&defaults, &entry(r#"{ "id": "a", "whitelist": ["Alice"] }"#)).unwrap();

    assert_eq!(merged.whitelist, vec!["Alice"]);
    assert_eq!(merged.ops, vec!["Admin"]);
    assert!(merged.banned_players.is_empty());
  }

  #[test]
  fn explicit_empty_list_overrides_defaults() {
    let defaults = overrides(r#"{ "version": "1.0", "ops": ["Admin"] }"#);
    let merged = merge(&defaults, &entry(r#"{ "id": "a", "ops": [] }"#)).unwrap();
    assert!(merged.ops.is_empty());
  }

  #[test]
  fn scalars_fall_back_to_builtin_defaults() {
    let merged = merge(&ServerOverrides::default(), &entry(r#"{ "id": "a", "version": "custom" }"#)).unwrap();

    assert!(merged.eula_accepted);
    assert!(!merged.skip_download);
    assert!(merged.bypasses_download());
  }

  #[test]
  fn server_scalars_override_defaults() {
    let defaults = overrides(r#"{ "version": "latest:release", "eulaAccepted": false, "skipDownload": true }"#);
    let merged = merge(
      &defaults,
      &entry(r#"{ "id": "a", "version": "1.20.4", "eulaAccepted": true, "skipDownload": false }"#),
    )
    .unwrap();

    assert_eq!(merged.version, "1.20.4");
    assert!(merged.eula_accepted);
    assert!(!merged.bypasses_download());
  }

  #[test]
  fn defaults_are_not_mutated() {
    let defaults = overrides(r#"{ "version": "1.0", "properties": { "motd": "default" } }"#);
    let before = defaults.clone();
    merge(&defaults, &entry(r#"{ "id": "a", "properties": { "motd": "mine" } }"#)).unwrap();
    assert_eq!(defaults, before);
  }
}
