//! CLI smoke tests for craftfleet.
//!
//! Every fleet here either uses `custom` versions or points at an unreachable
//! catalog, so no test needs network access.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the craftfleet binary.
fn craftfleet_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("craftfleet");
  cmd.env_remove("RUST_LOG");
  cmd
}

/// Create a temp directory holding `servers.json`.
fn temp_config(content: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  fs::write(temp.path().join("servers.json"), content).unwrap();
  temp
}

fn apply_in(temp: &TempDir) -> Command {
  let mut cmd = craftfleet_cmd();
  cmd.current_dir(temp.path()).arg("apply");
  cmd
}

/// Two hand-managed servers sharing defaults.
const CUSTOM_FLEET: &str = r#"{
  "installDir": "servers",
  "defaults": {
    "version": "custom",
    "properties": { "difficulty": "hard", "pvp": true }
  },
  "servers": [
    { "id": "survival", "properties": { "max-players": 20 } },
    { "id": "creative", "eulaAccepted": false, "properties": { "pvp": false } }
  ]
}"#;

fn read(path: &Path) -> String {
  fs::read_to_string(path).unwrap()
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  craftfleet_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  craftfleet_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("craftfleet"));
}

#[test]
fn apply_help_lists_options() {
  craftfleet_cmd()
    .args(["apply", "--help"])
    .assert()
    .success()
    .stdout(predicate::str::contains("--install-dir"))
    .stdout(predicate::str::contains("--jobs"));
}

// =============================================================================
// Configuration errors
// =============================================================================

#[test]
fn apply_missing_config_exits_with_config_error() {
  let temp = TempDir::new().unwrap();

  apply_in(&temp)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn apply_malformed_config_exits_with_config_error() {
  let temp = temp_config("{ not json");

  apply_in(&temp).assert().code(2);
}

#[test]
fn apply_duplicate_server_exits_with_config_error() {
  let temp = temp_config(r#"{"servers": [{"id": "a", "version": "custom"}, {"id": "a", "version": "custom"}]}"#);

  apply_in(&temp)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("server 'a' is configured more than once"));
  assert!(!temp.path().join("minecraft_servers").exists());
}

#[test]
fn versions_missing_config_exits_with_config_error() {
  let temp = TempDir::new().unwrap();

  craftfleet_cmd()
    .current_dir(temp.path())
    .arg("versions")
    .assert()
    .code(2);
}

// =============================================================================
// Apply
// =============================================================================

#[test]
fn apply_custom_fleet_writes_files() {
  let temp = temp_config(CUSTOM_FLEET);

  apply_in(&temp)
    .assert()
    .success()
    .stdout(predicate::str::contains("survival"))
    .stdout(predicate::str::contains("creative"))
    .stdout(predicate::str::contains("2 server(s) provisioned"));

  let survival = temp.path().join("servers/survival");
  assert_eq!(
    read(&survival.join("server.properties")),
    "difficulty=hard\nmax-players=20\npvp=true\n"
  );
  assert_eq!(read(&survival.join("eula.txt")), "eula=true\n");
  assert!(!survival.join("server.jar").exists());
  assert!(!survival.join("whitelist.json").exists());

  let creative = temp.path().join("servers/creative");
  assert_eq!(read(&creative.join("server.properties")), "difficulty=hard\npvp=false\n");
  assert_eq!(read(&creative.join("eula.txt")), "eula=false\n");
}

#[test]
fn apply_is_idempotent() {
  let temp = temp_config(CUSTOM_FLEET);

  apply_in(&temp).assert().success();
  let before = read(&temp.path().join("servers/survival/server.properties"));

  apply_in(&temp)
    .args(["--format", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"outcome\": \"created\"").not())
    .stdout(predicate::str::contains("\"outcome\": \"updated\"").not());

  assert_eq!(read(&temp.path().join("servers/survival/server.properties")), before);
}

#[test]
fn apply_preserves_unmanaged_properties() {
  let temp = temp_config(CUSTOM_FLEET);
  let dir = temp.path().join("servers/survival");
  fs::create_dir_all(&dir).unwrap();
  fs::write(dir.join("server.properties"), "#Minecraft server properties\nlevel-seed=42\ndifficulty=easy\n").unwrap();

  apply_in(&temp).assert().success().stdout(predicate::str::contains("updated"));

  assert_eq!(
    read(&dir.join("server.properties")),
    "difficulty=hard\nlevel-seed=42\nmax-players=20\npvp=true\n"
  );
}

#[test]
fn apply_install_dir_flag_overrides_config() {
  let temp = temp_config(CUSTOM_FLEET);
  let elsewhere = temp.path().join("elsewhere");

  apply_in(&temp)
    .arg("--install-dir")
    .arg(&elsewhere)
    .args(["--jobs", "1"])
    .assert()
    .success();

  assert!(elsewhere.join("survival/server.properties").exists());
  assert!(!temp.path().join("servers").exists());
}

#[test]
fn apply_json_output_is_parseable() {
  let temp = temp_config(CUSTOM_FLEET);

  let output = apply_in(&temp).args(["--format", "json"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["success"], true);
  assert_eq!(report["servers"][0]["server"], "survival");
  assert_eq!(report["servers"][1]["server"], "creative");
  assert_eq!(report["servers"][0]["steps"][0]["file"], "binary");
  assert_eq!(report["servers"][0]["steps"][0]["outcome"], "skipped");
}

#[test]
fn apply_copies_shared_icon() {
  let config = CUSTOM_FLEET.replace("\"installDir\": \"servers\",", "\"installDir\": \"servers\", \"icon\": \"icon.png\",");
  let temp = temp_config(&config);
  fs::write(temp.path().join("icon.png"), b"\x89PNG fake").unwrap();

  apply_in(&temp).assert().success();

  assert_eq!(fs::read(temp.path().join("servers/creative/server-icon.png")).unwrap(), b"\x89PNG fake");
}

#[test]
fn apply_unreachable_catalog_fails_only_dependent_servers() {
  let temp = temp_config(
    r#"{
      "manifestUrl": "http://127.0.0.1:9/version_manifest_v2.json",
      "servers": [
        { "id": "vanilla", "version": "latest:release" },
        { "id": "modded", "version": "custom" }
      ]
    }"#,
  );

  apply_in(&temp)
    .args(["--timeout", "5s"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("version catalog unavailable"))
    .stdout(predicate::str::contains("1 of 2 server(s) failed"));

  assert!(temp.path().join("minecraft_servers/modded/server.properties").exists());
}
