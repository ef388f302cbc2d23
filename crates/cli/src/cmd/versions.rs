//! Implementation of the `craftfleet versions` command.
//!
//! Shows the catalog's latest versions and what each configured server
//! resolves to. Nothing is written to disk.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;

use craftfleet_lib::catalog::{CatalogError, VersionManifest, VersionRef};
use craftfleet_lib::config::ServerDesiredState;
use craftfleet_lib::fetch::Fetcher;

use super::{http_fetcher, load_config};
use crate::output::{
  OutputFormat, format_bytes, print_error, print_info, print_json, print_stat, symbols, truncate_hash,
};

/// What a server's version reference resolves to.
enum Resolution {
  Custom,
  NoServerArtifact,
  Resolved {
    id: String,
    sha1: String,
    size: Option<u64>,
  },
  Failed(CatalogError),
}

/// Execute the versions command.
pub fn cmd_versions(config_path: &Path, timeout: Option<Duration>, format: OutputFormat) -> Result<ExitCode> {
  let config = match load_config(config_path) {
    Ok(config) => config,
    Err(code) => return Ok(code),
  };
  let fetcher = http_fetcher(timeout)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let (manifest, resolutions) = rt.block_on(async {
    let manifest = VersionManifest::fetch(&fetcher, &config.manifest_url)
      .await
      .with_context(|| format!("Failed to load version catalog from {}", config.manifest_url))?;
    let mut resolutions = Vec::with_capacity(config.servers.len());
    for server in &config.servers {
      resolutions.push(resolve(&manifest, server, &fetcher).await);
    }
    Ok::<_, anyhow::Error>((manifest, resolutions))
  })?;

  let all_resolved = !resolutions.iter().any(|r| matches!(r, Resolution::Failed(_)));

  if format.is_json() {
    let servers: Vec<_> = config
      .servers
      .iter()
      .zip(&resolutions)
      .map(|(server, resolution)| resolution_json(server, resolution))
      .collect();
    print_json(&json!({
      "latest": manifest.latest,
      "servers": servers,
    }))?;
  } else {
    print_info("Latest versions");
    for (channel, id) in &manifest.latest {
      print_stat(channel, id);
    }
    println!();
    for (server, resolution) in config.servers.iter().zip(&resolutions) {
      print_resolution(server, resolution);
    }
  }

  Ok(if all_resolved {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}

async fn resolve(manifest: &VersionManifest, server: &ServerDesiredState, fetcher: &dyn Fetcher) -> Resolution {
  if VersionRef::parse(&server.version) == VersionRef::Custom {
    return Resolution::Custom;
  }
  match manifest.resolve(&server.version, fetcher).await {
    Ok(descriptor) => Resolution::Resolved {
      id: descriptor.id,
      sha1: descriptor.sha1,
      size: descriptor.size,
    },
    Err(CatalogError::NoServerArtifact(_)) => Resolution::NoServerArtifact,
    Err(e) => Resolution::Failed(e),
  }
}

fn print_resolution(server: &ServerDesiredState, resolution: &Resolution) {
  match resolution {
    Resolution::Custom => println!("  {} {} custom (managed by hand)", server.id, symbols::ARROW),
    Resolution::NoServerArtifact => {
      println!("  {} {} {} (no server download)", server.id, symbols::ARROW, server.version)
    }
    Resolution::Resolved { id, sha1, size } => {
      let size = size.map(format_bytes).unwrap_or_else(|| "unknown size".into());
      let suffix = if server.skip_download { ", download disabled" } else { "" };
      println!(
        "  {} {} {} (sha1 {}, {}{})",
        server.id,
        symbols::ARROW,
        id,
        truncate_hash(sha1),
        size,
        suffix
      );
    }
    Resolution::Failed(e) => print_error(&format!("{}: {}", server.id, e)),
  }
}

fn resolution_json(server: &ServerDesiredState, resolution: &Resolution) -> serde_json::Value {
  match resolution {
    Resolution::Custom => json!({ "server": server.id, "version": server.version, "custom": true }),
    Resolution::NoServerArtifact => json!({ "server": server.id, "version": server.version, "serverDownload": false }),
    Resolution::Resolved { id, sha1, size } => json!({
      "server": server.id,
      "version": server.version,
      "resolvedVersion": id,
      "sha1": sha1,
      "size": size,
      "skipDownload": server.skip_download,
    }),
    Resolution::Failed(e) => json!({
      "server": server.id,
      "version": server.version,
      "error": e.to_string(),
    }),
  }
}
