//! Fleet-wide provisioning.
//!
//! The catalog is fetched once and shared read-only. Servers are then
//! provisioned on a bounded pool of tokio tasks; each server owns its own
//! directory, so workers share no mutable state. A failing or panicking
//! worker is attributed to its server and never affects the others.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::catalog::VersionManifest;
use crate::config::FleetConfig;
use crate::fetch::{Fetcher, ProgressSink};
use crate::provision::{ProvisionError, Provisioner, ServerReport};

/// Options for a fleet run.
#[derive(Debug, Clone)]
pub struct FleetOptions {
  /// Maximum number of servers provisioned at once.
  pub parallelism: usize,
}

impl Default for FleetOptions {
  fn default() -> Self {
    Self {
      parallelism: std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4),
    }
  }
}

/// Result of provisioning one server, tagged with its id.
#[derive(Debug)]
pub struct ServerOutcome {
  pub server: String,
  pub result: Result<ServerReport, ProvisionError>,
}

impl ServerOutcome {
  pub fn is_success(&self) -> bool {
    matches!(&self.result, Ok(report) if report.is_success())
  }
}

/// A finished server serializes as its [`ServerReport`] plus `success`; a
/// fatal failure as `{server, success: false, error}`.
impl Serialize for ServerOutcome {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Repr<'a> {
      #[serde(skip_serializing_if = "Option::is_none")]
      server: Option<&'a str>,
      #[serde(flatten)]
      report: Option<&'a ServerReport>,
      success: bool,
      #[serde(skip_serializing_if = "Option::is_none")]
      error: Option<String>,
    }

    let repr = match &self.result {
      Ok(report) => Repr {
        server: None,
        report: Some(report),
        success: report.is_success(),
        error: None,
      },
      Err(e) => Repr {
        server: Some(&self.server),
        report: None,
        success: false,
        error: Some(e.to_string()),
      },
    };
    repr.serialize(serializer)
  }
}

/// Result of a whole fleet run, in configuration order.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetReport {
  /// Why the catalog could not be fetched, if it could not.
  pub catalog_error: Option<String>,
  pub servers: Vec<ServerOutcome>,
}

impl FleetReport {
  pub fn is_success(&self) -> bool {
    self.servers.iter().all(ServerOutcome::is_success)
  }

  /// Servers that hit a fatal error.
  pub fn failed(&self) -> impl Iterator<Item = &ServerOutcome> {
    self.servers.iter().filter(|s| s.result.is_err())
  }
}

/// Provision every server in `config`.
pub async fn run_fleet(
  config: &FleetConfig,
  fetcher: Arc<dyn Fetcher>,
  progress: Arc<dyn ProgressSink>,
  options: &FleetOptions,
) -> FleetReport {
  let mut report = FleetReport::default();

  let needs_catalog = config.servers.iter().any(|s| !s.bypasses_download());
  let catalog = if needs_catalog {
    match VersionManifest::fetch(fetcher.as_ref(), &config.manifest_url).await {
      Ok(manifest) => {
        info!(url = %config.manifest_url, versions = manifest.versions.len(), "version catalog loaded");
        Some(Arc::new(manifest))
      }
      Err(e) => {
        error!(url = %config.manifest_url, error = %e, "failed to load version catalog");
        report.catalog_error = Some(e.to_string());
        None
      }
    }
  } else {
    None
  };

  let provisioner =
    Provisioner::new(config.install_dir.clone(), catalog, fetcher, progress).with_icon(config.icon.clone());
  let semaphore = Arc::new(Semaphore::new(options.parallelism.max(1)));

  info!(
    servers = config.servers.len(),
    parallelism = options.parallelism.max(1),
    "starting fleet provisioning"
  );

  let handles: Vec<(String, JoinHandle<Result<ServerReport, ProvisionError>>)> = config
    .servers
    .iter()
    .map(|desired| {
      let provisioner = provisioner.clone();
      let desired = desired.clone();
      let semaphore = semaphore.clone();
      let id = desired.id.clone();
      let handle = tokio::spawn(async move {
        // The semaphore is never closed, so acquiring only waits.
        let _permit = semaphore.acquire_owned().await.ok();
        provisioner.provision(&desired).await
      });
      (id, handle)
    })
    .collect();

  for (server, handle) in handles {
    let result = match handle.await {
      Ok(result) => result,
      Err(e) => Err(ProvisionError::Aborted { message: e.to_string() }),
    };
    if let Err(e) = &result {
      error!(server = %server, error = %e, "server provisioning failed");
    }
    report.servers.push(ServerOutcome { server, result });
  }

  info!(
    succeeded = report.servers.iter().filter(|s| s.is_success()).count(),
    failed = report.servers.iter().filter(|s| !s.is_success()).count(),
    "fleet provisioning complete"
  );

  report
}
