//! Per-server provisioning pipeline.
//!
//! For one server, in order:
//! 1. Ensure the server directory exists
//! 2. Resolve the version and sync the binary (unless bypassed)
//! 3. Reconcile `server.properties`, `eula.txt` and the four access lists
//! 4. Copy the shared icon if the server has none
//!
//! A failure in steps 1-2 ends the pipeline for that server. A failure in a
//! later step is recorded in the report and the remaining steps still run.

mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::artifact::{self, SyncOutcome};
use crate::catalog::{CatalogError, VersionManifest};
use crate::config::ServerDesiredState;
use crate::consts::CUSTOM_VERSION;
use crate::fetch::{Fetcher, ProgressSink};
use crate::identity::IdentityResolver;
use crate::state::{self, FileKind, ListKind, Outcome, StateError};

pub use types::{ProvisionError, ServerReport, StepFailure, StepReport};

/// Shared, read-only inputs for provisioning any server of the fleet.
#[derive(Clone)]
pub struct Provisioner {
  install_dir: PathBuf,
  icon: Option<PathBuf>,
  catalog: Option<Arc<VersionManifest>>,
  fetcher: Arc<dyn Fetcher>,
  progress: Arc<dyn ProgressSink>,
}

impl Provisioner {
  /// `catalog` is `None` when it could not be fetched; servers that need it will fail.
  pub fn new(
    install_dir: PathBuf,
    catalog: Option<Arc<VersionManifest>>,
    fetcher: Arc<dyn Fetcher>,
    progress: Arc<dyn ProgressSink>,
  ) -> Self {
    Self {
      install_dir,
      icon: None,
      catalog,
      fetcher,
      progress,
    }
  }

  /// Icon copied into servers that do not have one yet.
  pub fn with_icon(mut self, icon: Option<PathBuf>) -> Self {
    self.icon = icon;
    self
  }

  pub fn server_dir(&self, id: &str) -> PathBuf {
    self.install_dir.join(id)
  }

  /// Run the whole pipeline for `desired`.
  pub async fn provision(&self, desired: &ServerDesiredState) -> Result<ServerReport, ProvisionError> {
    let dir = self.server_dir(&desired.id);
    let mut report = ServerReport::new(&desired.id, &desired.version);
    info!(server = %desired.id, version = %desired.version, dir = ?dir, "provisioning server");

    fs::create_dir_all(&dir).await.map_err(|e| ProvisionError::CreateDir {
      path: dir.clone(),
      source: e,
    })?;

    let binary = self.sync_binary(desired, &mut report).await?;
    report.steps.push(StepReport {
      file: FileKind::Binary,
      outcome: binary,
    });

    let properties_path = dir.join(FileKind::Properties.file_name());
    let properties = state::reconcile_properties(&properties_path, &desired.rendered_properties()).await;
    record(&mut report, FileKind::Properties, properties);

    let eula = state::reconcile_eula(&dir.join(FileKind::Eula.file_name()), desired.eula_accepted).await;
    record(&mut report, FileKind::Eula, eula);

    let mut identities = IdentityResolver::new(self.fetcher.as_ref());
    let lists = [
      (ListKind::Whitelist, &desired.whitelist),
      (ListKind::Ops, &desired.ops),
      (ListKind::BannedPlayers, &desired.banned_players),
      (ListKind::BannedIps, &desired.banned_ips),
    ];
    for (kind, entries) in lists {
      let file = kind.file_kind();
      let result = state::reconcile_list(&dir.join(file.file_name()), kind, entries, &mut identities).await;
      record(&mut report, file, result);
    }

    let icon = state::reconcile_icon(self.icon.as_deref(), &dir.join(FileKind::Icon.file_name())).await;
    record(&mut report, FileKind::Icon, icon);

    info!(
      server = %desired.id,
      writes = report.writes(),
      failures = report.failures.len(),
      "server provisioned"
    );
    Ok(report)
  }

  async fn sync_binary(
    &self,
    desired: &ServerDesiredState,
    report: &mut ServerReport,
  ) -> Result<Outcome, ProvisionError> {
    if desired.bypasses_download() {
      let reason = if desired.version == CUSTOM_VERSION {
        "custom version"
      } else {
        "download disabled"
      };
      debug!(server = %desired.id, reason, "skipping version resolution");
      return Ok(Outcome::Skipped {
        reason: reason.to_string(),
      });
    }

    let catalog = self.catalog.as_deref().ok_or(ProvisionError::CatalogUnavailable)?;
    let descriptor = match catalog.resolve(&desired.version, self.fetcher.as_ref()).await {
      Ok(descriptor) => descriptor,
      Err(e @ CatalogError::NoServerArtifact(_)) => {
        warn!(server = %desired.id, error = %e, "no server binary to install");
        return Ok(Outcome::Skipped { reason: e.to_string() });
      }
      Err(e) => return Err(ProvisionError::Catalog(e)),
    };
    report.resolved_version = Some(descriptor.id.clone());

    let path = self.server_dir(&desired.id).join(FileKind::Binary.file_name());
    match artifact::ensure(&path, &descriptor, self.fetcher.as_ref(), self.progress.as_ref()).await? {
      SyncOutcome::Unchanged => Ok(Outcome::Unchanged),
      SyncOutcome::Downloaded => Ok(Outcome::Downloaded { version: descriptor.id }),
    }
  }
}

fn record(report: &mut ServerReport, file: FileKind, result: Result<Outcome, StateError>) {
  match result {
    Ok(outcome) => report.steps.push(StepReport { file, outcome }),
    Err(e) => {
      error!(server = %report.server, file = %file, error = %e, "reconciliation step failed");
      report.failures.push(StepFailure {
        file,
        error: e.to_string(),
      });
    }
  }
}
