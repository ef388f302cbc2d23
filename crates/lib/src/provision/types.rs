//! Provisioning results and errors.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::artifact::ArtifactError;
use crate::catalog::CatalogError;
use crate::state::{FileKind, Outcome};

/// A failure that stops the rest of a server's pipeline.
#[derive(Debug, Error)]
pub enum ProvisionError {
  #[error("failed to create server directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The catalog could not be fetched at the start of the run.
  #[error("version catalog is unavailable")]
  CatalogUnavailable,

  #[error(transparent)]
  Catalog(CatalogError),

  #[error("failed to sync server binary: {0}")]
  Artifact(#[from] ArtifactError),

  /// The worker running this server died before reporting.
  #[error("provisioning task aborted: {message}")]
  Aborted { message: String },
}

/// Decision taken for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
  pub file: FileKind,
  #[serde(flatten)]
  pub outcome: Outcome,
}

/// A non-fatal failure of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
  pub file: FileKind,
  pub error: String,
}

/// Everything that happened to one server during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerReport {
  pub server: String,
  /// Version as configured (`latest:release`, `custom`, ...).
  pub version: String,
  /// Concrete version id, when resolution ran and succeeded.
  pub resolved_version: Option<String>,
  pub steps: Vec<StepReport>,
  pub failures: Vec<StepFailure>,
}

impl ServerReport {
  pub fn new(server: &str, version: &str) -> Self {
    Self {
      server: server.to_string(),
      version: version.to_string(),
      ..Default::default()
    }
  }

  /// Outcome recorded for `file`, if the step ran.
  pub fn outcome(&self, file: FileKind) -> Option<&Outcome> {
    self.steps.iter().find(|s| s.file == file).map(|s| &s.outcome)
  }

  /// Number of steps that wrote to disk.
  pub fn writes(&self) -> usize {
    self.steps.iter().filter(|s| s.outcome.wrote()).count()
  }

  pub fn is_success(&self) -> bool {
    self.failures.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn step_report_serializes_flat() {
    let step = StepReport {
      file: FileKind::BannedIps,
      outcome: Outcome::Updated {
        detail: "added 10.0.0.2".into(),
      },
    };

    let json = serde_json::to_value(&step).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "file": "banned-ips", "outcome": "updated", "detail": "added 10.0.0.2" })
    );
  }

  #[test]
  fn writes_counts_only_writing_steps() {
    let mut report = ServerReport::new("a", "1.0");
    report.steps.push(StepReport {
      file: FileKind::Eula,
      outcome: Outcome::Created,
    });
    report.steps.push(StepReport {
      file: FileKind::Icon,
      outcome: Outcome::Unchanged,
    });

    assert_eq!(report.writes(), 1);
    assert_eq!(report.outcome(FileKind::Icon), Some(&Outcome::Unchanged));
    assert_eq!(report.outcome(FileKind::Ops), None);
  }
}
