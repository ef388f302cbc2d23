//! Implementation of the `craftfleet apply` command.
//!
//! Loads the fleet configuration, provisions every server concurrently and
//! prints what happened to each file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use craftfleet_lib::fleet::{FleetOptions, FleetReport, run_fleet};

use super::{http_fetcher, load_config};
use crate::output::{
  OutputFormat, format_duration, print_error, print_header, print_json, print_stat, print_step, print_step_failure,
  print_success, print_warning,
};
use crate::progress::LogProgress;

/// Execute the apply command.
///
/// Exits 0 when every server reached its desired state, 1 when any server or
/// file failed, and 2 when the configuration cannot be used at all.
pub fn cmd_apply(
  config_path: &Path,
  install_dir: Option<PathBuf>,
  jobs: Option<usize>,
  timeout: Option<Duration>,
  format: OutputFormat,
) -> Result<ExitCode> {
  let mut config = match load_config(config_path) {
    Ok(config) => config,
    Err(code) => return Ok(code),
  };
  if let Some(dir) = install_dir {
    config.install_dir = dir;
  }

  let mut options = FleetOptions::default();
  if let Some(jobs) = jobs {
    options.parallelism = jobs;
  }

  info!(
    config = %config_path.display(),
    install_dir = %config.install_dir.display(),
    servers = config.servers.len(),
    "applying fleet configuration"
  );

  let fetcher = Arc::new(http_fetcher(timeout)?);
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  let started = Instant::now();
  let report = rt.block_on(run_fleet(&config, fetcher, Arc::new(LogProgress), &options));
  let elapsed = started.elapsed();

  if format.is_json() {
    print_json(&JsonReport::new(&report, elapsed))?;
  } else {
    print_report(&report, elapsed);
  }

  Ok(if report.is_success() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}

fn print_report(report: &FleetReport, elapsed: Duration) {
  if let Some(err) = &report.catalog_error {
    print_warning(&format!("version catalog unavailable: {}", err));
  }

  for outcome in &report.servers {
    match &outcome.result {
      Ok(server) => {
        let version = match &server.resolved_version {
          Some(resolved) if resolved != &server.version => format!("{} ({})", server.version, resolved),
          _ => server.version.clone(),
        };
        print_header(&format!("{} [{}]", server.server, version));
        for step in &server.steps {
          print_step(step.file.file_name(), &step.outcome);
        }
        for failure in &server.failures {
          print_step_failure(failure.file.file_name(), &failure.error);
        }
      }
      Err(e) => {
        print_header(&outcome.server);
        print_step_failure("provisioning", &e.to_string());
      }
    }
  }

  println!();
  let total = report.servers.len();
  let failed = report.servers.iter().filter(|s| !s.is_success()).count();
  let writes: usize = report
    .servers
    .iter()
    .filter_map(|s| s.result.as_ref().ok())
    .map(|s| s.writes())
    .sum();

  if failed == 0 {
    print_success(&format!("{} server(s) provisioned", total));
  } else {
    print_error(&format!("{} of {} server(s) failed", failed, total));
  }
  print_stat("Files written", &writes.to_string());
  print_stat("Duration", &format_duration(elapsed));
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
  success: bool,
  duration_ms: u64,
  #[serde(flatten)]
  report: &'a FleetReport,
}

impl<'a> JsonReport<'a> {
  fn new(report: &'a FleetReport, elapsed: Duration) -> Self {
    Self {
      success: report.is_success(),
      duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
      report,
    }
  }
}
