mod apply;
mod versions;

pub use apply::cmd_apply;
pub use versions::cmd_versions;

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};

use craftfleet_lib::config::FleetConfig;
use craftfleet_lib::fetch::HttpFetcher;

use crate::output::print_error;

/// Exit code for an unreadable or invalid configuration.
pub const EXIT_CONFIG: u8 = 2;

/// Load the fleet configuration, printing the failure and mapping it to [`EXIT_CONFIG`].
fn load_config(path: &Path) -> Result<FleetConfig, ExitCode> {
  FleetConfig::load(path).map_err(|e| {
    print_error(&format!("invalid configuration: {}", e));
    ExitCode::from(EXIT_CONFIG)
  })
}

fn http_fetcher(timeout: Option<Duration>) -> Result<HttpFetcher> {
  let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
  Ok(match timeout {
    Some(timeout) => fetcher.with_document_timeout(timeout),
    None => fetcher,
  })
}
