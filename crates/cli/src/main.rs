use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use craftfleet_lib::consts::CONFIG_FILENAME;

mod cmd;
mod output;
mod progress;

use cmd::{cmd_apply, cmd_versions};
use output::{OutputFormat, print_error};

/// craftfleet - Declarative provisioning for a fleet of Minecraft servers
#[derive(Parser)]
#[command(name = "craftfleet")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase log verbosity (-v for info, -vv for debug)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Path to the fleet configuration file
  #[arg(short, long, global = true, default_value = CONFIG_FILENAME)]
  config: PathBuf,

  /// Timeout for catalog and account lookups (e.g. "30s", "2m")
  #[arg(long, global = true, value_parser = humantime::parse_duration)]
  timeout: Option<Duration>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Bring every configured server to its desired state
  Apply {
    /// Override the install directory from the configuration
    #[arg(long)]
    install_dir: Option<PathBuf>,

    /// Maximum number of servers provisioned concurrently
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show which version each server resolves to, without touching disk
  Versions {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = match cli.verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Apply {
      install_dir,
      jobs,
      format,
    } => cmd_apply(&cli.config, install_dir, jobs, cli.timeout, format),
    Commands::Versions { format } => cmd_versions(&cli.config, cli.timeout, format),
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
