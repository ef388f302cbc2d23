//! CLI output formatting utilities.
//!
//! Colored status lines, outcome symbols, and human-readable byte and
//! duration formatting for the text output of every command.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use craftfleet_lib::state::Outcome;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
}

pub fn truncate_hash(hash: &str) -> &str {
  match hash.char_indices().nth(12) {
    Some((end, _)) => &hash[..end],
    None => hash,
  }
}

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;
  const GB: u64 = MB * 1024;

  if bytes >= GB {
    format!("{:.1} GB", bytes as f64 / GB as f64)
  } else if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// Symbol shown in front of a reconciled file.
pub fn outcome_symbol(outcome: &Outcome) -> &'static str {
  match outcome {
    Outcome::Created | Outcome::Downloaded { .. } => symbols::ADD,
    Outcome::Updated { .. } => symbols::MODIFY,
    Outcome::Unchanged => symbols::SUCCESS,
    Outcome::Skipped { .. } => symbols::INFO,
  }
}

pub fn print_header(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.bold()));
}

/// One line per reconciled file, indented under its server.
pub fn print_step(file: &str, outcome: &Outcome) {
  let symbol = outcome_symbol(outcome);
  let out = Stream::Stdout;
  let colored = match outcome {
    Outcome::Created | Outcome::Downloaded { .. } => symbol.if_supports_color(out, |s| s.green()).to_string(),
    Outcome::Updated { .. } => symbol.if_supports_color(out, |s| s.yellow()).to_string(),
    Outcome::Unchanged => symbol.if_supports_color(out, |s| s.dimmed()).to_string(),
    Outcome::Skipped { .. } => symbol.if_supports_color(out, |s| s.blue()).to_string(),
  };
  println!("  {} {}: {}", colored, file, outcome);
}

pub fn print_step_failure(file: &str, error: &str) {
  println!(
    "  {} {}: {}",
    symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
    file,
    error.if_supports_color(Stream::Stdout, |s| s.red())
  );
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
