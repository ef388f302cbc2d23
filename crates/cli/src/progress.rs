//! Download progress reported through tracing.

use tracing::info;

use craftfleet_lib::fetch::{DownloadProgress, ProgressSink};

use crate::output::format_bytes;

/// Logs each download at every tenth of its expected size.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
  fn start(&self, label: &str, total: Option<u64>) -> Box<dyn DownloadProgress> {
    let size = total.map(format_bytes).unwrap_or_else(|| "unknown".to_string());
    info!(file = %label, size = %size, "download started");
    Box::new(LoggedDownload {
      label: label.to_string(),
      total,
      received: 0,
      reported_decile: 0,
    })
  }
}

struct LoggedDownload {
  label: String,
  total: Option<u64>,
  received: u64,
  reported_decile: u64,
}

impl LoggedDownload {
  /// Completed tenths of the download, if its size is known.
  fn decile(&self) -> Option<u64> {
    match self.total {
      Some(total) if total > 0 => Some((self.received.min(total) * 10) / total),
      _ => None,
    }
  }
}

impl DownloadProgress for LoggedDownload {
  fn advance(&mut self, bytes: u64) {
    self.received += bytes;
    if let Some(decile) = self.decile()
      && decile > self.reported_decile
    {
      self.reported_decile = decile;
      info!(file = %self.label, percent = decile * 10, received = %format_bytes(self.received), "downloading");
    }
  }

  fn finish(&mut self) {
    info!(file = %self.label, received = %format_bytes(self.received), "download finished");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn download(total: Option<u64>) -> LoggedDownload {
    LoggedDownload {
      label: "server.jar".into(),
      total,
      received: 0,
      reported_decile: 0,
    }
  }

  #[test]
  fn reports_each_tenth_once() {
    let mut progress = download(Some(100));
    progress.advance(5);
    assert_eq!(progress.reported_decile, 0);
    progress.advance(10);
    assert_eq!(progress.reported_decile, 1);
    progress.advance(4);
    assert_eq!(progress.reported_decile, 1);
    progress.advance(81);
    assert_eq!(progress.reported_decile, 10);
  }

  #[test]
  fn unknown_size_never_reports_percentages() {
    let mut progress = download(None);
    progress.advance(1_000_000);
    assert_eq!(progress.decile(), None);
    assert_eq!(progress.reported_decile, 0);
  }

  #[test]
  fn overshoot_caps_at_complete() {
    let mut progress = download(Some(10));
    progress.advance(25);
    assert_eq!(progress.decile(), Some(10));
  }
}
