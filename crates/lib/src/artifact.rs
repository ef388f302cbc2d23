//! Server binary synchronisation.
//!
//! A binary is current iff its SHA-1 equals the catalog's hash for the
//! resolved version. Stale or missing binaries are streamed into a temporary
//! file beside the target, verified, and only then renamed into place, so a
//! failed or corrupt download never replaces a working binary.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha1::{Digest, Sha1};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::catalog::VersionDescriptor;
use crate::fetch::{FetchError, Fetcher, ProgressSink};

const READ_BUF_SIZE: usize = 64 * 1024;

/// What [`ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
  Unchanged,
  Downloaded,
}

/// Errors that can occur while syncing a binary.
#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("io error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Transport(#[from] FetchError),

  /// The downloaded bytes do not hash to the catalog's value.
  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ArtifactError + '_ {
  move |source| ArtifactError::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Lowercase hex SHA-1 of the file at `path`.
pub async fn hash_file(path: &Path) -> io::Result<String> {
  let mut file = fs::File::open(path).await?;
  let mut hasher = Sha1::new();
  let mut buf = vec![0u8; READ_BUF_SIZE];
  loop {
    let n = file.read(&mut buf).await?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }
  Ok(hex::encode(hasher.finalize()))
}

/// Make the file at `path` match `descriptor`, downloading only when needed.
pub async fn ensure(
  path: &Path,
  descriptor: &VersionDescriptor,
  fetcher: &dyn Fetcher,
  progress: &dyn ProgressSink,
) -> Result<SyncOutcome, ArtifactError> {
  let expected = descriptor.sha1.to_ascii_lowercase();

  match hash_file(path).await {
    Ok(actual) if actual == expected => {
      debug!(path = ?path, sha1 = %actual, "binary is current");
      return Ok(SyncOutcome::Unchanged);
    }
    Ok(actual) => {
      info!(path = ?path, expected = %expected, actual = %actual, "binary is outdated");
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = ?path, "binary is missing");
    }
    Err(e) => return Err(io_err(path)(e)),
  }

  download_verified(path, descriptor, &expected, fetcher, progress).await?;
  Ok(SyncOutcome::Downloaded)
}

async fn download_verified(
  path: &Path,
  descriptor: &VersionDescriptor,
  expected: &str,
  fetcher: &dyn Fetcher,
  progress: &dyn ProgressSink,
) -> Result<(), ArtifactError> {
  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => PathBuf::from("."),
  };
  fs::create_dir_all(&parent).await.map_err(io_err(&parent))?;

  let url = descriptor.download_url.as_str();
  info!(url = %url, path = ?path, version = %descriptor.id, "downloading server binary");

  let mut stream = fetcher.fetch_stream(url).await?;

  // Dropping the temp file on any early return removes it.
  let staged = tempfile::Builder::new()
    .prefix(".download-")
    .suffix(".part")
    .tempfile_in(&parent)
    .map_err(io_err(&parent))?;
  let mut file = fs::File::from_std(staged.as_file().try_clone().map_err(io_err(staged.path()))?);

  let mut tracker = progress.start(&path.display().to_string(), stream.content_length().or(descriptor.size));

  let mut hasher = Sha1::new();
  let mut written: u64 = 0;
  let result = async {
    while let Some(chunk) = stream.next_chunk().await? {
      hasher.update(&chunk);
      file.write_all(&chunk).await.map_err(io_err(staged.path()))?;
      written += chunk.len() as u64;
      tracker.advance(chunk.len() as u64);
    }
    file.flush().await.map_err(io_err(staged.path()))?;
    file.sync_all().await.map_err(io_err(staged.path()))?;
    Ok::<_, ArtifactError>(())
  }
  .await;
  tracker.finish();
  result?;
  drop(file);

  let actual = hex::encode(hasher.finalize());
  if actual != expected {
    return Err(ArtifactError::HashMismatch {
      url: url.to_string(),
      expected: expected.to_string(),
      actual,
    });
  }

  staged.persist(path).map_err(|e| ArtifactError::Io {
    path: path.to_path_buf(),
    source: e.error,
  })?;

  info!(path = ?path, size = written, "download complete");
  Ok(())
}
