//! Error types shared across the resolver, manifest loader and collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Failure outcomes reported by the resolver and its readers.
///
/// Resolution itself never fails; these values only come back from manifest loading and from
/// byte-stream or archive reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
  /// The lookup manifest could not be parsed. The previously installed table is retained.
  #[error("failed to parse lookup manifest {source_name}: {message}")]
  ManifestParse {
    /// Name of the manifest source (usually its resolved path).
    source_name: String,
    /// Parser diagnostic.
    message: String,
  },
  /// The requested file or archive entry could not be read.
  #[error("resource not found: {path}")]
  NotFound {
    /// Path, or `archive#entry` pair, that could not be read.
    path: String,
  },
}

impl ResourceError {
  pub(crate) fn manifest(source_name: &str, message: impl Into<String>) -> Self {
    Self::ManifestParse {
      source_name: source_name.to_string(),
      message: message.into(),
    }
  }

  pub(crate) fn not_found(path: impl Into<String>) -> Self {
    Self::NotFound { path: path.into() }
  }
}

/// Convenience alias for results using [`ResourceError`].
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Errors that can occur while loading the resolver configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration file.
  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}
