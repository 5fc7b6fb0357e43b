//! Resolver configuration loader describing the initial search state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::VariantPlacement;

/// Default configuration file name searched for by [`ResolverConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "resolver.config.json";

/// Discoverable configuration describing search roots, variants and storage locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
  /// Ordered search roots, checked first to last.
  pub search_paths: Vec<String>,
  /// Ordered resolution variants, checked first to last within each search root.
  pub resolution_order: Vec<String>,
  /// Optional lookup manifest loaded when the resolver is created.
  pub lookup_manifest: Option<String>,
  /// Application name used to derive the writable directory.
  pub app_name: String,
  /// Explicit writable directory, overriding the platform default.
  pub writable_dir: Option<String>,
  /// Where resolution variants are inserted into candidate paths.
  pub variant_placement: VariantPlacement,
  /// Whether successful resolutions are cached.
  pub cache_enabled: bool,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      search_paths: vec![String::new()],
      resolution_order: vec![String::new()],
      lookup_manifest: None,
      app_name: env!("CARGO_PKG_NAME").into(),
      writable_dir: None,
      variant_placement: VariantPlacement::Prefix,
      cache_enabled: true,
    }
  }
}

impl ResolverConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or unreadable configuration file falls back to default values so callers can
  /// keep operating with the documented defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match Self::load_from_path(&candidate) {
      Ok(config) => config,
      Err(err) => {
        tracing::warn!("{err}; using default resolver configuration");
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file, returning defaults when it does not exist.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(ConfigError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
      path: path.to_path_buf(),
      source: err,
    })
  }

  /// Platform writable directory for this configuration, ending in a separator.
  ///
  /// The explicit override wins, then the per-user local data directory, then the system
  /// temporary directory.
  pub fn writable_directory(&self) -> String {
    let base = match &self.writable_dir {
      Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
      _ => dirs::data_local_dir()
        .map(|dir| dir.join(&self.app_name))
        .unwrap_or_else(|| std::env::temp_dir().join(&self.app_name)),
    };

    let mut directory = base.to_string_lossy().into_owned();
    if !directory.ends_with(std::path::MAIN_SEPARATOR) && !directory.ends_with('/') {
      directory.push(std::path::MAIN_SEPARATOR);
    }
    directory
  }
}
