//! Data structures shared by the resolver, the manifest loader and the readers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from logical filenames to the names actually stored on disk.
///
/// Tables are only ever replaced wholesale; there is no incremental edit API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FilenameLookupTable {
  entries: BTreeMap<String, String>,
}

impl FilenameLookupTable {
  /// Create an empty table.
  pub fn new() -> Self {
    Self::default()
  }

  /// Remapped name for `logical_name`, if the table carries one.
  pub fn get(&self, logical_name: &str) -> Option<&str> {
    self.entries.get(logical_name).map(String::as_str)
  }

  /// Number of remapped names.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when no names are remapped.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate over `(logical, remapped)` pairs in key order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(key, value)| (key.as_str(), value.as_str()))
  }
}

impl<K, V> FromIterator<(K, V)> for FilenameLookupTable
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      entries: iter
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect(),
    }
  }
}

/// Informational metadata attached to a lookup manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestMetadata {
  /// Schema version declared by the manifest.
  #[serde(default)]
  pub version: Option<i64>,
}

/// Parsed filename lookup manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LookupManifest {
  /// Remapping table from the `filenames` section.
  pub filenames: FilenameLookupTable,
  /// Contents of the optional `metadata` section.
  #[serde(default)]
  pub metadata: ManifestMetadata,
}

/// Where resolution variants are inserted when building candidate paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPlacement {
  /// `root + variant + name`, e.g. `assets/hd/ui/button.png`.
  #[default]
  Prefix,
  /// `root + dir(name) + variant + file_name(name)`, e.g. `assets/ui/hd/button.png`.
  BeforeFileName,
}

/// Owned bytes produced by a byte-stream or archive read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBuffer {
  data: Vec<u8>,
}

impl ResourceBuffer {
  /// Wrap raw bytes.
  pub fn new(data: Vec<u8>) -> Self {
    Self { data }
  }

  /// Size of the buffer in bytes.
  pub fn size(&self) -> usize {
    self.data.len()
  }

  /// Borrow the buffer contents.
  pub fn as_bytes(&self) -> &[u8] {
    &self.data
  }

  /// Take ownership of the buffer contents.
  pub fn into_bytes(self) -> Vec<u8> {
    self.data
  }
}

impl From<Vec<u8>> for ResourceBuffer {
  fn from(data: Vec<u8>) -> Self {
    Self::new(data)
  }
}
