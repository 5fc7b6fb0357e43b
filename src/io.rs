//! File-system collaborators consumed by the resolver.
//!
//! The resolver never touches the file system directly: existence checks go through a
//! [`FileProbe`], buffer reads through a [`ByteStreamReader`] and archive extraction through an
//! [`ArchiveReader`]. [`LocalFileSystem`] and [`ZipArchiveReader`] are the defaults.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ResourceError, Result};
use crate::models::ResourceBuffer;

/// Answers whether a regular file exists at a path.
pub trait FileProbe: Send + Sync {
  /// Returns `true` when `path` names an existing regular file.
  fn is_file(&self, path: &str) -> bool;
}

/// Reads whole files into memory.
pub trait ByteStreamReader: Send + Sync {
  /// Read the file at `path` using the given open mode.
  fn read(&self, path: &str, mode: ReadMode) -> Result<ResourceBuffer>;
}

/// Extracts named entries from zip-like containers.
pub trait ArchiveReader: Send + Sync {
  /// Read `entry_name` out of the archive stored at `archive_path`.
  fn read_entry(&self, archive_path: &str, entry_name: &str) -> Result<ResourceBuffer>;
}

/// Open mode for byte-stream reads, parsed from `fopen`-style strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadMode {
  /// Bytes are returned untouched (`"rb"`).
  #[default]
  Binary,
  /// CRLF line endings are normalised to LF (`"r"`, `"rt"`).
  Text,
}

impl FromStr for ReadMode {
  type Err = String;

  fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
    let mode = value.trim();
    if !mode.starts_with('r') {
      return Err(format!("unsupported read mode {value:?}"));
    }
    if mode.contains('b') {
      Ok(Self::Binary)
    } else {
      Ok(Self::Text)
    }
  }
}

/// Collaborators used by a resolver.
pub struct Backend {
  /// Existence checks for candidate paths.
  pub probe: Box<dyn FileProbe>,
  /// Whole-file reads.
  pub reader: Box<dyn ByteStreamReader>,
  /// Archive entry extraction.
  pub archive: Box<dyn ArchiveReader>,
}

impl Default for Backend {
  fn default() -> Self {
    Self {
      probe: Box::new(LocalFileSystem),
      reader: Box::new(LocalFileSystem),
      archive: Box::new(ZipArchiveReader),
    }
  }
}

impl std::fmt::Debug for Backend {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Backend").finish_non_exhaustive()
  }
}

/// Probe and reader backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileProbe for LocalFileSystem {
  fn is_file(&self, path: &str) -> bool {
    Path::new(path).is_file()
  }
}

impl ByteStreamReader for LocalFileSystem {
  fn read(&self, path: &str, mode: ReadMode) -> Result<ResourceBuffer> {
    let bytes = fs::read(path).map_err(|err| {
      tracing::debug!("failed to read {path}: {err}");
      ResourceError::not_found(path)
    })?;

    let bytes = match mode {
      ReadMode::Binary => bytes,
      ReadMode::Text => normalise_line_endings(bytes),
    };
    Ok(ResourceBuffer::new(bytes))
  }
}

/// Archive reader for zip containers on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveReader;

impl ArchiveReader for ZipArchiveReader {
  fn read_entry(&self, archive_path: &str, entry_name: &str) -> Result<ResourceBuffer> {
    let missing = || ResourceError::not_found(format!("{archive_path}#{entry_name}"));

    let file = fs::File::open(archive_path).map_err(|err| {
      tracing::debug!("failed to open archive {archive_path}: {err}");
      missing()
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| {
      tracing::debug!("failed to open zip {archive_path}: {err}");
      missing()
    })?;
    let mut entry = archive.by_name(entry_name).map_err(|err| {
      tracing::debug!("zip entry {entry_name} unavailable in {archive_path}: {err}");
      missing()
    })?;

    let mut buf = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
    entry.read_to_end(&mut buf).map_err(|err| {
      tracing::debug!("failed to read zip entry {entry_name} from {archive_path}: {err}");
      missing()
    })?;
    Ok(ResourceBuffer::new(buf))
  }
}

fn normalise_line_endings(bytes: Vec<u8>) -> Vec<u8> {
  if !bytes.contains(&b'\r') {
    return bytes;
  }

  let mut result = Vec::with_capacity(bytes.len());
  let mut iter = bytes.iter().peekable();
  while let Some(&byte) = iter.next() {
    if byte == b'\r' && iter.peek() == Some(&&b'\n') {
      continue;
    }
    result.push(byte);
  }
  result
}
