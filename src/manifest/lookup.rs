//! Loading filename lookup manifests from plist or JSON sources.

use crate::error::{ResourceError, Result};
use crate::manifest::plist::{PlistValue, parse_plist};
use crate::models::{FilenameLookupTable, LookupManifest, ManifestMetadata};

/// Manifest schema version understood by the resolver.
pub const SUPPORTED_MANIFEST_VERSION: i64 = 1;

const FILENAMES_KEY: &str = "filenames";
const METADATA_KEY: &str = "metadata";
const VERSION_KEY: &str = "version";

/// Parse a lookup manifest held in memory.
///
/// Sources named `*.json`, or whose first non-blank byte is `{`, are read as JSON with the
/// same `filenames` / `metadata` shape. Everything else is treated as a property list.
pub fn parse_lookup_manifest(bytes: &[u8], source_name: &str) -> Result<LookupManifest> {
  let manifest = if is_json_source(bytes, source_name) {
    serde_json::from_slice::<LookupManifest>(bytes)
      .map_err(|err| ResourceError::manifest(source_name, err.to_string()))?
  } else {
    let xml = std::str::from_utf8(bytes)
      .map_err(|err| ResourceError::manifest(source_name, format!("invalid UTF-8: {err}")))?;
    let root = parse_plist(xml).map_err(|message| ResourceError::manifest(source_name, message))?;
    manifest_from_plist(&root).map_err(|message| ResourceError::manifest(source_name, message))?
  };

  if let Some(version) = manifest.metadata.version {
    if version != SUPPORTED_MANIFEST_VERSION {
      tracing::warn!(
        "lookup manifest {source_name} declares version {version}, expected {SUPPORTED_MANIFEST_VERSION}"
      );
    }
  }

  Ok(manifest)
}

fn is_json_source(bytes: &[u8], source_name: &str) -> bool {
  if source_name.to_ascii_lowercase().ends_with(".json") {
    return true;
  }
  bytes
    .iter()
    .find(|byte| !byte.is_ascii_whitespace())
    .is_some_and(|byte| *byte == b'{')
}

fn manifest_from_plist(root: &PlistValue) -> std::result::Result<LookupManifest, String> {
  let dict = root
    .as_dict()
    .ok_or_else(|| "top-level value is not a dictionary".to_string())?;

  let filenames = dict
    .get(FILENAMES_KEY)
    .ok_or_else(|| format!("missing `{FILENAMES_KEY}` dictionary"))?
    .as_dict()
    .ok_or_else(|| format!("`{FILENAMES_KEY}` is not a dictionary"))?;

  let mut entries = Vec::with_capacity(filenames.len());
  for (logical, value) in filenames {
    let remapped = value
      .as_str()
      .ok_or_else(|| format!("filename entry {logical:?} is not a string"))?;
    entries.push((logical.clone(), remapped.to_string()));
  }

  let version = dict
    .get(METADATA_KEY)
    .and_then(PlistValue::as_dict)
    .and_then(|metadata| metadata.get(VERSION_KEY))
    .and_then(PlistValue::as_integer);

  Ok(LookupManifest {
    filenames: entries.into_iter().collect::<FilenameLookupTable>(),
    metadata: ManifestMetadata { version },
  })
}
