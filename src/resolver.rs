//! Logical filename resolution against search roots, resolution variants and a lookup table.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::io::{Backend, ReadMode};
use crate::manifest::parse_lookup_manifest;
use crate::models::{FilenameLookupTable, ResourceBuffer, VariantPlacement};
use crate::paths::{generate_candidates, is_passthrough_name, split_file_name};

/// Returned for an empty request so that resolution never yields an empty string.
const EMPTY_NAME_RESOLUTION: &str = ".";

/// Resolves logical filenames into concrete paths.
///
/// The three inputs (search paths, resolution order, lookup table) are only replaced
/// wholesale, and every replacement clears the resolved-path cache. Resolution itself never
/// fails: when nothing matches, the requested name comes back unchanged.
#[derive(Debug)]
pub struct Resolver {
  search_paths: Vec<String>,
  resolution_order: Vec<String>,
  lookup: FilenameLookupTable,
  placement: VariantPlacement,
  cache_enabled: bool,
  cache: RefCell<HashMap<String, String>>,
  writable_directory: String,
  backend: Backend,
}

impl Default for Resolver {
  fn default() -> Self {
    Self::new()
  }
}

impl Resolver {
  /// Create a resolver with default settings backed by the local file system.
  pub fn new() -> Self {
    Self::with_backend(&ResolverConfig::default(), Backend::default())
  }

  /// Create a resolver from configuration, loading the configured lookup manifest if any.
  pub fn from_config(config: &ResolverConfig) -> Result<Self> {
    let mut resolver = Self::with_backend(config, Backend::default());
    if let Some(manifest) = &config.lookup_manifest {
      resolver.load_lookup_table(manifest)?;
    }
    Ok(resolver)
  }

  /// Create a resolver from configuration using custom collaborators.
  ///
  /// The configured lookup manifest is not loaded; call [`Resolver::load_lookup_table`].
  pub fn with_backend(config: &ResolverConfig, backend: Backend) -> Self {
    Self {
      search_paths: config.search_paths.clone(),
      resolution_order: config.resolution_order.clone(),
      lookup: FilenameLookupTable::new(),
      placement: config.variant_placement,
      cache_enabled: config.cache_enabled,
      cache: RefCell::new(HashMap::new()),
      writable_directory: config.writable_directory(),
      backend,
    }
  }

  /// Resolve a logical filename into the concrete path to load.
  ///
  /// The lookup table remaps the name first. Each search path is then tried in order, and
  /// within it each resolution variant in order; the first existing file wins. Failing that,
  /// the unmapped name is tried directly under each search path. If nothing exists the
  /// original name is returned so the caller can still attempt to open it.
  pub fn resolve(&self, logical_name: &str) -> String {
    if logical_name.is_empty() {
      return EMPTY_NAME_RESOLUTION.to_string();
    }
    if is_passthrough_name(logical_name) {
      return logical_name.to_string();
    }

    if self.cache_enabled {
      if let Some(cached) = self.cache.borrow().get(logical_name) {
        return cached.clone();
      }
    }

    let mapped_name = self.lookup.get(logical_name).unwrap_or(logical_name);
    let candidates = generate_candidates(
      &self.search_paths,
      &self.resolution_order,
      self.placement,
      mapped_name,
      logical_name,
    );

    match candidates
      .into_iter()
      .find(|candidate| self.backend.probe.is_file(candidate))
    {
      Some(found) => {
        tracing::debug!("resolved {logical_name} to {found}");
        if self.cache_enabled {
          self
            .cache
            .borrow_mut()
            .insert(logical_name.to_string(), found.clone());
        }
        found
      }
      None => {
        tracing::debug!("no candidate exists for {logical_name}; returning it unchanged");
        logical_name.to_string()
      }
    }
  }

  /// Resolve `filename` relative to the directory containing `relative_file`.
  pub fn resolve_relative_to(&self, filename: &str, relative_file: &str) -> String {
    let (directory, _) = split_file_name(relative_file);
    let mapped = self.lookup.get(filename).unwrap_or(filename);
    format!("{directory}{mapped}")
  }

  /// Replace the search paths wholesale and clear the cache.
  pub fn set_search_paths(&mut self, search_paths: Vec<String>) {
    self.search_paths = search_paths;
    self.purge_cache();
  }

  /// Current search paths in priority order.
  pub fn search_paths(&self) -> &[String] {
    &self.search_paths
  }

  /// Replace the resolution order wholesale and clear the cache.
  pub fn set_resolution_order(&mut self, resolution_order: Vec<String>) {
    self.resolution_order = resolution_order;
    self.purge_cache();
  }

  /// Current resolution variants in priority order.
  pub fn resolution_order(&self) -> &[String] {
    &self.resolution_order
  }

  /// Replace the lookup table wholesale and clear the cache.
  pub fn set_lookup_table(&mut self, table: FilenameLookupTable) {
    self.lookup = table;
    self.purge_cache();
  }

  /// Currently installed lookup table.
  pub fn lookup_table(&self) -> &FilenameLookupTable {
    &self.lookup
  }

  /// Load the lookup table from a manifest, returning the number of remapped names.
  ///
  /// `path` is itself resolved through the search rules. On any failure the previously
  /// installed table stays in place and the error is returned.
  pub fn load_lookup_table(&mut self, path: &str) -> Result<usize> {
    let resolved = self.resolve(path);
    let bytes = self
      .backend
      .reader
      .read(&resolved, ReadMode::Binary)
      .inspect_err(|err| tracing::warn!("lookup manifest unavailable: {err}"))?;

    let manifest = parse_lookup_manifest(bytes.as_bytes(), &resolved)
      .inspect_err(|err| tracing::warn!("keeping previous lookup table: {err}"))?;

    let count = manifest.filenames.len();
    tracing::debug!("loaded {count} filename remappings from {resolved}");
    self.set_lookup_table(manifest.filenames);
    Ok(count)
  }

  /// Drop every cached resolution.
  pub fn purge_cache(&self) {
    self.cache.borrow_mut().clear();
  }

  /// Directory suitable for read/write scratch storage, ending in a separator.
  pub fn writable_directory(&self) -> &str {
    &self.writable_directory
  }

  /// Resolve `name` and read the resulting file through the byte-stream reader.
  pub fn read_resource(&self, name: &str, mode: ReadMode) -> Result<ResourceBuffer> {
    let resolved = self.resolve(name);
    self.backend.reader.read(&resolved, mode)
  }

  /// Resolve `archive_name` and extract `entry_name` from it through the archive reader.
  pub fn read_archive_entry(&self, archive_name: &str, entry_name: &str) -> Result<ResourceBuffer> {
    let resolved = self.resolve(archive_name);
    self.backend.archive.read_entry(&resolved, entry_name)
  }

  #[cfg(test)]
  fn cached_entries(&self) -> usize {
    self.cache.borrow().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeSet;
  use std::fs;
  use std::sync::{Arc, Mutex};

  use tempfile::tempdir;

  use crate::error::ResourceError;
  use crate::io::{ArchiveReader, ByteStreamReader, FileProbe};

  /// Probe over a fixed set of files that records every path it is asked about.
  #[derive(Clone, Default)]
  struct RecordingProbe {
    files: Arc<Mutex<BTreeSet<String>>>,
    probed: Arc<Mutex<Vec<String>>>,
  }

  impl RecordingProbe {
    fn with_files(files: &[&str]) -> Self {
      let probe = Self::default();
      probe.set_files(files);
      probe
    }

    fn set_files(&self, files: &[&str]) {
      *self.files.lock().unwrap() = files.iter().map(|file| file.to_string()).collect();
    }

    fn take_probed(&self) -> Vec<String> {
      std::mem::take(&mut *self.probed.lock().unwrap())
    }
  }

  impl FileProbe for RecordingProbe {
    fn is_file(&self, path: &str) -> bool {
      self.probed.lock().unwrap().push(path.to_string());
      self.files.lock().unwrap().contains(path)
    }
  }

  /// Reader serving in-memory files keyed by path.
  #[derive(Clone, Default)]
  struct MemoryReader {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
  }

  impl MemoryReader {
    fn insert(&self, path: &str, contents: &str) {
      self
        .files
        .lock()
        .unwrap()
        .insert(path.to_string(), contents.as_bytes().to_vec());
    }
  }

  impl ByteStreamReader for MemoryReader {
    fn read(&self, path: &str, _mode: ReadMode) -> Result<ResourceBuffer> {
      self
        .files
        .lock()
        .unwrap()
        .get(path)
        .cloned()
        .map(ResourceBuffer::new)
        .ok_or_else(|| ResourceError::not_found(path))
    }
  }

  impl ArchiveReader for MemoryReader {
    fn read_entry(&self, archive_path: &str, entry_name: &str) -> Result<ResourceBuffer> {
      self.read(&format!("{archive_path}#{entry_name}"), ReadMode::Binary)
    }
  }

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
  }

  fn resolver_with(probe: &RecordingProbe, reader: &MemoryReader) -> Resolver {
    let backend = Backend {
      probe: Box::new(probe.clone()),
      reader: Box::new(reader.clone()),
      archive: Box::new(reader.clone()),
    };
    Resolver::with_backend(&ResolverConfig::default(), backend)
  }

  fn scenario_resolver(probe: &RecordingProbe) -> Resolver {
    let mut resolver = resolver_with(probe, &MemoryReader::default());
    resolver.set_search_paths(strings(&["assets/", "fallback/"]));
    resolver.set_resolution_order(strings(&["hd", ""]));
    resolver.set_lookup_table([("a.png", "a2.png")].into_iter().collect());
    resolver
  }

  #[test]
  fn probes_search_paths_then_variants_in_order() {
    let probe = RecordingProbe::with_files(&["fallback/a2.png"]);
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "fallback/a2.png");
    assert_eq!(probe.take_probed(), strings(&[
      "assets/hd/a2.png",
      "assets/a2.png",
      "fallback/hd/a2.png",
      "fallback/a2.png",
    ]));
  }

  #[test]
  fn earlier_search_path_wins_over_earlier_variant() {
    let probe = RecordingProbe::with_files(&["assets/a2.png", "fallback/hd/a2.png"]);
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "assets/a2.png");
  }

  #[test]
  fn earlier_variant_wins_within_a_search_path() {
    let probe = RecordingProbe::with_files(&["assets/hd/a2.png", "assets/a2.png"]);
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "assets/hd/a2.png");
  }

  #[test]
  fn falls_back_to_unmapped_name_without_variants() {
    let probe = RecordingProbe::with_files(&["fallback/a.png", "fallback/hd/a.png"]);
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "fallback/a.png");
    let probed = probe.take_probed();
    assert_eq!(probed.last().map(String::as_str), Some("fallback/a.png"));
    assert!(!probed.contains(&"fallback/hd/a.png".to_string()));
  }

  #[test]
  fn returns_original_name_when_nothing_exists() {
    let probe = RecordingProbe::default();
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "a.png");
    assert_eq!(resolver.resolve("missing/b.png"), "missing/b.png");
  }

  #[test]
  fn empty_search_paths_yield_no_candidates() {
    let probe = RecordingProbe::with_files(&["a.png"]);
    let mut resolver = resolver_with(&probe, &MemoryReader::default());
    resolver.set_search_paths(Vec::new());

    assert_eq!(resolver.resolve("a.png"), "a.png");
    assert!(probe.take_probed().is_empty());
  }

  #[test]
  fn default_state_searches_the_working_directory() {
    let probe = RecordingProbe::with_files(&["a.png"]);
    let resolver = resolver_with(&probe, &MemoryReader::default());

    assert_eq!(resolver.search_paths(), &[String::new()]);
    assert_eq!(resolver.resolution_order(), &[String::new()]);
    assert_eq!(resolver.resolve("a.png"), "a.png");
    assert_eq!(probe.take_probed(), strings(&["a.png"]));
  }

  #[test]
  fn resolution_is_never_empty() {
    let probe = RecordingProbe::default();
    let resolver = scenario_resolver(&probe);

    for name in ["", "a.png", "/abs/a.png", "https://example.com/a.png", "dir/"] {
      assert!(!resolver.resolve(name).is_empty(), "{name:?}");
    }
  }

  #[test]
  fn absolute_names_are_not_searched() {
    let probe = RecordingProbe::default();
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("/opt/game/a.png"), "/opt/game/a.png");
    assert!(probe.take_probed().is_empty());
  }

  #[test]
  fn cache_serves_repeat_lookups_without_probing() {
    let probe = RecordingProbe::with_files(&["fallback/a2.png"]);
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "fallback/a2.png");
    probe.take_probed();

    assert_eq!(resolver.resolve("a.png"), "fallback/a2.png");
    assert!(probe.take_probed().is_empty());
    assert_eq!(resolver.cached_entries(), 1);
  }

  #[test]
  fn misses_are_not_cached() {
    let probe = RecordingProbe::default();
    let resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "a.png");
    assert_eq!(resolver.cached_entries(), 0);

    probe.set_files(&["assets/a2.png"]);
    assert_eq!(resolver.resolve("a.png"), "assets/a2.png");
  }

  #[test]
  fn purge_cache_does_not_change_results() {
    let probe = RecordingProbe::with_files(&["assets/hd/a2.png", "fallback/b.png"]);
    let resolver = scenario_resolver(&probe);

    let names = ["a.png", "b.png", "c.png"];
    let before: Vec<String> = names.iter().map(|name| resolver.resolve(name)).collect();
    resolver.purge_cache();
    assert_eq!(resolver.cached_entries(), 0);
    let after: Vec<String> = names.iter().map(|name| resolver.resolve(name)).collect();

    assert_eq!(before, after);
  }

  #[test]
  fn setters_invalidate_the_cache() {
    let probe = RecordingProbe::with_files(&["assets/a2.png", "fallback/hd/a2.png"]);
    let mut resolver = scenario_resolver(&probe);

    assert_eq!(resolver.resolve("a.png"), "assets/a2.png");
    resolver.set_search_paths(strings(&["fallback/"]));
    assert_eq!(resolver.cached_entries(), 0);
    assert_eq!(resolver.resolve("a.png"), "fallback/hd/a2.png");

    resolver.set_resolution_order(strings(&[""]));
    assert_eq!(resolver.resolve("a.png"), "a.png");

    resolver.set_lookup_table(FilenameLookupTable::new());
    assert_eq!(resolver.cached_entries(), 0);
  }

  #[test]
  fn disabled_cache_stores_nothing() {
    let probe = RecordingProbe::with_files(&["a.png"]);
    let config = ResolverConfig {
      cache_enabled: false,
      ..ResolverConfig::default()
    };
    let backend = Backend {
      probe: Box::new(probe.clone()),
      ..Backend::default()
    };
    let resolver = Resolver::with_backend(&config, backend);

    assert_eq!(resolver.resolve("a.png"), "a.png");
    assert_eq!(resolver.resolve("a.png"), "a.png");
    assert_eq!(resolver.cached_entries(), 0);
    assert_eq!(probe.take_probed().len(), 2);
  }

  #[test]
  fn variant_can_be_placed_before_the_file_name() {
    let probe = RecordingProbe::with_files(&["Resources/gamescene/iphone-hd/background.pvr.ccz"]);
    let config = ResolverConfig {
      search_paths: strings(&["Resources/"]),
      resolution_order: strings(&["iphone-hd", ""]),
      variant_placement: VariantPlacement::BeforeFileName,
      ..ResolverConfig::default()
    };
    let backend = Backend {
      probe: Box::new(probe.clone()),
      ..Backend::default()
    };
    let mut resolver = Resolver::with_backend(&config, backend);
    resolver.set_lookup_table(
      [("gamescene/background.png", "gamescene/background.pvr.ccz")]
        .into_iter()
        .collect(),
    );

    assert_eq!(
      resolver.resolve("gamescene/background.png"),
      "Resources/gamescene/iphone-hd/background.pvr.ccz"
    );
  }

  #[test]
  fn loads_lookup_table_from_manifest() {
    let probe = RecordingProbe::with_files(&["assets/lookup.plist", "assets/sounds/click.caf"]);
    let reader = MemoryReader::default();
    reader.insert(
      "assets/lookup.plist",
      r#"<plist><dict>
        <key>filenames</key>
        <dict><key>sounds/click.wav</key><string>sounds/click.caf</string></dict>
      </dict></plist>"#,
    );
    let mut resolver = resolver_with(&probe, &reader);
    resolver.set_search_paths(strings(&["assets/"]));

    assert_eq!(resolver.load_lookup_table("lookup.plist"), Ok(1));
    assert_eq!(resolver.lookup_table().get("sounds/click.wav"), Some("sounds/click.caf"));
    assert_eq!(resolver.resolve("sounds/click.wav"), "assets/sounds/click.caf");
  }

  #[test]
  fn malformed_manifest_keeps_previous_table() {
    let probe = RecordingProbe::with_files(&["broken.plist"]);
    let reader = MemoryReader::default();
    reader.insert("broken.plist", "<plist><dict><key>filenames</key><dict></plist>");
    let mut resolver = resolver_with(&probe, &reader);
    resolver.set_lookup_table([("a.png", "a2.png")].into_iter().collect());

    let err = resolver.load_lookup_table("broken.plist").unwrap_err();
    assert!(matches!(err, ResourceError::ManifestParse { .. }));
    assert_eq!(resolver.lookup_table().get("a.png"), Some("a2.png"));
  }

  #[test]
  fn missing_manifest_reports_not_found_and_keeps_table() {
    let probe = RecordingProbe::default();
    let mut resolver = resolver_with(&probe, &MemoryReader::default());
    resolver.set_lookup_table([("a.png", "a2.png")].into_iter().collect());

    let err = resolver.load_lookup_table("lookup.plist").unwrap_err();
    assert_eq!(err, ResourceError::not_found("lookup.plist"));
    assert_eq!(resolver.lookup_table().len(), 1);
  }

  #[test]
  fn reads_resolved_resources_and_archive_entries() {
    let probe = RecordingProbe::with_files(&["data/hd/level.json", "data/pack.zip"]);
    let reader = MemoryReader::default();
    reader.insert("data/hd/level.json", "{}");
    reader.insert("data/pack.zip#music/theme.ogg", "ogg");
    let mut resolver = resolver_with(&probe, &reader);
    resolver.set_search_paths(strings(&["data/"]));
    resolver.set_resolution_order(strings(&["hd", ""]));

    let buffer = resolver.read_resource("level.json", ReadMode::Binary).unwrap();
    assert_eq!(buffer.size(), 2);

    let entry = resolver.read_archive_entry("pack.zip", "music/theme.ogg").unwrap();
    assert_eq!(entry.as_bytes(), b"ogg");

    let err = resolver.read_resource("missing.json", ReadMode::Binary).unwrap_err();
    assert_eq!(err, ResourceError::not_found("missing.json"));
  }

  #[test]
  fn resolves_names_relative_to_another_file() {
    let resolver = Resolver::new();
    assert_eq!(
      resolver.resolve_relative_to("tiles.png", "maps/level1.tmx"),
      "maps/tiles.png"
    );
    assert_eq!(resolver.resolve_relative_to("tiles.png", "level1.tmx"), "tiles.png");
  }

  #[test]
  fn relative_resolution_applies_the_lookup_table() {
    let mut resolver = Resolver::new();
    resolver.set_lookup_table([("tiles.png", "tiles.pvr")].into_iter().collect());
    assert_eq!(
      resolver.resolve_relative_to("tiles.png", "maps/level1.tmx"),
      "maps/tiles.pvr"
    );
    assert_eq!(
      resolver.resolve_relative_to("other.png", "maps/level1.tmx"),
      "maps/other.png"
    );
  }

  #[test]
  fn resolves_against_real_directories() -> std::io::Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    fs::create_dir_all(root.join("assets/hd"))?;
    fs::create_dir_all(root.join("fallback"))?;
    fs::write(root.join("fallback/a2.png"), b"png")?;
    fs::write(
      root.join("assets/lookup.json"),
      r#"{"filenames": {"a.png": "a2.png"}}"#,
    )?;

    let base = root.to_string_lossy().replace('\\', "/");
    let config = ResolverConfig {
      search_paths: vec![format!("{base}/assets/"), format!("{base}/fallback/")],
      resolution_order: strings(&["hd", ""]),
      lookup_manifest: Some("lookup.json".into()),
      writable_dir: Some(format!("{base}/scratch")),
      ..ResolverConfig::default()
    };
    let resolver = Resolver::from_config(&config).unwrap();

    assert_eq!(resolver.resolve("a.png"), format!("{base}/fallback/a2.png"));
    assert!(resolver.writable_directory().starts_with(&format!("{base}/scratch")));

    let buffer = resolver.read_resource("a.png", ReadMode::Binary).unwrap();
    assert_eq!(buffer.as_bytes(), b"png");
    Ok(())
  }
}
