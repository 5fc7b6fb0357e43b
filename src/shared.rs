//! Process-scoped handle serialising access to a single [`Resolver`].

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::io::ReadMode;
use crate::models::{FilenameLookupTable, ResourceBuffer};
use crate::resolver::Resolver;

/// Cloneable handle over one resolver shared by the whole process.
///
/// Construct it once at startup and hand clones to whoever needs resolution; the resolver is
/// torn down when the last clone is dropped. Every operation takes the same exclusive lock, so
/// a `resolve` call always sees one consistent set of search paths, variants and lookup table.
#[derive(Debug, Clone)]
pub struct SharedResolver {
  inner: Arc<Mutex<Resolver>>,
}

impl SharedResolver {
  /// Take ownership of a resolver and share it.
  pub fn new(resolver: Resolver) -> Self {
    Self {
      inner: Arc::new(Mutex::new(resolver)),
    }
  }

  fn lock(&self) -> MutexGuard<'_, Resolver> {
    // Setters swap whole values; a poisoned lock still guards a consistent resolver.
    self
      .inner
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// See [`Resolver::resolve`].
  pub fn resolve(&self, logical_name: &str) -> String {
    self.lock().resolve(logical_name)
  }

  /// See [`Resolver::resolve_relative_to`].
  pub fn resolve_relative_to(&self, filename: &str, relative_file: &str) -> String {
    self.lock().resolve_relative_to(filename, relative_file)
  }

  /// See [`Resolver::set_search_paths`].
  pub fn set_search_paths(&self, search_paths: Vec<String>) {
    self.lock().set_search_paths(search_paths);
  }

  /// Snapshot of the current search paths.
  pub fn search_paths(&self) -> Vec<String> {
    self.lock().search_paths().to_vec()
  }

  /// See [`Resolver::set_resolution_order`].
  pub fn set_resolution_order(&self, resolution_order: Vec<String>) {
    self.lock().set_resolution_order(resolution_order);
  }

  /// Snapshot of the current resolution order.
  pub fn resolution_order(&self) -> Vec<String> {
    self.lock().resolution_order().to_vec()
  }

  /// See [`Resolver::set_lookup_table`].
  pub fn set_lookup_table(&self, table: FilenameLookupTable) {
    self.lock().set_lookup_table(table);
  }

  /// Snapshot of the current lookup table.
  pub fn lookup_table(&self) -> FilenameLookupTable {
    self.lock().lookup_table().clone()
  }

  /// See [`Resolver::load_lookup_table`].
  pub fn load_lookup_table(&self, path: &str) -> Result<usize> {
    self.lock().load_lookup_table(path)
  }

  /// See [`Resolver::purge_cache`].
  pub fn purge_cache(&self) {
    self.lock().purge_cache();
  }

  /// See [`Resolver::writable_directory`].
  pub fn writable_directory(&self) -> String {
    self.lock().writable_directory().to_string()
  }

  /// See [`Resolver::read_resource`].
  pub fn read_resource(&self, name: &str, mode: ReadMode) -> Result<ResourceBuffer> {
    self.lock().read_resource(name, mode)
  }

  /// See [`Resolver::read_archive_entry`].
  pub fn read_archive_entry(&self, archive_name: &str, entry_name: &str) -> Result<ResourceBuffer> {
    self.lock().read_archive_entry(archive_name, entry_name)
  }
}
