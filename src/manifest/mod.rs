//! Lookup manifest parsing split into the property-list reader and the manifest loader.

mod lookup;
mod plist;

pub use lookup::{SUPPORTED_MANIFEST_VERSION, parse_lookup_manifest};
pub use plist::{PlistValue, parse_plist};
