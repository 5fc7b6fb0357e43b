#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod io;
pub mod manifest;
pub mod models;
pub mod paths;
pub mod resolver;
pub mod shared;

pub use config::ResolverConfig;
pub use error::{ConfigError, ResourceError, Result};
pub use io::{ArchiveReader, Backend, ByteStreamReader, FileProbe, ReadMode};
pub use models::{FilenameLookupTable, LookupManifest, ResourceBuffer, VariantPlacement};
pub use resolver::Resolver;
pub use shared::SharedResolver;
