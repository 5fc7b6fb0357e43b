use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use resource_resolver::{ReadMode, Resolver, ResolverConfig};

#[derive(Parser)]
#[command(
  name = "resource-resolver",
  about = "Resolve logical resource names into concrete paths"
)]
struct Cli {
  /// Configuration file (default: resolver.config.json in the current directory)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,
  /// Search path, repeatable; replaces the configured search paths
  #[arg(short = 's', long = "search-path", global = true)]
  search_paths: Vec<String>,
  /// Resolution variant, repeatable; replaces the configured resolution order
  #[arg(short = 'r', long = "variant", global = true)]
  variants: Vec<String>,
  /// Lookup manifest to load before resolving
  #[arg(short, long, global = true)]
  lookup: Option<String>,
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the concrete path for each logical name
  Resolve {
    /// Logical names to resolve
    #[arg(required = true)]
    names: Vec<String>,
  },
  /// Resolve a name and report the size of its contents
  Read {
    /// Logical name to read
    name: String,
    /// fopen-style read mode
    #[arg(short, long, default_value = "rb")]
    mode: String,
  },
  /// Resolve an archive and report the size of one of its entries
  Archive {
    /// Logical name of the archive
    archive: String,
    /// Entry to extract
    entry: String,
  },
  /// Print the writable directory
  WritableDir,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
  let mut config = match &cli.config {
    Some(path) => ResolverConfig::load_from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display()))?,
    None => {
      let cwd = std::env::current_dir().context("failed to read current directory")?;
      ResolverConfig::discover(&cwd)
    }
  };

  if !cli.search_paths.is_empty() {
    config.search_paths = cli.search_paths;
  }
  if !cli.variants.is_empty() {
    config.resolution_order = cli.variants;
  }
  if cli.lookup.is_some() {
    config.lookup_manifest = cli.lookup;
  }

  let resolver = Resolver::from_config(&config).context("failed to initialise resolver")?;

  match cli.command {
    Commands::Resolve { names } => {
      for name in names {
        println!("{}", resolver.resolve(&name));
      }
    }
    Commands::Read { name, mode } => {
      let mode: ReadMode = mode.parse().map_err(anyhow::Error::msg)?;
      let buffer = resolver
        .read_resource(&name, mode)
        .with_context(|| format!("failed to read {name}"))?;
      println!("{}\t{} bytes", resolver.resolve(&name), buffer.size());
    }
    Commands::Archive { archive, entry } => {
      let buffer = resolver
        .read_archive_entry(&archive, &entry)
        .with_context(|| format!("failed to read {entry} from {archive}"))?;
      println!("{}#{entry}\t{} bytes", resolver.resolve(&archive), buffer.size());
    }
    Commands::WritableDir => println!("{}", resolver.writable_directory()),
  }

  Ok(())
}
