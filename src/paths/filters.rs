use std::path::Path;

use regex::Regex;

fn passthrough_patterns() -> &'static [Regex] {
  use std::sync::OnceLock;

  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"(?i)^(https?|file)://").expect("invalid url regex"),
        Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
        Regex::new(r"^/").expect("invalid root regex"),
        Regex::new(r"^[A-Za-z]:[\\/]").expect("invalid drive regex"),
        Regex::new(r"^\\\\").expect("invalid UNC regex"),
      ]
    })
    .as_slice()
}

/// Determine whether a requested name bypasses the search rules entirely.
///
/// Absolute paths already name a concrete file and URLs are never local resources, so both are
/// handed back to the caller untouched.
pub fn is_passthrough_name(name: &str) -> bool {
  Path::new(name).is_absolute()
    || passthrough_patterns()
      .iter()
      .any(|pattern| pattern.is_match(name))
}
