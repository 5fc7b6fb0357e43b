use std::collections::BTreeSet;

use crate::models::VariantPlacement;
use crate::paths::join::{join_resource_path, split_file_name};

/// Generate the ordered list of concrete paths probed for a requested name.
///
/// Variant candidates for `mapped_name` come first, search path by search path and variant by
/// variant within each. They are followed by the variant-free fallback for the unmapped
/// `logical_name` under each search path. Duplicates keep their first position.
pub fn generate_candidates(
  search_paths: &[String],
  resolution_order: &[String],
  placement: VariantPlacement,
  mapped_name: &str,
  logical_name: &str,
) -> Vec<String> {
  let mut builder = CandidateBuilder::new(search_paths, placement);

  builder.add_variant_candidates(resolution_order, mapped_name);
  builder.add_root_fallbacks(logical_name);

  builder.finish()
}

struct CandidateBuilder<'a> {
  search_paths: &'a [String],
  placement: VariantPlacement,
  seen: BTreeSet<String>,
  result: Vec<String>,
}

impl<'a> CandidateBuilder<'a> {
  fn new(search_paths: &'a [String], placement: VariantPlacement) -> Self {
    Self {
      search_paths,
      placement,
      seen: BTreeSet::new(),
      result: Vec::new(),
    }
  }

  fn add_variant_candidates(&mut self, resolution_order: &[String], name: &str) {
    let (directory, file_name) = split_file_name(name);
    for root in self.search_paths {
      for variant in resolution_order {
        let candidate = match self.placement {
          VariantPlacement::Prefix => {
            join_resource_path(&[root.as_str(), variant.as_str(), name])
          }
          VariantPlacement::BeforeFileName => {
            join_resource_path(&[root.as_str(), directory, variant.as_str(), file_name])
          }
        };
        self.push(candidate);
      }
    }
  }

  fn add_root_fallbacks(&mut self, name: &str) {
    for root in self.search_paths {
      let candidate = join_resource_path(&[root.as_str(), name]);
      self.push(candidate);
    }
  }

  fn finish(self) -> Vec<String> {
    self.result
  }

  fn push(&mut self, candidate: String) {
    if candidate.is_empty() {
      return;
    }
    if self.seen.insert(candidate.clone()) {
      self.result.push(candidate);
    }
  }
}
