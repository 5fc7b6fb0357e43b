//! Helpers for joining, filtering and expanding resource paths.
//!
//! Path joining, the pass-through filter and candidate expansion live in separate submodules
//! so each can be tested on its own. The resolver only consumes the ordered candidate list.

mod candidates;
mod filters;
mod join;

pub use candidates::generate_candidates;
pub use filters::is_passthrough_name;
pub use join::{join_resource_path, split_file_name};
