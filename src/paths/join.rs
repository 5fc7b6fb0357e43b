/// Whether `\` separates path components on the target platform.
const BACKSLASH_IS_SEPARATOR: bool = cfg!(windows);

/// Join path segments into a single resource path.
///
/// Empty segments are skipped and runs of separators collapse to one, so
/// `"assets/" + "hd" + "/a.png"` becomes `"assets/hd/a.png"`. On Windows backslashes are
/// rewritten to forward slashes first; elsewhere a backslash is an ordinary filename
/// character and is left alone. A leading separator is preserved, and a leading double
/// separator (a UNC share such as `\\server\share`) stays doubled.
pub fn join_resource_path(segments: &[&str]) -> String {
  join_with_separators(segments, BACKSLASH_IS_SEPARATOR)
}

/// Split a resource name into its directory portion (with trailing separator) and file name.
pub fn split_file_name(name: &str) -> (&str, &str) {
  split_with_separators(name, BACKSLASH_IS_SEPARATOR)
}

fn join_with_separators(segments: &[&str], backslash_is_separator: bool) -> String {
  let mut joined = String::new();
  for segment in segments.iter().filter(|segment| !segment.is_empty()) {
    if !joined.is_empty() {
      joined.push('/');
    }
    joined.push_str(segment);
  }

  if backslash_is_separator {
    joined = joined.replace('\\', "/");
  }
  collapse_separators(&joined)
}

fn split_with_separators(name: &str, backslash_is_separator: bool) -> (&str, &str) {
  let index = if backslash_is_separator {
    name.rfind(['/', '\\'])
  } else {
    name.rfind('/')
  };
  match index {
    Some(index) => name.split_at(index + 1),
    None => ("", name),
  }
}

fn collapse_separators(path: &str) -> String {
  let (prefix, rest) = match path.strip_prefix("//") {
    Some(rest) => ("//", rest.trim_start_matches('/')),
    None => ("", path),
  };

  let mut result = String::with_capacity(path.len());
  result.push_str(prefix);
  let mut previous_was_separator = false;
  for ch in rest.chars() {
    if ch == '/' {
      if previous_was_separator {
        continue;
      }
      previous_was_separator = true;
    } else {
      previous_was_separator = false;
    }
    result.push(ch);
  }
  result
}
