//! Minimal property-list XML reader covering the value kinds used by lookup manifests.

use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose};
use quick_xml::Reader;
use quick_xml::events::Event;

/// A single property-list value.
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
  /// `<dict>` with keys in sorted order.
  Dict(BTreeMap<String, PlistValue>),
  /// `<array>`.
  Array(Vec<PlistValue>),
  /// `<string>`.
  String(String),
  /// `<integer>`.
  Integer(i64),
  /// `<real>`.
  Real(f64),
  /// `<true/>` or `<false/>`.
  Boolean(bool),
  /// `<date>`, kept as its ISO 8601 text.
  Date(String),
  /// `<data>`, base64-decoded.
  Data(Vec<u8>),
}

impl PlistValue {
  /// Borrow the dictionary entries when the value is a `<dict>`.
  pub fn as_dict(&self) -> Option<&BTreeMap<String, PlistValue>> {
    match self {
      Self::Dict(entries) => Some(entries),
      _ => None,
    }
  }

  /// Borrow the text when the value is a `<string>`.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(value) => Some(value),
      _ => None,
    }
  }

  /// Integer payload when the value is an `<integer>`.
  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(value) => Some(*value),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
  Key,
  String,
  Integer,
  Real,
  Boolean(bool),
  Date,
  Data,
}

impl ScalarKind {
  fn from_tag(tag: &str) -> Option<Self> {
    match tag {
      "key" => Some(Self::Key),
      "string" => Some(Self::String),
      "integer" => Some(Self::Integer),
      "real" => Some(Self::Real),
      "true" => Some(Self::Boolean(true)),
      "false" => Some(Self::Boolean(false)),
      "date" => Some(Self::Date),
      "data" => Some(Self::Data),
      _ => None,
    }
  }
}

enum Frame {
  Plist,
  Dict {
    entries: BTreeMap<String, PlistValue>,
    pending_key: Option<String>,
  },
  Array(Vec<PlistValue>),
  Scalar { kind: ScalarKind, text: String },
}

enum Completed {
  Key(String),
  Value(PlistValue),
}

/// Parse a property-list XML document and return its root value.
///
/// Errors are plain messages; callers wrap them with the name of the source being parsed.
pub fn parse_plist(xml: &str) -> Result<PlistValue, String> {
  let mut reader = Reader::from_str(xml);
  let mut parser = PlistParser::default();

  loop {
    let position = reader.buffer_position();
    let event = reader
      .read_event()
      .map_err(|err| format!("invalid XML at byte {position}: {err}"))?;

    match event {
      Event::Start(ref e) => {
        let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
        parser.open(&tag)?;
      }
      Event::Empty(ref e) => {
        let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
        parser.open(&tag)?;
        parser.close()?;
      }
      Event::End(_) => parser.close()?,
      Event::Text(ref e) => {
        let text = e
          .unescape()
          .map_err(|err| format!("invalid text at byte {position}: {err}"))?;
        parser.text(&text)?;
      }
      Event::CData(ref e) => parser.text(&String::from_utf8_lossy(e))?,
      Event::Eof => break,
      _ => {}
    }
  }

  parser.finish()
}

#[derive(Default)]
struct PlistParser {
  stack: Vec<Frame>,
  root: Option<PlistValue>,
}

impl PlistParser {
  fn open(&mut self, tag: &str) -> Result<(), String> {
    let frame = match tag {
      "plist" => Frame::Plist,
      "dict" => Frame::Dict {
        entries: BTreeMap::new(),
        pending_key: None,
      },
      "array" => Frame::Array(Vec::new()),
      other => match ScalarKind::from_tag(other) {
        Some(kind) => Frame::Scalar {
          kind,
          text: String::new(),
        },
        None => return Err(format!("unsupported element <{other}>")),
      },
    };
    self.stack.push(frame);
    Ok(())
  }

  fn text(&mut self, value: &str) -> Result<(), String> {
    match self.stack.last_mut() {
      Some(Frame::Scalar { text, .. }) => {
        text.push_str(value);
        Ok(())
      }
      _ if value.trim().is_empty() => Ok(()),
      _ => Err(format!("unexpected text {:?}", value.trim())),
    }
  }

  fn close(&mut self) -> Result<(), String> {
    let frame = self
      .stack
      .pop()
      .ok_or_else(|| "unbalanced closing element".to_string())?;

    let completed = match frame {
      Frame::Plist => return Ok(()),
      Frame::Dict {
        entries,
        pending_key,
      } => {
        if let Some(key) = pending_key {
          return Err(format!("key {key:?} has no value"));
        }
        Completed::Value(PlistValue::Dict(entries))
      }
      Frame::Array(items) => Completed::Value(PlistValue::Array(items)),
      Frame::Scalar { kind, text } => scalar_value(kind, text)?,
    };

    self.attach(completed)
  }

  fn attach(&mut self, completed: Completed) -> Result<(), String> {
    match (self.stack.last_mut(), completed) {
      (
        Some(Frame::Dict {
          pending_key: slot @ None,
          ..
        }),
        Completed::Key(key),
      ) => {
        *slot = Some(key);
        Ok(())
      }
      (Some(Frame::Dict { pending_key: Some(key), .. }), Completed::Key(_)) => {
        Err(format!("key {key:?} has no value"))
      }
      (
        Some(Frame::Dict {
          entries,
          pending_key,
        }),
        Completed::Value(value),
      ) => match pending_key.take() {
        Some(key) => {
          entries.insert(key, value);
          Ok(())
        }
        None => Err("dictionary value without a key".to_string()),
      },
      (Some(Frame::Array(items)), Completed::Value(value)) => {
        items.push(value);
        Ok(())
      }
      (Some(Frame::Plist) | None, Completed::Value(value)) => {
        if self.root.is_some() {
          return Err("document has more than one root value".to_string());
        }
        self.root = Some(value);
        Ok(())
      }
      (_, Completed::Key(key)) => Err(format!("key {key:?} outside of a dictionary")),
      (Some(Frame::Scalar { .. }), Completed::Value(_)) => {
        Err("nested element inside a scalar value".to_string())
      }
    }
  }

  fn finish(self) -> Result<PlistValue, String> {
    if !self.stack.is_empty() {
      return Err("unexpected end of document".to_string());
    }
    self
      .root
      .ok_or_else(|| "document has no root value".to_string())
  }
}

fn scalar_value(kind: ScalarKind, text: String) -> Result<Completed, String> {
  let value = match kind {
    ScalarKind::Key => return Ok(Completed::Key(text)),
    ScalarKind::String => PlistValue::String(text),
    ScalarKind::Integer => {
      let trimmed = text.trim();
      let parsed = trimmed
        .parse::<i64>()
        .map_err(|_| format!("invalid integer {trimmed:?}"))?;
      PlistValue::Integer(parsed)
    }
    ScalarKind::Real => {
      let trimmed = text.trim();
      let parsed = trimmed
        .parse::<f64>()
        .map_err(|_| format!("invalid real {trimmed:?}"))?;
      PlistValue::Real(parsed)
    }
    ScalarKind::Boolean(value) => PlistValue::Boolean(value),
    ScalarKind::Date => PlistValue::Date(text.trim().to_string()),
    ScalarKind::Data => {
      let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
      let decoded = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| format!("invalid base64 data: {err}"))?;
      PlistValue::Data(decoded)
    }
  };
  Ok(Completed::Value(value))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_nested_dictionaries() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>filenames</key>
    <dict>
        <key>sounds/click.wav</key>
        <string>sounds/click.caf</string>
    </dict>
    <key>metadata</key>
    <dict>
        <key>version</key>
        <integer>1</integer>
    </dict>
</dict>
</plist>"#;

    let root = parse_plist(xml).unwrap();
    let dict = root.as_dict().unwrap();
    let filenames = dict["filenames"].as_dict().unwrap();
    assert_eq!(filenames["sounds/click.wav"].as_str(), Some("sounds/click.caf"));
    let metadata = dict["metadata"].as_dict().unwrap();
    assert_eq!(metadata["version"].as_integer(), Some(1));
  }

  #[test]
  fn parses_arrays_booleans_reals_and_data() {
    let xml = r#"<plist><dict>
      <key>flags</key><array><true/><false/></array>
      <key>scale</key><real>2.5</real>
      <key>blob</key><data>aGVsbG8=</data>
      <key>empty</key><string/>
      <key>escaped</key><string>a &amp; b</string>
    </dict></plist>"#;

    let root = parse_plist(xml).unwrap();
    let dict = root.as_dict().unwrap();
    assert_eq!(
      dict["flags"],
      PlistValue::Array(vec![PlistValue::Boolean(true), PlistValue::Boolean(false)])
    );
    assert_eq!(dict["scale"], PlistValue::Real(2.5));
    assert_eq!(dict["blob"], PlistValue::Data(b"hello".to_vec()));
    assert_eq!(dict["empty"].as_str(), Some(""));
    assert_eq!(dict["escaped"].as_str(), Some("a & b"));
  }

  #[test]
  fn accepts_documents_without_plist_wrapper() {
    let root = parse_plist("<dict><key>a</key><string>b</string></dict>").unwrap();
    assert_eq!(root.as_dict().unwrap()["a"].as_str(), Some("b"));
  }

  #[test]
  fn rejects_mismatched_elements() {
    let err = parse_plist("<plist><dict><key>a</key><string>b</key></dict></plist>").unwrap_err();
    assert!(err.contains("invalid XML"), "{err}");
  }

  #[test]
  fn rejects_truncated_documents() {
    let err = parse_plist("<plist><dict><key>a</key>").unwrap_err();
    assert!(!err.is_empty());
  }

  #[test]
  fn rejects_keys_without_values() {
    let err = parse_plist("<dict><key>a</key></dict>").unwrap_err();
    assert!(err.contains("has no value"), "{err}");
  }

  #[test]
  fn rejects_invalid_integers() {
    let err = parse_plist("<dict><key>a</key><integer>one</integer></dict>").unwrap_err();
    assert!(err.contains("invalid integer"), "{err}");
  }

  #[test]
  fn rejects_unknown_elements() {
    let err = parse_plist("<dict><key>a</key><widget/></dict>").unwrap_err();
    assert!(err.contains("unsupported element"), "{err}");
  }

  #[test]
  fn rejects_empty_documents() {
    let err = parse_plist("").unwrap_err();
    assert_eq!(err, "document has no root value");
  }
}
