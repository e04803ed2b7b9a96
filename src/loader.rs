//! Document loading.
//!
//! Reads the browser's session file and materializes it as a
//! [`DynamicValue`]. Property lists (binary or XML) are the native
//! format; JSON exports of the same tree are accepted too.

use anyhow::{Context, Result};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::value::DynamicValue;

/// Location of the session file relative to `$HOME`.
const DEFAULT_SOURCE_RELATIVE: &str = "Library/Safari/RecentlyClosedTabs.plist";

/// Serialization of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Plist,
    Json,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Plist => write!(f, "plist"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

impl SourceFormat {
    /// Guess the format from the file extension, then from the first byte.
    ///
    /// `.json` files and documents starting with `{` or `[` are JSON;
    /// everything else is handed to the plist parser, which recognizes
    /// both the binary and the XML flavour on its own.
    pub fn detect(path: &Path, bytes: &[u8]) -> Self {
        if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        {
            return SourceFormat::Json;
        }
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') | Some(b'[') => SourceFormat::Json,
            _ => SourceFormat::Plist,
        }
    }
}

/// Default session file for a given home directory.
pub fn default_source_path(home: &Path) -> PathBuf {
    home.join(DEFAULT_SOURCE_RELATIVE)
}

/// Read and parse the document at `path`.
pub fn load_document(path: &Path) -> Result<DynamicValue> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let format = SourceFormat::detect(path, &bytes);
    parse_document(&bytes, format)
        .with_context(|| format!("failed to parse {} as {}", path.display(), format))
}

/// Parse an in-memory document.
pub fn parse_document(bytes: &[u8], format: SourceFormat) -> Result<DynamicValue> {
    match format {
        SourceFormat::Plist => {
            let value = plist::Value::from_reader(Cursor::new(bytes))
                .context("invalid property list")?;
            Ok(DynamicValue::from(value))
        }
        SourceFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_slice(bytes).context("invalid JSON document")?;
            Ok(DynamicValue::from(value))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const XML_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Second</key>
    <string>b</string>
    <key>First</key>
    <integer>1</integer>
    <key>When</key>
    <date>2024-03-01T10:00:00Z</date>
</dict>
</plist>
"#;

    // -----------------------------------------------------------------------
    // SourceFormat::detect
    // -----------------------------------------------------------------------

    #[test]
    fn test_detect_json_by_extension() {
        assert_eq!(
            SourceFormat::detect(Path::new("export.JSON"), b"<plist/>"),
            SourceFormat::Json
        );
    }

    #[test]
    fn test_detect_json_by_leading_byte() {
        assert_eq!(
            SourceFormat::detect(Path::new("tabs.dat"), b"  \n{\"a\":1}"),
            SourceFormat::Json
        );
        assert_eq!(
            SourceFormat::detect(Path::new("tabs.dat"), b"[1]"),
            SourceFormat::Json
        );
    }

    #[test]
    fn test_detect_plist_otherwise() {
        assert_eq!(
            SourceFormat::detect(Path::new("tabs.plist"), b"bplist00"),
            SourceFormat::Plist
        );
        assert_eq!(
            SourceFormat::detect(Path::new("tabs.plist"), XML_PLIST.as_bytes()),
            SourceFormat::Plist
        );
        assert_eq!(SourceFormat::detect(Path::new("empty"), b""), SourceFormat::Plist);
    }

    // -----------------------------------------------------------------------
    // parse_document / load_document
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_xml_plist_keeps_order_and_dates() {
        let value = parse_document(XML_PLIST.as_bytes(), SourceFormat::Plist).unwrap();
        let map = value.as_dict().unwrap();
        let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Second", "First", "When"]);
        assert_eq!(map["First"], DynamicValue::Int(1));
        assert!(map["When"].as_timestamp().is_some());
    }

    #[test]
    fn test_parse_binary_plist() {
        let mut dict = plist::Dictionary::new();
        dict.insert("TabURL".into(), plist::Value::String("https://a.example".into()));
        let mut buf = Vec::new();
        plist::Value::Dictionary(dict).to_writer_binary(&mut buf).unwrap();

        let value = parse_document(&buf, SourceFormat::Plist).unwrap();
        assert_eq!(value.get("TabURL").and_then(DynamicValue::as_str), Some("https://a.example"));
    }

    #[test]
    fn test_parse_invalid_documents_error() {
        assert!(parse_document(b"definitely not a plist", SourceFormat::Plist).is_err());
        assert!(parse_document(b"{oops", SourceFormat::Json).is_err());
    }

    #[test]
    fn test_load_document_reads_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        fs::write(&path, r#"{"b": "x", "a": [1, 2]}"#).unwrap();

        let value = load_document(&path).unwrap();
        let keys: Vec<&str> = value.as_dict().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_load_document_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.plist");
        let err = load_document(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.plist"));
    }

    #[test]
    fn test_load_document_parse_error_names_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.plist");
        fs::write(&path, "garbage").unwrap();
        let err = load_document(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("broken.plist"));
        assert!(msg.contains("plist"));
    }

    #[test]
    fn test_default_source_path() {
        let path = default_source_path(Path::new("/Users/foo"));
        assert_eq!(
            path,
            PathBuf::from("/Users/foo/Library/Safari/RecentlyClosedTabs.plist")
        );
    }
}
