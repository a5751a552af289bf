//! Format Codecs
//!
//! Serialization between raw file bytes and an in-memory [`Document`]. Each
//! supported on-disk format has one codec; the format is selected once from
//! the file-name suffix and fixed for the lifetime of a store.

pub mod properties;
pub mod yaml;

use std::fmt;
use std::path::Path;

use crate::document::Document;
use crate::error::Result;

pub use properties::PropertiesCodec;
pub use yaml::YamlCodec;

/// Supported on-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Structured YAML (`.yml`, `.yaml`)
    Yaml,
    /// Flat `key=value` pairs (`.properties`, `.conf`)
    Properties,
}

impl Format {
    /// Derive the format from a file name's suffix
    ///
    /// Returns `None` for unrecognized suffixes; callers treat that as a
    /// construction-time configuration error.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Some(Format::Yaml),
            "properties" | "conf" => Some(Format::Properties),
            _ => None,
        }
    }

    /// The codec implementing this format
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Format::Yaml => &YamlCodec,
            Format::Properties => &PropertiesCodec,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => write!(f, "yaml"),
            Format::Properties => write!(f, "properties"),
        }
    }
}

/// Serializer/deserializer for one on-disk configuration format
///
/// Decoding empty input yields an empty document rather than an error, so a
/// freshly materialized file never fails its first load. Keys the caller never
/// touches round-trip through decode/encode unchanged.
pub trait Codec: Send + Sync {
    /// Decode raw file bytes into a document
    fn decode(&self, bytes: &[u8]) -> Result<Document>;

    /// Encode a document (header included) into file bytes
    ///
    /// An encode failure surfaces through the store as a save error rather
    /// than silently writing a truncated file.
    fn encode(&self, document: &Document) -> Result<Vec<u8>>;
}

/// Split the leading `#` comment block off a file body
///
/// Consumes at most one blank separator line after the block. Returns the
/// header lines (comment markers stripped) and the remaining body text.
pub(crate) fn split_header(text: &str) -> (Vec<String>, &str) {
    let mut header = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if let Some(rest) = trimmed.strip_prefix('#') {
            header.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            offset += line.len();
        } else if trimmed.is_empty() && !header.is_empty() {
            offset += line.len();
            break;
        } else {
            break;
        }
    }
    (header, &text[offset..])
}

/// Render header lines as a `#`-prefixed comment block
pub(crate) fn render_header(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        if line.is_empty() {
            out.push('#');
        } else {
            out.push_str("# ");
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(Format::from_file_name("config.yml"), Some(Format::Yaml));
        assert_eq!(Format::from_file_name("config.yaml"), Some(Format::Yaml));
        assert_eq!(
            Format::from_file_name("app.properties"),
            Some(Format::Properties)
        );
        assert_eq!(Format::from_file_name("app.conf"), Some(Format::Properties));
        assert_eq!(Format::from_file_name("app.json"), None);
        assert_eq!(Format::from_file_name("noextension"), None);
    }

    #[test]
    fn test_split_header_takes_leading_comment_block() {
        let (header, body) = split_header("# first\n# second\n\nkey: value\n");
        assert_eq!(header, ["first", "second"]);
        assert_eq!(body, "key: value\n");
    }

    #[test]
    fn test_split_header_without_comments() {
        let (header, body) = split_header("key: value\n");
        assert!(header.is_empty());
        assert_eq!(body, "key: value\n");
    }

    #[test]
    fn test_header_render_round_trip() {
        let lines = vec!["one".to_string(), String::new(), "two".to_string()];
        let rendered = render_header(&lines);
        let (parsed, rest) = split_header(&rendered);
        assert_eq!(parsed, lines);
        assert!(rest.is_empty());
    }
}
