//! Properties Codec
//!
//! Flat `key=value` codec for `.properties` and `.conf` files. Decoded keys
//! stay flat exactly as they appear on disk, so `a=1` and `a.b=2` can coexist;
//! the document's literal-key lookup serves dotted reads directly. Sections
//! created through the store's `set` flatten back to dotted lines on encode.
//! All values are string-backed; typed reads go through the document's
//! coercing accessors.

use super::{render_header, split_header, Codec, Format};
use crate::document::{Document, Value};
use crate::error::{ConfigError, Result};

/// Codec for flat key=value documents
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesCodec;

impl Codec for PropertiesCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Document> {
        let text = std::str::from_utf8(bytes).map_err(|e| ConfigError::Parse {
            format: Format::Properties,
            details: e.to_string(),
        })?;
        let (header, body) = split_header(text);

        let mut document = Document::new();
        document.set_header(header);
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = match line.split_once(['=', ':']) {
                Some((key, value)) => (key.trim(), value.trim()),
                // A bare key carries an empty value
                None => (line, ""),
            };
            if key.is_empty() {
                continue;
            }
            document.insert_raw(key.to_string(), Value::String(value.to_string()));
        }
        Ok(document)
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>> {
        let mut out = render_header(document.header());
        if !document.header().is_empty() && !document.is_empty() {
            out.push('\n');
        }
        flatten_into(document, None, &mut out);
        Ok(out.into_bytes())
    }
}

fn flatten_into(document: &Document, prefix: Option<&str>, out: &mut String) {
    for (key, value) in document.entries() {
        let full_key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Section(section) => flatten_into(section, Some(&full_key), out),
            Value::String(v) => push_pair(out, &full_key, v),
            Value::Int(v) => push_pair(out, &full_key, &v.to_string()),
            Value::Bool(v) => push_pair(out, &full_key, &v.to_string()),
            // The flat format has no null representation
            Value::Null => {}
        }
    }
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    out.push_str(value);
    out.push('\n');
}
