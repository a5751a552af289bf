//! YAML Codec
//!
//! Structured codec for `.yml`/`.yaml` files, backed by `serde_yaml`. The
//! header comment block is carried as leading `#` lines above the mapping.

use serde_yaml::{Mapping, Value as YamlValue};
use tracing::debug;

use super::{render_header, split_header, Codec, Format};
use crate::document::{Document, Value};
use crate::error::{ConfigError, Result};

/// Codec for structured YAML documents
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Document> {
        let text = std::str::from_utf8(bytes).map_err(|e| parse_error(e))?;
        let (header, body) = split_header(text);

        let mut document = if body.trim().is_empty() {
            Document::new()
        } else {
            let root: YamlValue = serde_yaml::from_str(body).map_err(|e| parse_error(e))?;
            match root {
                YamlValue::Mapping(mapping) => mapping_to_document(&mapping),
                YamlValue::Null => Document::new(),
                other => {
                    return Err(parse_error(format!(
                        "expected a mapping at the document root, found {}",
                        yaml_kind(&other)
                    )))
                }
            }
        };
        document.set_header(header);
        Ok(document)
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>> {
        let mut out = render_header(document.header());
        if !document.is_empty() {
            let body = YamlValue::Mapping(document_to_mapping(document));
            let text = serde_yaml::to_string(&body).map_err(|e| parse_error(e))?;
            out.push_str(&text);
        }
        Ok(out.into_bytes())
    }
}

fn parse_error(details: impl ToString) -> ConfigError {
    ConfigError::Parse {
        format: Format::Yaml,
        details: details.to_string(),
    }
}

fn mapping_to_document(mapping: &Mapping) -> Document {
    let mut document = Document::new();
    for (key, value) in mapping {
        let Some(key) = scalar_key(key) else {
            debug!("Skipping YAML entry with non-scalar key");
            continue;
        };
        match yaml_to_value(value) {
            Some(value) => document.insert_raw(key, value),
            None => debug!("Skipping unrepresentable YAML value for key '{}'", key),
        }
    }
    document
}

fn scalar_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_to_value(value: &YamlValue) -> Option<Value> {
    match value {
        YamlValue::Null => Some(Value::Null),
        YamlValue::Bool(b) => Some(Value::Bool(*b)),
        YamlValue::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Int(i),
            // Out-of-domain numbers (floats) keep their text rendering
            None => Value::String(n.to_string()),
        }),
        YamlValue::String(s) => Some(Value::String(s.clone())),
        YamlValue::Mapping(mapping) => Some(Value::Section(mapping_to_document(mapping))),
        YamlValue::Sequence(_) | YamlValue::Tagged(_) => None,
    }
}

fn document_to_mapping(document: &Document) -> Mapping {
    let mut mapping = Mapping::new();
    for (key, value) in document.entries() {
        mapping.insert(YamlValue::String(key.clone()), value_to_yaml(value));
    }
    mapping
}

fn value_to_yaml(value: &Value) -> YamlValue {
    match value {
        Value::Null => YamlValue::Null,
        Value::Bool(b) => YamlValue::Bool(*b),
        Value::Int(i) => YamlValue::Number((*i).into()),
        Value::String(s) => YamlValue::String(s.clone()),
        Value::Section(section) => YamlValue::Mapping(document_to_mapping(section)),
    }
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}
