//! Configuration Document
//!
//! In-memory hierarchical key/value representation of one configuration file,
//! plus the header comment block persisted above the data on save. Paths are
//! dotted strings (`"server.port"`); intermediate sections are created on demand.

/// A single configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value
    String(String),
    /// Integer value
    Int(i64),
    /// Boolean value
    Bool(bool),
    /// Explicit null (key present, no value)
    Null,
    /// Nested document
    Section(Document),
}

impl Value {
    /// Whether this value is a nested section rather than a scalar
    pub fn is_section(&self) -> bool {
        matches!(self, Value::Section(_))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Ordered key/value tree for one configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<(String, Value)>,
    header: Vec<String>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Header comment lines, persisted above the data body on save
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Replace the header comment lines
    pub fn set_header<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = lines.into_iter().map(Into::into).collect();
    }

    /// Top-level entries in insertion order
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no top-level entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by dotted path
    ///
    /// A literal key equal to the full path wins over nested traversal, so
    /// decoded files containing dotted keys stay addressable. Returns `None`
    /// when any segment is missing or a non-terminal segment resolves to a
    /// scalar.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.lookup_exact(path) {
            return Some(value);
        }
        let (head, rest) = split_path(path);
        let value = self
            .entries
            .iter()
            .find(|(key, _)| key == head)
            .map(|(_, value)| value)?;
        match rest {
            None => Some(value),
            Some(rest) => match value {
                Value::Section(section) => section.get(rest),
                _ => None,
            },
        }
    }

    /// Set a value at a dotted path, creating intermediate sections as needed
    ///
    /// A scalar sitting where an intermediate section is needed is replaced by
    /// a fresh section.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        self.set_value(path, value.into());
    }

    /// Insert or overwrite a top-level entry without dotted-path splitting
    ///
    /// Codec use only: preserves literal keys exactly as they appear on disk.
    pub(crate) fn insert_raw(&mut self, key: String, value: Value) {
        match self.entries.iter_mut().find(|(entry_key, _)| *entry_key == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    fn lookup_exact(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value)
    }

    fn set_value(&mut self, path: &str, value: Value) {
        if self.lookup_exact(path).is_some() {
            self.insert_raw(path.to_string(), value);
            return;
        }
        let (head, rest) = split_path(path);
        match rest {
            None => match self.entries.iter_mut().find(|(key, _)| key == head) {
                Some((_, slot)) => *slot = value,
                None => self.entries.push((head.to_string(), value)),
            },
            Some(rest) => {
                let slot = match self.entries.iter().position(|(key, _)| key == head) {
                    Some(index) => {
                        if !self.entries[index].1.is_section() {
                            self.entries[index].1 = Value::Section(Document::new());
                        }
                        &mut self.entries[index].1
                    }
                    None => {
                        self.entries
                            .push((head.to_string(), Value::Section(Document::new())));
                        let index = self.entries.len() - 1;
                        &mut self.entries[index].1
                    }
                };
                if let Value::Section(section) = slot {
                    section.set_value(rest, value);
                }
            }
        }
    }

    /// Remove the value at a dotted path, returning it if present
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        if let Some(index) = self.entries.iter().position(|(key, _)| key == path) {
            return Some(self.entries.remove(index).1);
        }
        let (head, rest) = split_path(path);
        match rest {
            None => {
                let index = self.entries.iter().position(|(key, _)| key == head)?;
                Some(self.entries.remove(index).1)
            }
            Some(rest) => match self.get_section_mut(head) {
                Some(section) => section.remove(rest),
                None => None,
            },
        }
    }

    fn get_section_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.entries
            .iter_mut()
            .find(|(entry_key, _)| entry_key == key)
            .and_then(|(_, value)| match value {
                Value::Section(section) => Some(section),
                _ => None,
            })
    }

    /// String accessor with permissive coercion
    ///
    /// Scalars render via their text form; sections and nulls fall back to the
    /// caller's default.
    pub fn get_string(&self, path: &str, default: &str) -> String {
        match self.get(path) {
            Some(Value::String(v)) => v.clone(),
            Some(Value::Int(v)) => v.to_string(),
            Some(Value::Bool(v)) => v.to_string(),
            _ => default.to_string(),
        }
    }

    /// Integer accessor with permissive coercion
    ///
    /// Numeric text parses; anything else falls back to the caller's default.
    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        match self.get(path) {
            Some(Value::Int(v)) => *v,
            Some(Value::String(v)) => v.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Boolean accessor with permissive coercion
    ///
    /// The text `true`/`false` parses; anything else falls back to the caller's
    /// default.
    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        match self.get(path) {
            Some(Value::Bool(v)) => *v,
            Some(Value::String(v)) => v.trim().parse().unwrap_or(default),
            _ => default,
        }
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) if !rest.is_empty() => (head, Some(rest)),
        _ => (path, None),
    }
}
