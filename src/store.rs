//! Configuration Store
//!
//! Owns one document bound to one on-disk file: loads, saves, and exposes
//! typed accessors. The binding (directory, file name, format) is resolved
//! once at construction and immutable afterwards; rebinding to another file
//! means building a fresh store. Not concurrency-safe on its own; the
//! manager wraps it in a read-write lock.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codec::Format;
use crate::document::{Document, Value};
use crate::error::{ConfigError, Result};
use crate::events::EventSink;
use crate::provider::DefaultContentProvider;

/// Store for one configuration file
pub struct ConfigStore {
    path: PathBuf,
    file_name: String,
    format: Format,
    document: Document,
    dirty: bool,
    provider: Arc<dyn DefaultContentProvider>,
    sink: Arc<dyn EventSink>,
}

impl ConfigStore {
    /// Bind a store to `dir/file_name`, deriving the format from the suffix
    ///
    /// Fails with [`ConfigError::UnknownFormat`] for unrecognized suffixes.
    /// The file itself is not touched until [`load_config`](Self::load_config).
    pub fn new(
        dir: impl AsRef<Path>,
        file_name: &str,
        provider: Arc<dyn DefaultContentProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let path = dir.as_ref().join(file_name);
        let format = Format::from_file_name(file_name)
            .ok_or_else(|| ConfigError::UnknownFormat { path: path.clone() })?;

        Ok(Self {
            path,
            file_name: file_name.to_string(),
            format,
            document: Document::new(),
            dirty: false,
            provider,
            sink,
        })
    }

    /// Full path of the bound file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the bound file
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Format derived from the file name
    pub fn format(&self) -> Format {
        self.format
    }

    /// Whether in-memory state has diverged from the last durable save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The current in-memory document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Load the bound file, replacing the in-memory document wholesale
    ///
    /// A missing file is first materialized from the default-content provider
    /// (empty when the provider has no template). On decode failure the
    /// previous document stays installed and [`ConfigError::Load`] is
    /// returned.
    pub fn load_config(&mut self) -> Result<()> {
        if !self.path.exists() {
            self.materialize_default()?;
        }
        let bytes = fs::read(&self.path).map_err(|e| self.load_error(e))?;
        let document = self
            .format
            .codec()
            .decode(&bytes)
            .map_err(|e| self.load_error(e))?;
        self.document = document;
        self.dirty = false;
        Ok(())
    }

    /// Reload the bound file
    ///
    /// Same semantics as [`load_config`](Self::load_config); additionally
    /// announces the reload through the event sink so hosts can observe it.
    pub fn reload_config(&mut self) -> Result<()> {
        self.sink.reload_triggered(&self.path);
        self.load_config()
    }

    /// Encode the current document and write it durably to the bound file
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// target, so a crash mid-write cannot corrupt the previous valid file.
    /// Clears the dirty flag on success; on failure the flag stays set and
    /// [`ConfigError::Save`] is returned.
    pub fn save_config(&mut self) -> Result<()> {
        match self.write_durable() {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.sink.save_failed(&self.path, &e);
                Err(e)
            }
        }
    }

    /// Look up a value by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.document.get(path)
    }

    /// Set a value at a dotted path and mark the store dirty
    ///
    /// Does not save; persisting stays an explicit
    /// [`save_config`](Self::save_config) call so bulk edits cost one write.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        self.document.set(path, value);
        self.dirty = true;
    }

    /// Remove a value at a dotted path, marking the store dirty when present
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let removed = self.document.remove(path);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// String accessor with permissive coercion
    pub fn get_string(&self, path: &str, default: &str) -> String {
        self.document.get_string(path, default)
    }

    /// Integer accessor with permissive coercion
    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        self.document.get_int(path, default)
    }

    /// Boolean accessor with permissive coercion
    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.document.get_bool(path, default)
    }

    /// Replace the header comment lines and mark the store dirty
    pub fn set_header<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document.set_header(lines);
        self.dirty = true;
    }

    fn materialize_default(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.load_error(e))?;
        }
        let content = self
            .provider
            .default_content(&self.file_name)
            .unwrap_or_default();
        fs::write(&self.path, &content).map_err(|e| self.load_error(e))?;
        self.sink.file_created(&self.path);
        Ok(())
    }

    fn write_durable(&self) -> Result<()> {
        let bytes = self
            .format
            .codec()
            .encode(&self.document)
            .map_err(|e| self.save_error(e))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.save_error(e))?;
        }
        let tmp = self.path.with_file_name(format!("{}.tmp", self.file_name));
        fs::write(&tmp, &bytes).map_err(|e| self.save_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.save_error(e))?;
        Ok(())
    }

    fn load_error(&self, details: impl ToString) -> ConfigError {
        ConfigError::Load {
            path: self.path.clone(),
            details: details.to_string(),
        }
    }

    fn save_error(&self, details: impl ToString) -> ConfigError {
        ConfigError::Save {
            path: self.path.clone(),
            details: details.to_string(),
        }
    }
}
