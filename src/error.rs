//! Error Types
//!
//! Structural errors surfaced by the configuration store. Type-coercion misses are
//! not errors; typed accessors resolve them locally to the caller's default.

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::Format;

/// Errors surfaced by store, watcher, and manager operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Decoding the bound file failed; the previous in-memory document is preserved
    #[error("failed to load config '{}': {details}", path.display())]
    Load {
        /// Path of the file that failed to load
        path: PathBuf,
        /// Underlying decode or I/O error
        details: String,
    },

    /// Writing the bound file failed; the dirty flag remains set for retry
    #[error("failed to save config '{}': {details}", path.display())]
    Save {
        /// Path of the file that failed to save
        path: PathBuf,
        /// Underlying I/O error
        details: String,
    },

    /// Conversion between raw bytes and a document failed for the given format
    #[error("failed to parse {format} document: {details}")]
    Parse {
        /// Format the codec was decoding
        format: Format,
        /// Parser error details
        details: String,
    },

    /// Registering the native filesystem watch failed; the watcher stays stopped
    #[error("failed to set up watch for '{}': {details}", path.display())]
    WatchSetup {
        /// Path whose parent directory could not be watched
        path: PathBuf,
        /// Underlying notify error
        details: String,
    },

    /// File name suffix does not map to any supported format
    #[error("unsupported config format for '{}'", path.display())]
    UnknownFormat {
        /// Path with the unrecognized suffix
        path: PathBuf,
    },
}

/// Common result type for store operations
pub type Result<T> = std::result::Result<T, ConfigError>;
