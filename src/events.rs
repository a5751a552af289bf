//! Lifecycle Event Sink
//!
//! Discrete observability events emitted by the store and watcher. The sink is
//! injected at construction instead of routing through a process-wide logger,
//! so hosts can forward events wherever they like. [`TracingSink`] is the
//! default and emits through `tracing`.

use std::path::Path;

use tracing::{error, info};

use crate::error::ConfigError;

/// Receiver for configuration lifecycle events
///
/// Errors on the watcher's asynchronous reload path have no synchronous caller
/// to land on; `reload_failed` is the only place they surface.
pub trait EventSink: Send + Sync {
    /// A missing config file was materialized from default content
    fn file_created(&self, path: &Path);
    /// A reload (manual or watcher-triggered) is starting
    fn reload_triggered(&self, path: &Path);
    /// A watcher-triggered reload failed; the previous document is kept
    fn reload_failed(&self, path: &Path, reason: &ConfigError);
    /// A save failed; the dirty flag stays set for retry
    fn save_failed(&self, path: &Path, reason: &ConfigError);
    /// The watcher registered its directory watch and is running
    fn watch_started(&self, path: &Path);
    /// The watcher fully stopped; no further reloads will fire
    fn watch_stopped(&self, path: &Path);
}

/// Default sink that routes events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn file_created(&self, path: &Path) {
        info!("Config file not found, created: {}", path.display());
    }

    fn reload_triggered(&self, path: &Path) {
        info!("Reloading configuration from: {}", path.display());
    }

    fn reload_failed(&self, path: &Path, reason: &ConfigError) {
        error!(
            "Failed to reload configuration from {}, keeping current config: {}",
            path.display(),
            reason
        );
    }

    fn save_failed(&self, path: &Path, reason: &ConfigError) {
        error!("Failed to save configuration to {}: {}", path.display(), reason);
    }

    fn watch_started(&self, path: &Path) {
        info!("Hot reloading enabled for: {}", path.display());
    }

    fn watch_stopped(&self, path: &Path) {
        info!("Hot reloading disabled for: {}", path.display());
    }
}
