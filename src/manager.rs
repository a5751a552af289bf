//! Configuration Manager
//!
//! The externally consumed facade: a [`ConfigStore`] behind a read-write lock
//! plus an optional [`ConfigWatcher`]. Reads share the lock; `set`, saves, and
//! watcher-triggered reloads take it exclusively, so callers always observe a
//! consistent document. This lock is the subsystem's one piece of shared
//! mutable state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};

use crate::document::Value;
use crate::error::Result;
use crate::events::{EventSink, TracingSink};
use crate::provider::{DefaultContentProvider, EmptyContentProvider};
use crate::store::ConfigStore;
use crate::watcher::{ConfigWatcher, ReloadEvent};

const RELOAD_CHANNEL_CAPACITY: usize = 16;

/// Facade over one configuration file with optional hot reloading
pub struct ConfigManager {
    dir: PathBuf,
    store: Arc<RwLock<ConfigStore>>,
    watcher: Mutex<Option<ConfigWatcher>>,
    provider: Arc<dyn DefaultContentProvider>,
    sink: Arc<dyn EventSink>,
    reload_tx: broadcast::Sender<ReloadEvent>,
}

impl ConfigManager {
    /// Open (and load) the configuration file `dir/file_name` with default
    /// collaborators: no first-run template, events logged via `tracing`
    pub async fn new(dir: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        Self::with_collaborators(
            dir,
            file_name,
            Arc::new(EmptyContentProvider),
            Arc::new(TracingSink),
        )
        .await
    }

    /// Open (and load) the configuration file with injected collaborators
    ///
    /// The provider supplies first-run file content; the sink receives the
    /// discrete lifecycle events. The file is materialized and loaded before
    /// this returns.
    pub async fn with_collaborators(
        dir: impl AsRef<Path>,
        file_name: &str,
        provider: Arc<dyn DefaultContentProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut store = ConfigStore::new(&dir, file_name, Arc::clone(&provider), Arc::clone(&sink))?;
        store.load_config()?;

        let (reload_tx, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);
        Ok(Self {
            dir,
            store: Arc::new(RwLock::new(store)),
            watcher: Mutex::new(None),
            provider,
            sink,
            reload_tx,
        })
    }

    /// Subscribe to successful watcher-triggered reloads
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.reload_tx.subscribe()
    }

    /// Full path of the bound file
    pub async fn file_path(&self) -> PathBuf {
        self.store.read().await.path().to_path_buf()
    }

    /// Whether in-memory state has diverged from the last save
    pub async fn is_dirty(&self) -> bool {
        self.store.read().await.is_dirty()
    }

    /// Start watching the bound file for external edits
    ///
    /// Idempotent: enabling while already running is a no-op. Setup failure
    /// is surfaced synchronously and leaves hot reloading off.
    pub async fn enable_hot_reloading(&self) -> Result<()> {
        let mut slot = self.watcher.lock().await;
        if slot.as_ref().is_some_and(ConfigWatcher::is_running) {
            return Ok(());
        }
        let path = self.store.read().await.path().to_path_buf();
        *slot = Some(ConfigWatcher::start(
            path,
            Arc::clone(&self.store),
            Arc::clone(&self.sink),
            self.reload_tx.clone(),
        )?);
        Ok(())
    }

    /// Stop watching: closes the watch handle and joins the worker
    ///
    /// After this returns, no further reload fires even if the file keeps
    /// changing. Idempotent.
    pub async fn disable_hot_reloading(&self) {
        let mut slot = self.watcher.lock().await;
        if let Some(mut watcher) = slot.take() {
            watcher.stop().await;
        }
    }

    /// Whether hot reloading is currently enabled
    pub async fn is_hot_reloading(&self) -> bool {
        self.watcher
            .lock()
            .await
            .as_ref()
            .is_some_and(ConfigWatcher::is_running)
    }

    /// Rebind the manager to a different file in the same directory
    ///
    /// Fully stops the watcher first so no reload can race the rebind, then
    /// replaces the store wholesale, loads the new file, and re-enables
    /// watching if it was running before. If building or loading the new
    /// store fails, the previous store stays bound; if only the watcher
    /// restart fails, the new store is bound. Either way hot reloading is off
    /// after a failure and the caller can re-enable it.
    pub async fn set_file(&self, file_name: &str) -> Result<()> {
        let mut slot = self.watcher.lock().await;
        let was_running = slot.as_ref().is_some_and(ConfigWatcher::is_running);
        if let Some(mut watcher) = slot.take() {
            watcher.stop().await;
        }

        let mut new_store = ConfigStore::new(
            &self.dir,
            file_name,
            Arc::clone(&self.provider),
            Arc::clone(&self.sink),
        )?;
        new_store.load_config()?;
        let path = new_store.path().to_path_buf();
        {
            let mut store = self.store.write().await;
            *store = new_store;
        }

        if was_running {
            *slot = Some(ConfigWatcher::start(
                path,
                Arc::clone(&self.store),
                Arc::clone(&self.sink),
                self.reload_tx.clone(),
            )?);
        }
        Ok(())
    }

    /// Look up a value by dotted path
    pub async fn get(&self, path: &str) -> Option<Value> {
        self.store.read().await.get(path).cloned()
    }

    /// String accessor with permissive coercion
    pub async fn get_string(&self, path: &str, default: &str) -> String {
        self.store.read().await.get_string(path, default)
    }

    /// Integer accessor with permissive coercion
    pub async fn get_int(&self, path: &str, default: i64) -> i64 {
        self.store.read().await.get_int(path, default)
    }

    /// Boolean accessor with permissive coercion
    pub async fn get_bool(&self, path: &str, default: bool) -> bool {
        self.store.read().await.get_bool(path, default)
    }

    /// Set a value at a dotted path (in memory; save stays explicit)
    pub async fn set(&self, path: &str, value: impl Into<Value>) {
        self.store.write().await.set(path, value);
    }

    /// Remove a value at a dotted path
    pub async fn remove(&self, path: &str) -> Option<Value> {
        self.store.write().await.remove(path)
    }

    /// Replace the header comment lines persisted above the data on save
    pub async fn set_header<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.write().await.set_header(lines);
    }

    /// Persist the current document durably to the bound file
    pub async fn save_config(&self) -> Result<()> {
        self.store.write().await.save_config()
    }

    /// Re-read the bound file, replacing the in-memory document
    pub async fn reload_config(&self) -> Result<()> {
        self.store.write().await.reload_config()
    }
}
