//! Configuration File Watcher
//!
//! Hot-reload machinery: one dedicated worker task per watcher, blocked on the
//! next batch of filesystem events for the bound file's parent directory.
//! Directory-level (not file-level) watching, because native notification APIs
//! cannot track a single file reliably across create/delete/rename.
//!
//! Lifecycle is `Stopped → Starting → Running → Stopping → Stopped`. Stopping
//! drops the native watch handle, which closes the event channel and unblocks
//! the worker with a terminal signal; the stop call joins the worker before
//! returning, so no reload can fire afterwards.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::events::EventSink;
use crate::store::ConfigStore;

/// Delay after the first event of a batch before reloading, letting an
/// editor's remaining writes land and coalesce into the same batch
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Watcher lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No watch registered, no worker running
    Stopped,
    /// Registering the native watch
    Starting,
    /// Worker blocked on the next event batch
    Running,
    /// Watch handle closed, waiting for the worker to join
    Stopping,
}

/// Notification of a successful watcher-triggered reload
#[derive(Debug, Clone)]
pub struct ReloadEvent {
    /// Path of the reloaded file
    pub path: PathBuf,
    /// When the reload completed
    pub timestamp: SystemTime,
}

/// Background watcher that reloads a store when its file changes externally
pub struct ConfigWatcher {
    state: WatchState,
    path: PathBuf,
    // Owning the native watcher keeps the watch registered; dropping it is
    // the cancellation mechanism.
    native: Option<RecommendedWatcher>,
    worker: Option<JoinHandle<()>>,
    sink: Arc<dyn EventSink>,
}

impl ConfigWatcher {
    /// Register a watch on the file's parent directory and spawn the worker
    ///
    /// Returns a `Running` watcher, or [`ConfigError::WatchSetup`] when the
    /// native registration fails. In that case no worker was spawned and the
    /// watcher is conceptually `Stopped`.
    pub fn start(
        path: PathBuf,
        store: Arc<RwLock<ConfigStore>>,
        sink: Arc<dyn EventSink>,
        reload_tx: broadcast::Sender<ReloadEvent>,
    ) -> Result<Self> {
        let state = WatchState::Starting;
        debug!(state = ?state, "Starting config watcher for {}", path.display());

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ConfigError::WatchSetup {
                path: path.clone(),
                details: "config file has no parent directory".to_string(),
            })?
            .to_path_buf();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut native = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                // Dropped receiver means the worker is gone; nothing to do.
                let _ = event_tx.send(result);
            },
            NotifyConfig::default(),
        )
        .map_err(|e| watch_setup_error(&path, e))?;

        native
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| watch_setup_error(&path, e))?;

        let worker = tokio::spawn(watch_loop(
            event_rx,
            Arc::clone(&store),
            path.clone(),
            Arc::clone(&sink),
            reload_tx,
        ));

        sink.watch_started(&path);
        Ok(Self {
            state: WatchState::Running,
            path,
            native: Some(native),
            worker: Some(worker),
            sink,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Whether the watcher is running
    pub fn is_running(&self) -> bool {
        self.state == WatchState::Running
    }

    /// Path of the watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop the watcher: close the native handle and join the worker
    ///
    /// Guarantees no further reload fires after this returns. Idempotent.
    pub async fn stop(&mut self) {
        if !matches!(self.state, WatchState::Running) {
            return;
        }
        self.state = WatchState::Stopping;

        // Dropping the native watcher closes the watch handle and the event
        // sender, so the worker's blocked recv resolves to None.
        self.native.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!("Config watcher worker terminated abnormally: {}", e);
            }
        }

        self.state = WatchState::Stopped;
        self.sink.watch_stopped(&self.path);
    }
}

/// Worker loop: block on the next event, coalesce the batch, reload once
async fn watch_loop(
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    store: Arc<RwLock<ConfigStore>>,
    path: PathBuf,
    sink: Arc<dyn EventSink>,
    reload_tx: broadcast::Sender<ReloadEvent>,
) {
    let file_name = path.file_name().map(OsStr::to_os_string);

    while let Some(first) = event_rx.recv().await {
        let mut matched = event_matches(&first, file_name.as_deref());

        // Editors often perform several writes per save; wait briefly and
        // fold everything queued into one batch.
        tokio::time::sleep(SETTLE_DELAY).await;
        while let Ok(next) = event_rx.try_recv() {
            matched |= event_matches(&next, file_name.as_deref());
        }
        if !matched {
            continue;
        }

        let result = {
            let mut store = store.write().await;
            store.reload_config()
        };
        match result {
            Ok(()) => {
                // No subscribers is fine; the broadcast is best-effort.
                let _ = reload_tx.send(ReloadEvent {
                    path: path.clone(),
                    timestamp: SystemTime::now(),
                });
            }
            // One bad external edit must not wedge hot reload; report and
            // keep waiting for the next batch.
            Err(e) => sink.reload_failed(&path, &e),
        }
    }
    debug!("Config watcher worker for {} exiting", path.display());
}

/// Whether an event is a modification of the watched file
///
/// Create and delete events on the directory are ignored; file replacement
/// shows up as a modify-equivalent event on most platforms. Rename-based
/// atomic saves from external editors may not always produce a modify event
/// on the watched name, a limit of the underlying notification mechanism.
fn event_matches(result: &notify::Result<Event>, file_name: Option<&OsStr>) -> bool {
    match result {
        Ok(event) => {
            matches!(event.kind, EventKind::Modify(_))
                && event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == file_name)
        }
        Err(e) => {
            warn!("File watcher error: {}", e);
            false
        }
    }
}

fn watch_setup_error(path: &Path, details: impl ToString) -> ConfigError {
    ConfigError::WatchSetup {
        path: path.to_path_buf(),
        details: details.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TracingSink;
    use crate::provider::EmptyContentProvider;
    use tempfile::TempDir;

    fn shared_store(dir: &Path, file_name: &str) -> Arc<RwLock<ConfigStore>> {
        let mut store = ConfigStore::new(
            dir,
            file_name,
            Arc::new(EmptyContentProvider),
            Arc::new(TracingSink),
        )
        .unwrap();
        store.load_config().unwrap();
        Arc::new(RwLock::new(store))
    }

    #[tokio::test]
    async fn test_start_and_stop_transitions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        std::fs::write(&path, "key: value\n").unwrap();

        let store = shared_store(temp_dir.path(), "config.yml");
        let (reload_tx, _) = broadcast::channel(16);
        let mut watcher =
            ConfigWatcher::start(path, store, Arc::new(TracingSink), reload_tx).unwrap();

        assert_eq!(watcher.state(), WatchState::Running);
        assert!(watcher.is_running());

        watcher.stop().await;
        assert_eq!(watcher.state(), WatchState::Stopped);

        // Stopping again is a no-op
        watcher.stop().await;
        assert_eq!(watcher.state(), WatchState::Stopped);
    }

    #[tokio::test]
    async fn test_setup_failure_when_directory_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no-such-dir").join("config.yml");

        let store = shared_store(temp_dir.path(), "config.yml");
        let (reload_tx, _) = broadcast::channel(16);
        let result = ConfigWatcher::start(path, store, Arc::new(TracingSink), reload_tx);

        assert!(matches!(result, Err(ConfigError::WatchSetup { .. })));
    }

    #[test]
    fn test_event_matches_filters_name_and_kind() {
        use notify::event::{DataChange, ModifyKind};
        use std::ffi::OsString;

        let name = OsString::from("config.yml");
        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/etc/app/config.yml"));
        assert!(event_matches(&Ok(modify), Some(&name)));

        let other_file = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/etc/app/other.yml"));
        assert!(!event_matches(&Ok(other_file), Some(&name)));

        let create = Event::new(EventKind::Create(notify::event::CreateKind::File))
            .add_path(PathBuf::from("/etc/app/config.yml"));
        assert!(!event_matches(&Ok(create), Some(&name)));
    }
}
