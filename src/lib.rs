//! hotconf
//!
//! Live-updating, format-agnostic configuration store: loads structured
//! key/value configuration from a file, exposes typed accessors, persists
//! mutations durably, and can watch the file for external edits and reload
//! without a restart.
//!
//! [`ConfigManager`] is the externally consumed unit; it guards a
//! [`ConfigStore`] with a read-write lock and drives an optional
//! [`watcher::ConfigWatcher`].
//!
//! ```no_run
//! use hotconf::ConfigManager;
//!
//! # async fn demo() -> hotconf::Result<()> {
//! let config = ConfigManager::new("/etc/myapp", "config.yml").await?;
//! config.enable_hot_reloading().await?;
//!
//! let retries = config.get_int("client.retries", 3).await;
//! config.set("client.retries", retries + 1).await;
//! config.save_config().await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod events;
pub mod manager;
pub mod provider;
pub mod store;
pub mod watcher;

pub use codec::{Codec, Format};
pub use document::{Document, Value};
pub use error::{ConfigError, Result};
pub use events::{EventSink, TracingSink};
pub use manager::ConfigManager;
pub use provider::{DefaultContentProvider, EmptyContentProvider, StaticContentProvider};
pub use store::ConfigStore;
pub use watcher::{ConfigWatcher, ReloadEvent, WatchState};
