//! Settings system for the par-chat client.
//!
//! - A generic key/value [`SettingsStore`] with typed helpers
//! - The YAML file store used at runtime and an in-memory store for tests
//! - Window geometry persistence
//! - Settings file watching for multi-window sync

pub mod error;
pub mod file;
pub mod store;
#[cfg(feature = "watcher")]
pub mod watcher;
pub mod window;

pub use error::SettingsError;
pub use file::{YamlSettingsStore, settings_dir, settings_path};
pub use store::{
    MemorySettingsStore, SettingsCallback, SettingsStore, SettingsStoreExt, SettingsSubscription,
};
#[cfg(feature = "watcher")]
pub use watcher::{SettingsChangeEvent, SettingsWatcher};
pub use window::WindowGeometry;
