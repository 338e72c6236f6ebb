//! Generic key/value settings store.
//!
//! Settings are addressed by slash-separated keys such as
//! `/highlighting/highlights` and hold arbitrary YAML values. Typed access goes
//! through [`SettingsStoreExt::load`] and [`SettingsStoreExt::save`], which
//! (de)serialize via serde.

use crate::error::{Result, SettingsError};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Callback invoked with the key whose value changed.
pub type SettingsCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`SettingsStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingsSubscription(u64);

/// Persistence layer addressed by string keys.
///
/// Implementations must be safe to share across threads. `set` is expected to
/// be durable (or fail) by the time it returns.
pub trait SettingsStore: Send + Sync {
    /// Read the raw value stored under `key`, or `None` if it was never set.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key` and notify subscribers of that key.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Register a callback fired whenever `key` changes.
    fn subscribe(&self, key: &str, callback: SettingsCallback) -> SettingsSubscription;

    /// Remove a subscription. Returns `false` if it was already gone.
    fn unsubscribe(&self, subscription: SettingsSubscription) -> bool;
}

/// Typed helpers available on every [`SettingsStore`].
pub trait SettingsStoreExt {
    /// Deserialize the value under `key` into `T`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;

    /// Serialize `value` and store it under `key`.
    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()>;
}

impl<S: SettingsStore + ?Sized> SettingsStoreExt for S {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_yaml_ng::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_yaml_ng::to_value(value)?;
        self.set(key, value)
    }
}

/// Reject keys that are not absolute slash paths.
pub fn validate_key(key: &str) -> Result<()> {
    if !key.starts_with('/') || key.len() < 2 {
        return Err(SettingsError::Validation(format!(
            "setting key '{key}' must be an absolute path such as '/section/name'"
        )));
    }
    if key.split('/').skip(1).any(str::is_empty) {
        return Err(SettingsError::Validation(format!(
            "setting key '{key}' contains an empty path segment"
        )));
    }
    Ok(())
}

/// Per-key subscriber registry shared by the store implementations.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SettingsSubscription, String, SettingsCallback)>>,
}

impl Subscribers {
    pub(crate) fn add(&self, key: &str, callback: SettingsCallback) -> SettingsSubscription {
        let id = SettingsSubscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, key.to_string(), callback));
        id
    }

    pub(crate) fn remove(&self, id: SettingsSubscription) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(existing, _, _)| *existing != id);
        entries.len() != before
    }

    /// Fire callbacks for `key`. Callbacks run outside the registry lock so
    /// they may read the store or (un)subscribe.
    pub(crate) fn notify(&self, key: &str) {
        let callbacks: Vec<SettingsCallback> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, k, _)| k == key)
            .map(|(_, _, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(key);
        }
    }
}

/// Volatile store used by tests and by sessions started without a settings
/// file.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: RwLock<BTreeMap<String, Value>>,
    subscribers: Subscribers,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemorySettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySettingsStore")
            .field("keys", &self.values.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        self.values.write().insert(key.to_string(), value);
        self.subscribers.notify(key);
        Ok(())
    }

    fn subscribe(&self, key: &str, callback: SettingsCallback) -> SettingsSubscription {
        self.subscribers.add(key, callback)
    }

    fn unsubscribe(&self, subscription: SettingsSubscription) -> bool {
        self.subscribers.remove(subscription)
    }
}
