//! YAML-file backed settings store.
//!
//! The whole file is a single flat mapping from setting key to value:
//!
//! ```yaml
//! /highlighting/highlights:
//!   - pattern: hello
//!     is_regex: false
//!     case_sensitive: false
//!     sound: true
//!     alert: false
//! /windows/main/geometry/x: 120
//! ```
//!
//! Writes are atomic (temp file + rename) and the in-memory map is only
//! updated once the file write succeeded, so `get` always reflects what is on
//! disk.

use crate::error::{Result, SettingsError};
use crate::store::{
    SettingsCallback, SettingsStore, SettingsSubscription, Subscribers, validate_key,
};
use parking_lot::{Mutex, RwLock};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings store persisted to a YAML file.
pub struct YamlSettingsStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, Value>>,
    /// Serializes file writes so two setters never interleave temp files.
    write_lock: Mutex<()>,
    subscribers: Subscribers,
}

impl std::fmt::Debug for YamlSettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlSettingsStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl YamlSettingsStore {
    /// Open the store at `path`. A missing file is treated as empty and is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = read_map(&path)?;
        log::info!(
            "Settings loaded from {:?} ({} keys)",
            path,
            values.len()
        );
        Ok(Self {
            path,
            values: RwLock::new(values),
            write_lock: Mutex::new(()),
            subscribers: Subscribers::default(),
        })
    }

    /// Open the store at the platform default location.
    pub fn open_default() -> Result<Self> {
        Self::open(settings_path())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file after an external modification.
    ///
    /// Subscribers of every key whose value changed (including removed keys)
    /// are notified. Returns the changed keys.
    pub fn reload(&self) -> Result<Vec<String>> {
        let fresh = read_map(&self.path)?;
        let changed: Vec<String> = {
            let mut values = self.values.write();
            let mut changed: Vec<String> = fresh
                .iter()
                .filter(|(k, v)| values.get(*k) != Some(*v))
                .map(|(k, _)| k.clone())
                .collect();
            changed.extend(values.keys().filter(|k| !fresh.contains_key(*k)).cloned());
            *values = fresh;
            changed
        };

        log::debug!("Settings reload: {} key(s) changed", changed.len());
        for key in &changed {
            self.subscribers.notify(key);
        }
        Ok(changed)
    }

    fn write_map(&self, map: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(map)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = self.path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for YamlSettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        {
            let _guard = self.write_lock.lock();
            let mut next = self.values.read().clone();
            if next.get(key) == Some(&value) {
                return Ok(());
            }
            next.insert(key.to_string(), value);
            self.write_map(&next)?;
            *self.values.write() = next;
        }
        log::trace!("Setting {key} written to {:?}", self.path);
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

fn read_map(path: &Path) -> Result<BTreeMap<String, Value>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let map: BTreeMap<String, Value> = serde_yaml_ng::from_str(&contents)?;
    if let Some(bad) = map.keys().find(|k| validate_key(k).is_err()) {
        return Err(SettingsError::Validation(format!(
            "settings file {} contains invalid key '{bad}'",
            path.display()
        )));
    }
    Ok(map)
}

/// Get the settings directory path (using XDG convention)
pub fn settings_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("par-chat")
        } else {
            PathBuf::from(".")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        // Use XDG convention on all platforms: ~/.config/par-chat/
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("par-chat")
        } else {
            PathBuf::from(".")
        }
    }
}

/// Get the settings file path
pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.yaml")
}
