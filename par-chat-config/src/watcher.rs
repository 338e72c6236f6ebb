//! Settings file watcher.
//!
//! Another client window (or the user with a text editor) may rewrite the
//! settings file while we are running. [`SettingsWatcher`] reports those
//! writes so the owner can call [`crate::YamlSettingsStore::reload`].
//! Editors often save in several steps, so events are debounced.

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The watched settings file was written.
#[derive(Debug, Clone)]
pub struct SettingsChangeEvent {
    pub path: PathBuf,
}

/// Watches one settings file and queues [`SettingsChangeEvent`]s.
pub struct SettingsWatcher {
    /// Dropping the backend stops watching.
    _backend: Box<dyn Watcher + Send>,
    events: Receiver<SettingsChangeEvent>,
}

impl std::fmt::Debug for SettingsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatcher").finish_non_exhaustive()
    }
}

/// Debounce and filter raw notify events down to the settings file.
#[derive(Clone)]
struct ChangeFilter {
    file_name: OsString,
    path: PathBuf,
    debounce: Duration,
    last_sent: Arc<Mutex<Option<Instant>>>,
    tx: Sender<SettingsChangeEvent>,
}

impl ChangeFilter {
    fn handle(&self, result: notify::Result<Event>) {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Settings watcher error: {e}");
                return;
            }
        };

        // Create covers editors that save via rename-over.
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }
        if !event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
        {
            return;
        }

        {
            let now = Instant::now();
            let mut last = self.last_sent.lock();
            if let Some(previous) = *last
                && now.duration_since(previous) < self.debounce
            {
                log::trace!("Debouncing settings change event");
                return;
            }
            *last = Some(now);
        }

        log::info!("Settings file changed: {}", self.path.display());
        if let Err(e) = self.tx.send(SettingsChangeEvent {
            path: self.path.clone(),
        }) {
            log::error!("Failed to queue settings change event: {e}");
        }
    }

    fn into_handler(self) -> impl Fn(notify::Result<Event>) + Send + 'static {
        move |result| self.handle(result)
    }
}

impl SettingsWatcher {
    /// Start watching `settings_path`.
    ///
    /// Uses the platform-native backend and falls back to polling every
    /// 500 ms when that is unavailable (containers, network filesystems).
    ///
    /// # Errors
    /// Fails if the file does not exist or neither backend can watch its
    /// directory.
    pub fn new(settings_path: &Path, debounce_ms: u64) -> Result<Self> {
        if !settings_path.exists() {
            anyhow::bail!("Settings file not found: {}", settings_path.display());
        }

        let canonical = settings_path
            .canonicalize()
            .unwrap_or_else(|_| settings_path.to_path_buf());
        let file_name = canonical
            .file_name()
            .context("Settings path has no filename")?
            .to_os_string();
        let parent_dir = canonical
            .parent()
            .context("Settings path has no parent directory")?
            .to_path_buf();

        let (tx, rx) = channel();
        let filter = ChangeFilter {
            file_name,
            path: canonical.clone(),
            debounce: Duration::from_millis(debounce_ms),
            last_sent: Arc::new(Mutex::new(None)),
            tx,
        };

        let mut backend = Self::create_backend(filter)?;
        backend
            .watch(&parent_dir, RecursiveMode::NonRecursive)
            .with_context(|| {
                format!(
                    "Failed to watch settings directory: {}",
                    parent_dir.display()
                )
            })?;

        log::info!("Settings hot reload: watching {}", canonical.display());
        Ok(Self {
            _backend: backend,
            events: rx,
        })
    }

    fn create_backend(filter: ChangeFilter) -> Result<Box<dyn Watcher + Send>> {
        match notify::recommended_watcher(filter.clone().into_handler()) {
            Ok(w) => {
                log::debug!("Settings watcher: using native backend");
                Ok(Box::new(w))
            }
            Err(e) => {
                log::warn!("Settings watcher: native backend unavailable ({e}); polling instead");
                let poll = PollWatcher::new(
                    filter.into_handler(),
                    NotifyConfig::default().with_poll_interval(POLL_INTERVAL),
                )
                .context("Failed to create fallback PollWatcher")?;
                Ok(Box::new(poll))
            }
        }
    }

    /// Next pending change, if any (non-blocking).
    pub fn try_recv(&self) -> Option<SettingsChangeEvent> {
        self.events.try_recv().ok()
    }

    /// Block up to `timeout` for the next change.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SettingsChangeEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings_file(temp_dir: &TempDir) -> PathBuf {
        let path = temp_dir.path().join("settings.yaml");
        fs::write(&path, "/a/b: 1\n").expect("Failed to write settings");
        path
    }

    #[test]
    fn test_watcher_requires_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = SettingsWatcher::new(&temp_dir.path().join("missing.yaml"), 100);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_events_before_any_write() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = settings_file(&temp_dir);
        let watcher = SettingsWatcher::new(&path, 100).expect("Failed to create watcher");
        assert!(watcher.try_recv().is_none());
        assert!(format!("{watcher:?}").contains("SettingsWatcher"));
    }

    #[test]
    fn test_write_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = settings_file(&temp_dir);
        let watcher = SettingsWatcher::new(&path, 50).expect("Failed to create watcher");

        std::thread::sleep(Duration::from_millis(100));
        fs::write(&path, "/a/b: 2\n").expect("Failed to write settings");

        // Delivery is platform-dependent; only validate what does arrive.
        if let Some(event) = watcher.recv_timeout(Duration::from_millis(1000)) {
            assert!(event.path.ends_with("settings.yaml"));
        }
    }
}
