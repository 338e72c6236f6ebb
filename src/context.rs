//! Process-wide services, built once at startup and passed to whatever needs
//! them.

use crate::message::Message;
use crate::tagged_users::TaggedUsers;
use anyhow::{Context, Result};
use par_chat_config::{MemorySettingsStore, SettingsStore, YamlSettingsStore};
use par_chat_highlights::{HighlightController, HighlightMatch};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct ChatContext {
    settings: Arc<dyn SettingsStore>,
    /// Set when the settings come from a file that can be reloaded.
    file: Option<Arc<YamlSettingsStore>>,
    highlights: HighlightController,
    tagged_users: TaggedUsers,
}

impl std::fmt::Debug for ChatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatContext")
            .field("settings_path", &self.settings_path())
            .field("highlights", &self.highlights)
            .finish_non_exhaustive()
    }
}

impl ChatContext {
    /// Open the settings file at `path`, or the default location, and load
    /// the highlight list from it.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let store = match path {
            Some(path) => YamlSettingsStore::open(path),
            None => YamlSettingsStore::open_default(),
        }
        .context("Failed to open settings")?;

        let file = Arc::new(store);
        let settings: Arc<dyn SettingsStore> = file.clone();
        let ctx = Self {
            highlights: HighlightController::new(Arc::clone(&settings)),
            tagged_users: TaggedUsers::load(Arc::clone(&settings)),
            settings,
            file: Some(file),
        };
        ctx.highlights.initialize();
        Ok(ctx)
    }

    /// Context backed by a throwaway in-memory store.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemorySettingsStore::new()))
    }

    pub fn with_store(settings: Arc<dyn SettingsStore>) -> Self {
        let ctx = Self {
            highlights: HighlightController::new(Arc::clone(&settings)),
            tagged_users: TaggedUsers::load(Arc::clone(&settings)),
            settings,
            file: None,
        };
        ctx.highlights.initialize();
        ctx
    }

    pub fn highlights(&self) -> &HighlightController {
        &self.highlights
    }

    pub fn tagged_users(&self) -> &TaggedUsers {
        &self.tagged_users
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn settings_path(&self) -> Option<PathBuf> {
        self.file.as_ref().map(|f| f.path().to_path_buf())
    }

    /// Run an incoming message through the highlight engine.
    pub fn process_message(&self, message: &mut Message) -> Option<HighlightMatch> {
        self.highlights.add_highlight(message)
    }

    /// Re-read the settings file after an external change.
    ///
    /// Returns the keys whose values changed. The highlight list is only
    /// reloaded when its key is among them.
    pub fn reload_settings(&self) -> Result<Vec<String>> {
        let Some(file) = &self.file else {
            return Ok(Vec::new());
        };
        let changed = file
            .reload()
            .with_context(|| format!("Failed to reload {}", file.path().display()))?;
        if changed
            .iter()
            .any(|k| k == par_chat_highlights::HIGHLIGHTS_SETTING)
        {
            self.highlights.reload();
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use par_chat_highlights::HighlightPhrase;

    #[test]
    fn test_in_memory_context_highlights_messages() {
        let ctx = ChatContext::in_memory();
        assert!(ctx.settings_path().is_none());

        let phrase = HighlightPhrase::new("forsen", false, false, true, false).expect("phrase");
        ctx.highlights().phrases().append(phrase);

        let mut msg = Message::new("pajlada", "viewer", "FORSEN!");
        let hit = ctx.process_message(&mut msg).expect("highlighted");
        assert!(hit.sound && !hit.alert);
        assert!(msg.should_play_sound());

        let mut plain = Message::new("pajlada", "viewer", "hello");
        assert!(ctx.process_message(&mut plain).is_none());
        assert!(!plain.is_highlighted());
    }

    #[test]
    fn test_reload_without_file_is_noop() {
        let ctx = ChatContext::in_memory();
        assert!(ctx.reload_settings().expect("reload").is_empty());
    }
}
