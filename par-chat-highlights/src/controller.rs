//! Highlight engine: owns the phrase list, keeps it persisted, and classifies
//! incoming messages.

use crate::collection::PhraseCollection;
use crate::error::HighlightError;
use crate::model::HighlightModel;
use crate::phrase::HighlightPhrase;
use crate::target::{HighlightMatch, HighlightTarget};
use par_chat_config::{SettingsStore, SettingsStoreExt};
use std::sync::{Arc, Once};

/// Settings key holding the ordered phrase list.
pub const HIGHLIGHTS_SETTING: &str = "/highlighting/highlights";

/// One per process; built at startup and shared with the message pipeline
/// and the settings editor.
pub struct HighlightController {
    phrases: Arc<PhraseCollection>,
    store: Arc<dyn SettingsStore>,
    init: Once,
}

impl std::fmt::Debug for HighlightController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightController")
            .field("phrases", &self.phrases.len())
            .field("initialized", &self.init.is_completed())
            .finish_non_exhaustive()
    }
}

impl HighlightController {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            phrases: Arc::new(PhraseCollection::new()),
            store,
            init: Once::new(),
        }
    }

    /// Load the stored phrases and start write-through persistence.
    ///
    /// Only the first call does anything. Every other method calls this, so
    /// explicit initialization is optional.
    pub fn initialize(&self) {
        self.init.call_once(|| {
            self.phrases.reset_with(|| {
                let loaded = load_phrases(self.store.as_ref());
                log::info!("Loaded {} highlight phrase(s)", loaded.len());
                loaded
            });

            let store = Arc::clone(&self.store);
            self.phrases
                .set_write_through(move |phrases: &[HighlightPhrase]| {
                    if let Err(e) = store.save(HIGHLIGHTS_SETTING, phrases) {
                        log::error!("{}", HighlightError::Persistence(e));
                    }
                });
        });
    }

    /// The live phrase list. Mutations through it are persisted.
    pub fn phrases(&self) -> &Arc<PhraseCollection> {
        self.initialize();
        &self.phrases
    }

    /// Editor projection of the phrase list.
    pub fn create_model(&self) -> HighlightModel {
        HighlightModel::new(Arc::clone(self.phrases()))
    }

    /// Re-read the list from the store after it was changed externally.
    ///
    /// Emits one [`crate::PhraseEvent::Reset`]. The store is read with the
    /// collection's writer lock held, so an edit made meanwhile is applied
    /// after the reload rather than lost from memory.
    pub fn reload(&self) {
        self.initialize();
        self.phrases.reset_with(|| {
            let loaded = load_phrases(self.store.as_ref());
            log::info!("Reloaded {} highlight phrase(s)", loaded.len());
            loaded
        });
    }

    /// Match `text` against every phrase.
    ///
    /// All phrases are evaluated, in order, so sound and alert accumulate
    /// over every match. Returns `None` when nothing matched.
    pub fn classify(&self, text: &str) -> Option<HighlightMatch> {
        let snapshot = self.phrases().snapshot();
        let mut result: Option<HighlightMatch> = None;
        for phrase in snapshot.iter().filter(|p| p.is_match(text)) {
            let hit = result.get_or_insert_with(HighlightMatch::default);
            hit.sound |= phrase.has_sound();
            hit.alert |= phrase.has_alert();
            hit.matched += 1;
        }
        result
    }

    /// Classify `message` and mark it when something matched.
    ///
    /// Unmatched messages are left untouched.
    pub fn add_highlight<M: HighlightTarget + ?Sized>(
        &self,
        message: &mut M,
    ) -> Option<HighlightMatch> {
        let hit = self.classify(message.text())?;
        log::trace!(
            "Message highlighted by {} phrase(s) (sound={}, alert={})",
            hit.matched,
            hit.sound,
            hit.alert
        );
        message.apply_highlight(hit);
        Some(hit)
    }
}

/// Read the stored list, skipping entries that do not parse.
fn load_phrases(store: &dyn SettingsStore) -> Vec<HighlightPhrase> {
    let raw: Vec<serde_yaml_ng::Value> = match store.load(HIGHLIGHTS_SETTING) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::error!("Failed to read {HIGHLIGHTS_SETTING}: {e}");
            return Vec::new();
        }
    };

    raw.into_iter()
        .enumerate()
        .filter_map(
            |(i, value)| match serde_yaml_ng::from_value::<HighlightPhrase>(value) {
                Ok(phrase) => Some(phrase),
                Err(e) => {
                    log::warn!("Skipping stored highlight phrase #{i}: {e}");
                    None
                }
            },
        )
        .collect()
}
