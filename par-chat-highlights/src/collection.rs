//! Observable, order-preserving list of highlight phrases.
//!
//! # Locking
//!
//! - `writer` serializes every mutation together with its write-through and
//!   listener fan-out, so listeners observe events in mutation order.
//! - `items` is held only long enough to copy or modify the list. Snapshots
//!   are `Arc` clones, so matching never blocks editing and vice versa.
//!
//! Listeners run on the mutating thread while `writer` is held. They may call
//! [`PhraseCollection::snapshot`] or [`PhraseCollection::get`] but must not
//! mutate the collection.

use crate::error::{HighlightError, Result};
use crate::phrase::HighlightPhrase;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time, read-only copy of the phrase list.
pub type PhraseSnapshot = Arc<Vec<HighlightPhrase>>;

/// Change notification emitted after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum PhraseEvent {
    Added {
        index: usize,
        phrase: HighlightPhrase,
    },
    Removed {
        index: usize,
        phrase: HighlightPhrase,
    },
    Updated {
        index: usize,
        old: HighlightPhrase,
        new: HighlightPhrase,
    },
    /// The whole list was replaced by a load or reload. Re-read via
    /// [`PhraseCollection::snapshot`].
    Reset { len: usize },
}

type Listener = Arc<dyn Fn(&PhraseEvent) + Send + Sync>;
type WriteThrough = Arc<dyn Fn(&[HighlightPhrase]) + Send + Sync>;

/// Handle returned by [`PhraseCollection::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct PhraseCollection {
    writer: Mutex<()>,
    items: RwLock<PhraseSnapshot>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
    write_through: RwLock<Option<WriteThrough>>,
}

impl std::fmt::Debug for PhraseCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseCollection")
            .field("phrases", &*self.items.read())
            .field("listeners", &self.listeners.lock().len())
            .finish_non_exhaustive()
    }
}

impl PhraseCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<HighlightPhrase> {
        self.items.read().get(index).cloned()
    }

    /// Consistent copy of the current list.
    pub fn snapshot(&self) -> PhraseSnapshot {
        Arc::clone(&self.items.read())
    }

    /// Append `phrase` and return its position.
    ///
    /// Exact duplicates are allowed but logged.
    pub fn append(&self, phrase: HighlightPhrase) -> usize {
        let _writer = self.writer.lock();
        let (index, contents) = {
            let mut items = self.items.write();
            if items.iter().any(|p| p.is_identical(&phrase)) {
                log::warn!(
                    "Adding duplicate highlight phrase '{}'",
                    phrase.pattern()
                );
            }
            Arc::make_mut(&mut items).push(phrase.clone());
            (items.len() - 1, Arc::clone(&items))
        };
        log::debug!("Highlight phrase added at {index}: '{}'", phrase.pattern());
        self.commit(&contents, PhraseEvent::Added { index, phrase });
        index
    }

    /// Remove the phrase at `index`; later phrases shift down by one.
    pub fn remove_at(&self, index: usize) -> Result<HighlightPhrase> {
        let _writer = self.writer.lock();
        let (phrase, contents) = {
            let mut items = self.items.write();
            check_index(index, items.len())?;
            let phrase = Arc::make_mut(&mut items).remove(index);
            (phrase, Arc::clone(&items))
        };
        log::debug!("Highlight phrase removed at {index}: '{}'", phrase.pattern());
        self.commit(
            &contents,
            PhraseEvent::Removed {
                index,
                phrase: phrase.clone(),
            },
        );
        Ok(phrase)
    }

    /// Replace the phrase at `index`.
    ///
    /// Replacing a phrase with an identical one is a no-op: nothing is
    /// persisted and no event is emitted.
    pub fn replace_at(&self, index: usize, phrase: HighlightPhrase) -> Result<()> {
        self.update_at(index, |_| Ok(phrase))
    }

    /// Read-modify-write of the phrase at `index`.
    ///
    /// `edit` sees the current phrase and runs with the writer lock held, so
    /// no other mutation can land between the read and the write. An error
    /// from `edit` leaves the list untouched.
    pub fn update_at(
        &self,
        index: usize,
        edit: impl FnOnce(&HighlightPhrase) -> Result<HighlightPhrase>,
    ) -> Result<()> {
        let _writer = self.writer.lock();
        let current = {
            let items = self.items.read();
            check_index(index, items.len())?;
            items[index].clone()
        };
        let phrase = edit(&current)?;
        if current.is_identical(&phrase) {
            return Ok(());
        }

        let (old, contents) = {
            let mut items = self.items.write();
            let old = std::mem::replace(&mut Arc::make_mut(&mut items)[index], phrase.clone());
            (old, Arc::clone(&items))
        };
        log::debug!("Highlight phrase updated at {index}: '{}'", phrase.pattern());
        self.commit(
            &contents,
            PhraseEvent::Updated {
                index,
                old,
                new: phrase,
            },
        );
        Ok(())
    }

    /// Replace the whole list without persisting it.
    ///
    /// Emits a single [`PhraseEvent::Reset`] instead of one event per phrase.
    pub fn reset(&self, phrases: Vec<HighlightPhrase>) {
        self.reset_with(|| phrases);
    }

    /// Like [`PhraseCollection::reset`], but `load` runs with the writer lock
    /// held. Mutations from other threads wait until the new list is in
    /// place instead of landing between the read and the reset.
    ///
    /// `load` must not mutate the collection.
    pub fn reset_with(&self, load: impl FnOnce() -> Vec<HighlightPhrase>) {
        let _writer = self.writer.lock();
        let phrases = load();
        let len = phrases.len();
        *self.items.write() = Arc::new(phrases);
        self.emit(&PhraseEvent::Reset { len });
    }

    /// Install the hook that persists the list after every mutation.
    ///
    /// It runs before listeners are notified.
    pub fn set_write_through(&self, hook: impl Fn(&[HighlightPhrase]) + Send + Sync + 'static) {
        let _writer = self.writer.lock();
        *self.write_through.write() = Some(Arc::new(hook));
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&PhraseEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let _writer = self.writer.lock();
        self.add_listener(Arc::new(listener))
    }

    /// Subscribe and take a snapshot atomically, so the listener sees every
    /// change made after the snapshot and none made before it.
    pub fn subscribe_with_snapshot(
        &self,
        listener: impl Fn(&PhraseEvent) + Send + Sync + 'static,
    ) -> (SubscriptionId, PhraseSnapshot) {
        let _writer = self.writer.lock();
        let id = self.add_listener(Arc::new(listener));
        (id, self.snapshot())
    }

    /// Returns `false` if the subscription was already removed.
    ///
    /// Must not be called from inside a listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let _writer = self.writer.lock();
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn add_listener(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    /// Caller holds `writer`.
    fn commit(&self, contents: &[HighlightPhrase], event: PhraseEvent) {
        let hook = self.write_through.read().clone();
        if let Some(hook) = hook {
            hook(contents);
        }
        self.emit(&event);
    }

    /// Caller holds `writer`.
    fn emit(&self, event: &PhraseEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(HighlightError::IndexOutOfRange { index, len });
    }
    Ok(())
}
