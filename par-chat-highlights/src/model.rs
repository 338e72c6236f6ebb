//! Table model for the highlight phrase editor.
//!
//! Rows mirror the [`PhraseCollection`] one-to-one. Edits are forwarded to the
//! collection and come back as [`PhraseEvent`]s, which update the rows
//! incrementally and queue a [`RowChange`] for the view to drain.

use crate::collection::{PhraseCollection, PhraseEvent, SubscriptionId};
use crate::error::{HighlightError, Result};
use crate::phrase::HighlightPhrase;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Editor columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightColumn {
    Pattern,
    Flash,
    Sound,
    Regex,
    CaseSensitive,
}

impl HighlightColumn {
    /// All columns for UI iteration
    pub fn all() -> &'static [HighlightColumn] {
        &[
            Self::Pattern,
            Self::Flash,
            Self::Sound,
            Self::Regex,
            Self::CaseSensitive,
        ]
    }

    /// Header text
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Pattern => "Pattern",
            Self::Flash => "Flash taskbar",
            Self::Sound => "Play sound",
            Self::Regex => "Regex",
            Self::CaseSensitive => "Case-sensitive",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }
}

/// Content of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Check(bool),
}

/// Row-level change for the view to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Inserted(usize),
    Removed(usize),
    Changed(usize),
    Reset,
}

#[derive(Default)]
struct ModelState {
    rows: Vec<HighlightPhrase>,
    pending: Vec<RowChange>,
}

impl ModelState {
    fn apply(&mut self, event: &PhraseEvent, collection: &Weak<PhraseCollection>) {
        match event {
            PhraseEvent::Added { index, phrase } => {
                let index = (*index).min(self.rows.len());
                self.rows.insert(index, phrase.clone());
                self.pending.push(RowChange::Inserted(index));
            }
            PhraseEvent::Removed { index, .. } => {
                if *index < self.rows.len() {
                    self.rows.remove(*index);
                    self.pending.push(RowChange::Removed(*index));
                }
            }
            PhraseEvent::Updated { index, new, .. } => {
                if let Some(row) = self.rows.get_mut(*index) {
                    *row = new.clone();
                    self.pending.push(RowChange::Changed(*index));
                }
            }
            PhraseEvent::Reset { .. } => {
                if let Some(collection) = collection.upgrade() {
                    self.rows = collection.snapshot().to_vec();
                }
                self.pending.push(RowChange::Reset);
            }
        }
    }
}

/// Editable projection of a [`PhraseCollection`].
///
/// Dropping the model unsubscribes it from the collection.
pub struct HighlightModel {
    phrases: Arc<PhraseCollection>,
    state: Arc<Mutex<ModelState>>,
    subscription: SubscriptionId,
}

impl std::fmt::Debug for HighlightModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightModel")
            .field("rows", &self.row_count())
            .finish_non_exhaustive()
    }
}

impl HighlightModel {
    pub fn new(phrases: Arc<PhraseCollection>) -> Self {
        let state = Arc::new(Mutex::new(ModelState::default()));
        let listener_state = Arc::clone(&state);
        let weak = Arc::downgrade(&phrases);
        // Hold the row lock until seeded so no event can land on empty rows.
        let mut seeding = state.lock();
        let (subscription, snapshot) =
            phrases.subscribe_with_snapshot(move |event: &PhraseEvent| {
                listener_state.lock().apply(event, &weak);
            });
        seeding.rows = snapshot.to_vec();
        drop(seeding);

        Self {
            phrases,
            state,
            subscription,
        }
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().rows.len()
    }

    pub fn column_count(&self) -> usize {
        HighlightColumn::all().len()
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        HighlightColumn::from_index(column).map(HighlightColumn::display_name)
    }

    pub fn row(&self, row: usize) -> Option<HighlightPhrase> {
        self.state.lock().rows.get(row).cloned()
    }

    pub fn data(&self, row: usize, column: HighlightColumn) -> Option<CellValue> {
        let state = self.state.lock();
        let phrase = state.rows.get(row)?;
        Some(match column {
            HighlightColumn::Pattern => CellValue::Text(phrase.pattern().to_string()),
            HighlightColumn::Flash => CellValue::Check(phrase.has_alert()),
            HighlightColumn::Sound => CellValue::Check(phrase.has_sound()),
            HighlightColumn::Regex => CellValue::Check(phrase.is_regex()),
            HighlightColumn::CaseSensitive => CellValue::Check(phrase.is_case_sensitive()),
        })
    }

    /// Problem with the row's pattern, for an error tooltip.
    pub fn row_error(&self, row: usize) -> Option<String> {
        self.row(row)?.validate().err().map(|e| e.to_string())
    }

    /// Queued row changes since the last call, oldest first.
    pub fn drain_changes(&self) -> Vec<RowChange> {
        std::mem::take(&mut self.state.lock().pending)
    }

    pub fn append_row(&self, phrase: HighlightPhrase) -> usize {
        self.phrases.append(phrase)
    }

    pub fn remove_row(&self, row: usize) -> Result<()> {
        self.phrases.remove_at(row).map(|_| ())
    }

    /// Edit one cell. The row is replaced in the collection by a phrase with
    /// that single field changed, read and written under the collection's
    /// writer lock so concurrent edits to other fields are kept.
    pub fn set_data(&self, row: usize, column: HighlightColumn, value: CellValue) -> Result<()> {
        self.phrases
            .update_at(row, |current| match (column, value) {
                (HighlightColumn::Pattern, CellValue::Text(pattern)) => {
                    current.with_pattern(pattern)
                }
                (HighlightColumn::Flash, CellValue::Check(on)) => Ok(current.with_alert(on)),
                (HighlightColumn::Sound, CellValue::Check(on)) => Ok(current.with_sound(on)),
                (HighlightColumn::Regex, CellValue::Check(on)) => Ok(current.with_regex(on)),
                (HighlightColumn::CaseSensitive, CellValue::Check(on)) => {
                    Ok(current.with_case_sensitive(on))
                }
                (column, _) => Err(HighlightError::WrongCellType {
                    column: column.display_name(),
                }),
            })
    }
}

impl Drop for HighlightModel {
    fn drop(&mut self) {
        self.phrases.unsubscribe(self.subscription);
    }
}
