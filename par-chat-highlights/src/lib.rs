//! Highlight phrases for par-chat.
//!
//! A user-maintained list of [`HighlightPhrase`]s is matched against every
//! incoming chat message. Matching messages are marked highlighted and may
//! request a notification sound and a window flash.
//!
//! - [`PhraseCollection`]: observable ordered list with change events
//! - [`HighlightController`]: persistence and message classification
//! - [`HighlightModel`]: table projection for the settings editor

pub mod collection;
pub mod controller;
pub mod error;
pub mod model;
pub mod phrase;
pub mod target;

pub use collection::{PhraseCollection, PhraseEvent, PhraseSnapshot, SubscriptionId};
pub use controller::{HIGHLIGHTS_SETTING, HighlightController};
pub use error::HighlightError;
pub use model::{CellValue, HighlightColumn, HighlightModel, RowChange};
pub use phrase::{HighlightPhrase, PhraseRecord};
pub use target::{HighlightMatch, HighlightState, HighlightTarget};
