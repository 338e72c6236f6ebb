//! Result of matching a message against the phrase list, and the trait that
//! lets the engine write it back onto a message.

/// Notification level of a message after highlight matching.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightState {
    /// No phrase matched.
    #[default]
    None,
    /// Highlighted without a sound.
    Silent,
    /// Highlighted and a sound should play.
    WithSound,
}

impl HighlightState {
    pub fn is_highlighted(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Accumulated outcome over every phrase that matched one message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HighlightMatch {
    /// At least one matching phrase wants a sound.
    pub sound: bool,
    /// At least one matching phrase wants the window flashed.
    pub alert: bool,
    /// How many phrases matched.
    pub matched: usize,
}

impl HighlightMatch {
    pub fn state(&self) -> HighlightState {
        if self.sound {
            HighlightState::WithSound
        } else {
            HighlightState::Silent
        }
    }
}

/// A message the highlight engine can inspect and mark.
pub trait HighlightTarget {
    /// Text the phrases are matched against.
    fn text(&self) -> &str;

    /// Called once per message, only when at least one phrase matched.
    fn apply_highlight(&mut self, highlight: HighlightMatch);
}
