//! Chat messages as delivered by the ingestion pipeline.

use chrono::{DateTime, Local};
use par_chat_highlights::{HighlightMatch, HighlightState, HighlightTarget};

/// One chat line received on a channel.
#[derive(Debug, Clone)]
pub struct Message {
    pub channel: String,
    pub login_name: String,
    pub text: String,
    pub received_at: DateTime<Local>,
    highlight: HighlightState,
    flash: bool,
}

impl Message {
    pub fn new(
        channel: impl Into<String>,
        login_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            login_name: login_name.into(),
            text: text.into(),
            received_at: Local::now(),
            highlight: HighlightState::None,
            flash: false,
        }
    }

    pub fn highlight_state(&self) -> HighlightState {
        self.highlight
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.is_highlighted()
    }

    pub fn should_play_sound(&self) -> bool {
        self.highlight == HighlightState::WithSound
    }

    pub fn should_flash(&self) -> bool {
        self.flash
    }
}

impl HighlightTarget for Message {
    fn text(&self) -> &str {
        &self.text
    }

    fn apply_highlight(&mut self, highlight: HighlightMatch) {
        self.highlight = highlight.state();
        self.flash = highlight.alert;
    }
}
