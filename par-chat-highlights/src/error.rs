//! Error type for highlight phrase operations.

use par_chat_config::SettingsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighlightError {
    /// A position-based collection or model operation got a stale index.
    #[error("index {index} out of range for {len} highlight phrase(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("highlight pattern must not be empty")]
    EmptyPattern,

    /// Only reported by [`crate::HighlightPhrase::validate`]; matching treats
    /// such phrases as never matching.
    #[error("invalid highlight regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An editor wrote a value of the wrong kind into a column.
    #[error("column '{column}' does not accept this value")]
    WrongCellType { column: &'static str },

    #[error("failed to persist highlight phrases: {0}")]
    Persistence(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, HighlightError>;
