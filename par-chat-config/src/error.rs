//! Typed error variants for the par-chat-config crate.
//!
//! Library consumers can match on these instead of opaque `anyhow` strings.
//! Binary-level code still wraps them in `anyhow::Error` via `?`.

use thiserror::Error;

/// Errors that can occur when reading or writing the settings store.
///
/// # Example
///
/// ```rust,no_run
/// use par_chat_config::SettingsError;
///
/// fn describe(e: &SettingsError) -> &'static str {
///     match e {
///         SettingsError::Io(_) => "disk",
///         SettingsError::Parse(_) => "yaml",
///         SettingsError::Validation(_) => "value",
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred reading or writing the settings file.
    #[error("I/O error accessing settings: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file, or a value stored under a key, was not valid YAML
    /// for the requested type.
    #[error("YAML error in settings: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A setting key or value failed semantic validation.
    ///
    /// The inner string describes which key is invalid and why.
    #[error("Settings validation error: {0}")]
    Validation(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SettingsError>;
