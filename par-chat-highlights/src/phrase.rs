//! A single user-defined highlight rule.

use crate::error::{HighlightError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Persisted shape of a [`HighlightPhrase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRecord {
    pub pattern: String,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub sound: bool,
    #[serde(default)]
    pub alert: bool,
}

/// Immutable highlight rule.
///
/// Identity (`==`, `Hash`) covers the pattern, the regex flag and the case
/// flag. The sound and alert toggles are presentation attributes; use
/// [`HighlightPhrase::is_identical`] to compare every field.
///
/// The matcher is compiled on first use and shared between clones. A regex
/// that fails to compile is logged once and the phrase never matches.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "PhraseRecord", into = "PhraseRecord")]
pub struct HighlightPhrase {
    pattern: String,
    is_regex: bool,
    case_sensitive: bool,
    sound: bool,
    alert: bool,
    matcher: Arc<OnceLock<Option<Regex>>>,
}

impl HighlightPhrase {
    pub fn new(
        pattern: impl Into<String>,
        is_regex: bool,
        case_sensitive: bool,
        sound: bool,
        alert: bool,
    ) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(HighlightError::EmptyPattern);
        }
        Ok(Self {
            pattern,
            is_regex,
            case_sensitive,
            sound,
            alert,
            matcher: Arc::new(OnceLock::new()),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_regex(&self) -> bool {
        self.is_regex
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn has_sound(&self) -> bool {
        self.sound
    }

    /// Whether a match should flash / alert the window.
    pub fn has_alert(&self) -> bool {
        self.alert
    }

    /// Replacement phrase with a different pattern.
    pub fn with_pattern(&self, pattern: impl Into<String>) -> Result<Self> {
        Self::new(
            pattern,
            self.is_regex,
            self.case_sensitive,
            self.sound,
            self.alert,
        )
    }

    pub fn with_regex(&self, is_regex: bool) -> Self {
        Self {
            is_regex,
            matcher: Arc::new(OnceLock::new()),
            ..self.clone()
        }
    }

    pub fn with_case_sensitive(&self, case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            matcher: Arc::new(OnceLock::new()),
            ..self.clone()
        }
    }

    // Sound and alert do not affect matching, so the compiled matcher is kept.
    pub fn with_sound(&self, sound: bool) -> Self {
        Self {
            sound,
            ..self.clone()
        }
    }

    pub fn with_alert(&self, alert: bool) -> Self {
        Self {
            alert,
            ..self.clone()
        }
    }

    /// Field-by-field equality, including sound and alert.
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other && self.sound == other.sound && self.alert == other.alert
    }

    /// Report whether the pattern can be matched at all.
    ///
    /// Editors use this to flag a broken regex; matching never returns it.
    pub fn validate(&self) -> Result<()> {
        if !self.is_regex {
            return Ok(());
        }
        self.build_regex()
            .map(|_| ())
            .map_err(|source| HighlightError::InvalidRegex {
                pattern: self.pattern.clone(),
                source,
            })
    }

    /// Test `text` against this phrase.
    pub fn is_match(&self, text: &str) -> bool {
        if !self.is_regex && self.case_sensitive {
            return text.contains(self.pattern.as_str());
        }
        self.matcher().is_some_and(|re| re.is_match(text))
    }

    fn matcher(&self) -> Option<&Regex> {
        self.matcher
            .get_or_init(|| match self.build_regex() {
                Ok(re) => Some(re),
                Err(e) => {
                    log::warn!(
                        "Highlight phrase '{}' disabled, pattern does not compile: {}",
                        self.pattern,
                        e
                    );
                    None
                }
            })
            .as_ref()
    }

    fn build_regex(&self) -> std::result::Result<Regex, regex::Error> {
        let source = if self.is_regex {
            self.pattern.clone()
        } else {
            regex::escape(&self.pattern)
        };
        RegexBuilder::new(&source)
            .case_insensitive(!self.case_sensitive)
            .build()
    }
}

impl PartialEq for HighlightPhrase {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.is_regex == other.is_regex
            && self.case_sensitive == other.case_sensitive
    }
}

impl Eq for HighlightPhrase {}

impl Hash for HighlightPhrase {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
        self.is_regex.hash(state);
        self.case_sensitive.hash(state);
    }
}

impl std::fmt::Debug for HighlightPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightPhrase")
            .field("pattern", &self.pattern)
            .field("is_regex", &self.is_regex)
            .field("case_sensitive", &self.case_sensitive)
            .field("sound", &self.sound)
            .field("alert", &self.alert)
            .finish()
    }
}

impl TryFrom<PhraseRecord> for HighlightPhrase {
    type Error = HighlightError;

    fn try_from(record: PhraseRecord) -> Result<Self> {
        Self::new(
            record.pattern,
            record.is_regex,
            record.case_sensitive,
            record.sound,
            record.alert,
        )
    }
}

impl From<HighlightPhrase> for PhraseRecord {
    fn from(phrase: HighlightPhrase) -> Self {
        Self {
            pattern: phrase.pattern,
            is_regex: phrase.is_regex,
            case_sensitive: phrase.case_sensitive,
            sound: phrase.sound,
            alert: phrase.alert,
        }
    }
}
