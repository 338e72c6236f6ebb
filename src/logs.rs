//! Recent-message logs shown in the user-info popup.
//!
//! Two log services are supported. Both return JSON; one wraps raw IRC lines
//! under `before`, the other plain text under `lines`. Fetching is left to the
//! caller.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("malformed log payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
    #[error("invalid channel name for log parsing: {0}")]
    Channel(#[from] regex::Error),
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    text: String,
    time: i64,
}

#[derive(Debug, Deserialize)]
struct PlainEntry {
    text: String,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LogPayload {
    Raw { before: Vec<RawEntry> },
    Plain { lines: Vec<PlainEntry> },
}

/// One logged message from a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub text: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.user,
            self.text
        )
    }
}

/// Parse a log-service response for `user` in `channel`, oldest first.
pub fn parse_logs(json: &str, channel: &str, user: &str) -> Result<Vec<LogLine>, LogError> {
    let payload: LogPayload = serde_json::from_str(json)?;

    let entries: Vec<(i64, String)> = match payload {
        LogPayload::Raw { before } => {
            let prefix = Regex::new(&format!(
                "^.*?PRIVMSG #{} :",
                regex::escape(channel.trim_start_matches('#'))
            ))?;
            before
                .into_iter()
                .map(|e| (e.time, prefix.replace(&e.text, "").into_owned()))
                .collect()
        }
        LogPayload::Plain { lines } => lines.into_iter().map(|e| (e.timestamp, e.text)).collect(),
    };

    entries
        .into_iter()
        .map(|(secs, text)| {
            let timestamp =
                DateTime::from_timestamp(secs, 0).ok_or(LogError::InvalidTimestamp(secs))?;
            Ok(LogLine {
                timestamp,
                user: user.to_string(),
                text,
            })
        })
        .collect()
}

/// Render lines the way the popup shows them, one per line.
pub fn render_logs(lines: &[LogLine]) -> String {
    lines
        .iter()
        .map(LogLine::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_irc_lines_are_stripped() {
        let json = r#"{"before":[
            {"text":"@badges=;color= :troll!troll@troll.tmi.twitch.tv PRIVMSG #pajlada :first","time":1520000000},
            {"text":":troll!troll@troll.tmi.twitch.tv PRIVMSG #pajlada :second :)","time":1520000060}
        ]}"#;
        let lines = parse_logs(json, "pajlada", "troll").expect("parse");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second :)");
        assert!(lines[0].timestamp < lines[1].timestamp);
    }

    #[test]
    fn test_other_channel_prefix_is_kept() {
        let json = r#"{"before":[{"text":"x PRIVMSG #other :hi","time":0}]}"#;
        let lines = parse_logs(json, "#pajlada", "troll").expect("parse");
        assert_eq!(lines[0].text, "x PRIVMSG #other :hi");
    }

    #[test]
    fn test_plain_lines_render() {
        let json = r#"{"lines":[{"text":"hello","timestamp":1520000000}]}"#;
        let lines = parse_logs(json, "pajlada", "viewer").expect("parse");
        assert_eq!(render_logs(&lines), "[2018-03-02 14:13:20] viewer: hello");
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            parse_logs(r#"{"unexpected":[]}"#, "c", "u"),
            Err(LogError::Json(_))
        ));
        assert!(matches!(
            parse_logs(r#"{"lines":[{"text":"x","timestamp":9223372036854775807}]}"#, "c", "u"),
            Err(LogError::InvalidTimestamp(_))
        ));
    }
}
