//! Command-line interface for par-chat.
//!
//! The subcommands manage the highlight list stored in the settings file and
//! test messages against it.

use crate::context::ChatContext;
use crate::message::Message;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use par_chat_highlights::HighlightPhrase;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Debounce applied to settings file change notifications.
const WATCH_DEBOUNCE_MS: u64 = 100;

/// par-chat - highlight phrase manager for the par-chat client
#[derive(Parser, Debug)]
#[command(name = "par-chat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    /// Log level written to the debug log (overrides DEBUG_LEVEL)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the highlight phrases in order
    List,
    /// Append a highlight phrase
    Add {
        pattern: String,

        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,

        /// Match case exactly
        #[arg(long)]
        case_sensitive: bool,

        /// Play a sound when the phrase matches
        #[arg(long)]
        sound: bool,

        /// Flash the window when the phrase matches
        #[arg(long)]
        flash: bool,
    },
    /// Remove the phrase at INDEX (as shown by `list`)
    Remove { index: usize },
    /// Classify messages; reads lines from stdin when no text is given
    Check { text: Vec<String> },
    /// Reload the highlight list whenever the settings file changes
    Watch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Run one subcommand against `ctx`.
///
/// `input` is only read by `check` without arguments.
pub fn execute(
    command: Commands,
    ctx: &ChatContext,
    out: &mut dyn Write,
    input: &mut dyn BufRead,
) -> Result<()> {
    match command {
        Commands::List => list(ctx, out),
        Commands::Add {
            pattern,
            regex,
            case_sensitive,
            sound,
            flash,
        } => {
            let phrase = HighlightPhrase::new(pattern, regex, case_sensitive, sound, flash)?;
            phrase.validate()?;
            let index = ctx.highlights().phrases().append(phrase);
            writeln!(out, "Added highlight #{index}")?;
            Ok(())
        }
        Commands::Remove { index } => {
            let removed = ctx.highlights().phrases().remove_at(index)?;
            writeln!(out, "Removed highlight #{index}: {}", removed.pattern())?;
            Ok(())
        }
        Commands::Check { text } => {
            if text.is_empty() {
                for line in input.lines() {
                    let line = line.context("Failed to read message from stdin")?;
                    check(ctx, &line, out)?;
                }
            } else {
                check(ctx, &text.join(" "), out)?;
            }
            Ok(())
        }
        Commands::Watch => watch(ctx, out),
    }
}

fn list(ctx: &ChatContext, out: &mut dyn Write) -> Result<()> {
    let phrases = ctx.highlights().phrases().snapshot();
    if phrases.is_empty() {
        writeln!(out, "No highlight phrases")?;
        return Ok(());
    }
    for (i, phrase) in phrases.iter().enumerate() {
        let mut flags = Vec::new();
        if phrase.is_regex() {
            flags.push("regex");
        }
        if phrase.is_case_sensitive() {
            flags.push("case-sensitive");
        }
        if phrase.has_sound() {
            flags.push("sound");
        }
        if phrase.has_alert() {
            flags.push("flash");
        }
        if flags.is_empty() {
            writeln!(out, "{i}: {}", phrase.pattern())?;
        } else {
            writeln!(out, "{i}: {} [{}]", phrase.pattern(), flags.join(", "))?;
        }
    }
    Ok(())
}

fn check(ctx: &ChatContext, text: &str, out: &mut dyn Write) -> Result<()> {
    let mut message = Message::new("cli", "cli", text);
    match ctx.process_message(&mut message) {
        Some(hit) => {
            let mut effects = Vec::new();
            if message.should_play_sound() {
                effects.push("sound");
            }
            if message.should_flash() {
                effects.push("flash");
            }
            write!(out, "highlighted ({} match(es))", hit.matched)?;
            if !effects.is_empty() {
                write!(out, " [{}]", effects.join(", "))?;
            }
            writeln!(out, ": {text}")?;
        }
        None => writeln!(out, "no match: {text}")?,
    }
    Ok(())
}

fn watch(ctx: &ChatContext, out: &mut dyn Write) -> Result<()> {
    let path = ctx
        .settings_path()
        .context("Watching requires a settings file")?;
    let watcher = par_chat_config::SettingsWatcher::new(&path, WATCH_DEBOUNCE_MS)?;
    writeln!(out, "Watching {} (Ctrl-C to stop)", path.display())?;
    out.flush()?;

    loop {
        let Some(event) = watcher.recv_timeout(Duration::from_secs(1)) else {
            continue;
        };
        log::debug!("Settings change detected: {}", event.path.display());
        let changed = ctx.reload_settings()?;
        if changed.is_empty() {
            continue;
        }
        writeln!(
            out,
            "Reloaded {} ({} phrase(s))",
            changed.join(", "),
            ctx.highlights().phrases().len()
        )?;
        out.flush()?;
    }
}
