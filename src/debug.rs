use parking_lot::Mutex;
/// File-backed logging for par-chat.
///
/// Controlled by the `--log-level` flag, or the DEBUG_LEVEL environment
/// variable when no flag is given:
/// - 0 or unset: No logging
/// - 1: Errors only
/// - 2: Info level (settings loads, highlight list changes)
/// - 3: Debug level
/// - 4: Trace level (every classified message)
///
/// All output goes to /tmp/par_chat_debug.log on Unix/macOS,
/// or %TEMP%\par_chat_debug.log on Windows. When RUST_LOG is set, records
/// are mirrored to stderr as well.
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use log::{LevelFilter, Log, Metadata, Record};

/// Map a DEBUG_LEVEL value to a filter. Unknown values disable logging.
pub fn level_from_debug_env(value: &str) -> LevelFilter {
    match value.trim().parse::<u8>() {
        Ok(1) => LevelFilter::Error,
        Ok(2) => LevelFilter::Info,
        Ok(3) => LevelFilter::Debug,
        Ok(4) => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

/// Resolve the effective level: the CLI flag wins over DEBUG_LEVEL.
pub fn resolve_level(cli_level: Option<LevelFilter>, debug_env: Option<&str>) -> LevelFilter {
    cli_level.unwrap_or_else(|| debug_env.map_or(LevelFilter::Off, level_from_debug_env))
}

pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    let path = PathBuf::from("/tmp/par_chat_debug.log");
    #[cfg(not(unix))]
    let path = std::env::temp_dir().join("par_chat_debug.log");
    path
}

struct DebugLogger {
    level: LevelFilter,
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl DebugLogger {
    fn new(level: LevelFilter, mirror_stderr: bool) -> Self {
        let file = if level != LevelFilter::Off {
            // A log file that can't be opened just means no file output.
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_path())
                .ok()
        } else {
            None
        };

        let logger = DebugLogger {
            level,
            file: Mutex::new(file),
            mirror_stderr,
        };
        logger.write_raw(&format!(
            "\n{}\npar-chat debug session started at {} (level={})\n{}\n",
            "=".repeat(80),
            timestamp(),
            level,
            "=".repeat(80)
        ));
        logger
    }

    fn write_raw(&self, msg: &str) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

/// Install the file logger as the `log` backend.
///
/// Later calls are ignored; the first resolved level stays in effect.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let debug_env = std::env::var("DEBUG_LEVEL").ok();
    let level = resolve_level(cli_level, debug_env.as_deref());
    let mirror_stderr = std::env::var_os("RUST_LOG").is_some();

    let logger = LOGGER.get_or_init(|| DebugLogger::new(level, mirror_stderr));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_env_mapping() {
        assert_eq!(level_from_debug_env("0"), LevelFilter::Off);
        assert_eq!(level_from_debug_env("1"), LevelFilter::Error);
        assert_eq!(level_from_debug_env(" 2 "), LevelFilter::Info);
        assert_eq!(level_from_debug_env("3"), LevelFilter::Debug);
        assert_eq!(level_from_debug_env("4"), LevelFilter::Trace);
        assert_eq!(level_from_debug_env("verbose"), LevelFilter::Off);
    }

    #[test]
    fn test_cli_level_wins() {
        assert_eq!(
            resolve_level(Some(LevelFilter::Error), Some("4")),
            LevelFilter::Error
        );
        assert_eq!(resolve_level(None, Some("3")), LevelFilter::Debug);
        assert_eq!(resolve_level(None, None), LevelFilter::Off);
    }
}
