//! Shared integration test helpers for par-chat.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{settings_file, phrase};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers is used per file.

#![allow(dead_code)]

use par_chat::highlights::HighlightPhrase;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory and returns the path of a settings file
/// inside it. The file itself is not created.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn settings_path_in_tmp() -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("settings.yaml");
    (path, temp_dir)
}

/// Like [`settings_path_in_tmp`], but writes `yaml` to the file first.
pub fn settings_file(yaml: &str) -> (PathBuf, TempDir) {
    let (path, temp_dir) = settings_path_in_tmp();
    fs::write(&path, yaml).expect("Failed to write settings file");
    (path, temp_dir)
}

/// Plain, case-insensitive phrase without sound or alert.
pub fn phrase(pattern: &str) -> HighlightPhrase {
    HighlightPhrase::new(pattern, false, false, false, false).expect("valid phrase")
}

/// Settings file content holding the given highlight list.
pub const TWO_PHRASES_YAML: &str = r#"
/highlighting/highlights:
  - pattern: forsen
    sound: true
  - pattern: "^!\\w+"
    is_regex: true
    alert: true
/windows/main/geometry/width: 1024
"#;
