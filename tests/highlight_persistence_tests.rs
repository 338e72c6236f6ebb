//! Highlight list persistence and classification against a real settings file.

mod common;

use common::{TWO_PHRASES_YAML, phrase, settings_file, settings_path_in_tmp};
use par_chat::config::{SettingsStore, WindowGeometry, YamlSettingsStore};
use par_chat::highlights::{
    CellValue, HIGHLIGHTS_SETTING, HighlightColumn, HighlightController, HighlightPhrase,
    PhraseEvent,
};
use par_chat::{ChatContext, Message};
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;

fn stored_patterns(path: &std::path::Path) -> Vec<String> {
    let store = YamlSettingsStore::open(path).expect("reopen");
    let value = store.get(HIGHLIGHTS_SETTING).expect("get").unwrap_or_default();
    let records: Vec<par_chat::highlights::PhraseRecord> =
        serde_yaml_ng::from_value(value).unwrap_or_default();
    records.into_iter().map(|r| r.pattern).collect()
}

#[test]
fn test_loads_phrases_from_file() {
    let (path, _tmp) = settings_file(TWO_PHRASES_YAML);
    let ctx = ChatContext::open(Some(path.as_path())).expect("open");

    let phrases = ctx.highlights().phrases().snapshot();
    assert_eq!(phrases.len(), 2);
    assert_eq!(phrases[0].pattern(), "forsen");
    assert!(phrases[0].has_sound());
    assert!(phrases[1].is_regex() && phrases[1].has_alert());

    let geometry = WindowGeometry::load(ctx.settings().as_ref(), "main").expect("geometry");
    assert_eq!(geometry.width, 1024);
}

#[test]
fn test_missing_file_starts_empty_and_is_created_on_first_edit() {
    let (path, _tmp) = settings_path_in_tmp();
    let ctx = ChatContext::open(Some(path.as_path())).expect("open");
    assert!(ctx.highlights().phrases().is_empty());
    assert!(!path.exists());

    ctx.highlights().phrases().append(phrase("pajlada"));
    assert!(path.exists());
    assert_eq!(stored_patterns(&path), vec!["pajlada".to_string()]);
}

#[test]
fn test_every_mutation_is_written_through() {
    let (path, _tmp) = settings_file(TWO_PHRASES_YAML);
    let ctx = ChatContext::open(Some(path.as_path())).expect("open");
    let phrases = ctx.highlights().phrases();

    phrases.append(phrase("third"));
    assert_eq!(stored_patterns(&path), ["forsen", "^!\\w+", "third"]);

    phrases.remove_at(0).expect("remove");
    assert_eq!(stored_patterns(&path), ["^!\\w+", "third"]);

    let edited = phrases.get(1).expect("row").with_pattern("fourth").expect("pattern");
    phrases.replace_at(1, edited).expect("replace");
    assert_eq!(stored_patterns(&path), ["^!\\w+", "fourth"]);

    // Unrelated keys survive write-through.
    let reopened = YamlSettingsStore::open(&path).expect("reopen");
    assert_eq!(WindowGeometry::load(&reopened, "main").expect("geometry").width, 1024);
}

#[test]
fn test_edits_through_model_persist() {
    let (path, _tmp) = settings_file(TWO_PHRASES_YAML);
    let ctx = ChatContext::open(Some(path.as_path())).expect("open");
    let model = ctx.highlights().create_model();

    model
        .set_data(0, HighlightColumn::Pattern, CellValue::Text("xqc".into()))
        .expect("edit");
    model
        .set_data(0, HighlightColumn::CaseSensitive, CellValue::Check(true))
        .expect("edit");
    drop(model);

    let reopened = ChatContext::open(Some(path.as_path())).expect("reopen");
    let first = reopened.highlights().phrases().get(0).expect("row");
    assert_eq!(first.pattern(), "xqc");
    assert!(first.is_case_sensitive());
    assert!(first.has_sound());
}

#[test]
fn test_bad_entries_are_skipped() {
    let yaml = r#"
/highlighting/highlights:
  - pattern: ""
  - not_a_phrase: 3
  - pattern: kept
"#;
    let (path, _tmp) = settings_file(yaml);
    let ctx = ChatContext::open(Some(path.as_path())).expect("open");
    let phrases = ctx.highlights().phrases().snapshot();
    assert_eq!(phrases.len(), 1);
    assert_eq!(phrases[0].pattern(), "kept");
}

#[test]
fn test_external_change_is_picked_up_on_reload() {
    let (path, _tmp) = settings_file(TWO_PHRASES_YAML);
    let ctx = ChatContext::open(Some(path.as_path())).expect("open");

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    ctx.highlights()
        .phrases()
        .subscribe(move |event: &PhraseEvent| sink.lock().push(event.clone()));

    fs::write(
        &path,
        "/highlighting/highlights:\n  - pattern: replaced\n/windows/main/geometry/width: 1024\n",
    )
    .expect("write");
    let changed = ctx.reload_settings().expect("reload");
    assert_eq!(changed, vec![HIGHLIGHTS_SETTING.to_string()]);
    assert_eq!(*events.lock(), vec![PhraseEvent::Reset { len: 1 }]);

    let mut msg = Message::new("pajlada", "viewer", "this was REPLACED");
    assert!(ctx.process_message(&mut msg).is_some());

    // Unchanged file: nothing to reload.
    assert!(ctx.reload_settings().expect("reload").is_empty());
    assert_eq!(events.lock().len(), 1);
}

#[test]
fn test_controller_on_shared_store() {
    let (path, _tmp) = settings_file(TWO_PHRASES_YAML);
    let store: Arc<dyn SettingsStore> = Arc::new(YamlSettingsStore::open(&path).expect("open"));
    let controller = HighlightController::new(Arc::clone(&store));

    let mut hit_msg = Message::new("c", "u", "!play forsen");
    let hit = controller.add_highlight(&mut hit_msg).expect("highlighted");
    assert_eq!(hit.matched, 2);
    assert!(hit.sound && hit.alert);
    assert!(hit_msg.should_play_sound() && hit_msg.should_flash());

    let mut quiet = Message::new("c", "u", "play forsen");
    let hit = controller.add_highlight(&mut quiet).expect("highlighted");
    assert!(hit.sound && !hit.alert);
    assert!(!quiet.should_flash());

    let mut plain = Message::new("c", "u", "hello");
    assert!(controller.add_highlight(&mut plain).is_none());
    assert!(!plain.is_highlighted());
}

#[test]
fn test_invalid_regex_never_matches_but_is_kept() {
    let (path, _tmp) = settings_path_in_tmp();
    let ctx = ChatContext::open(Some(path.as_path())).expect("open");
    let broken = HighlightPhrase::new("(unclosed", true, false, true, true).expect("phrase");
    assert!(broken.validate().is_err());

    ctx.highlights().phrases().append(broken);
    ctx.highlights().phrases().append(phrase("unclosed"));

    let hit = ctx.highlights().classify("(unclosed").expect("literal matches");
    assert_eq!(hit.matched, 1);
    assert!(!hit.sound && !hit.alert);
    assert_eq!(stored_patterns(&path), ["(unclosed", "unclosed"]);
}
