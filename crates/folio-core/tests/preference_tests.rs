//! Preference Store Tests
//!
//! Persistence across restarts through the file-backed store.

use folio_core::storage::{COLOR_SCHEME_KEY, THEME_KEY};
use folio_core::{
    tokens_for, Accent, FileStore, FolioConfig, KeyValueStore, PreferenceStore, ThemeMode,
};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_preference_survives_restart() {
    let dir = tempdir().unwrap();
    let config = FolioConfig::new().with_storage_dir(dir.path());
    let path = config.storage_file();

    let first = PreferenceStore::load(Arc::new(FileStore::new(&path)), false);
    assert_eq!(first.toggle_mode(), ThemeMode::Dark);
    first.set_accent(Accent::Rose);
    first.toggle_sidebar();

    let restarted = PreferenceStore::load(Arc::new(FileStore::new(&path)), false);
    let preference = restarted.get();
    assert_eq!(preference.mode, ThemeMode::Dark);
    assert_eq!(preference.accent, Accent::Rose);
    assert!(!preference.sidebar_open);
    assert_eq!(preference.root_class(), "dark");
}

#[test]
fn test_only_mode_and_accent_are_written() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path().join("prefs.json")));
    let store = PreferenceStore::load(storage.clone(), true);

    store.set_mode(ThemeMode::Light);
    store.set_accent(Accent::Blue);

    assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    assert_eq!(storage.get(COLOR_SCHEME_KEY).unwrap().as_deref(), Some("blue"));
    let text = std::fs::read_to_string(storage.path()).unwrap();
    assert!(!text.contains("sidebar"));
}

#[test]
fn test_corrupt_storage_falls_back_to_system_signal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = PreferenceStore::load(Arc::new(FileStore::new(&path)), true);

    assert_eq!(store.get().mode, ThemeMode::Dark);
    assert_eq!(store.get().accent, Accent::Teal);
    assert_eq!(store.get().tokens(), tokens_for(Accent::Teal));
}

#[tokio::test]
async fn test_subscribers_see_toggle_before_next_read() {
    let dir = tempdir().unwrap();
    let store = PreferenceStore::load(
        Arc::new(FileStore::new(dir.path().join("prefs.json"))),
        false,
    );
    let mut rx = store.subscribe();

    store.toggle_mode();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().mode, ThemeMode::Dark);
}
