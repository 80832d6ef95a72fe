use crate::config::{Settings, Theme};

use std::fs;

/// WHAT: Loading a missing settings file creates it with defaults
/// WHY: First launch must work without any manual configuration
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_settings_file_when_loaded_then_defaults_created_on_disk() {
    // Given: An empty config directory
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    // When: Loading
    let settings = Settings::load_from(&path).unwrap();

    // Then: Defaults are returned and the file now exists
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.theme, Theme::Light);
    assert_eq!(settings.start_recording_shortcut, "ctrl+alt+o");
    assert_eq!(settings.stop_recording_shortcut, "ctrl+alt+o");
    assert_eq!(settings.exit_shortcut, "ctrl+alt+x");
    assert!(path.exists());
}

/// WHAT: An empty JSON object loads as the full default settings
/// WHY: Every key is optional; partial files from older versions must load
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_json_object_when_loaded_then_all_defaults_apply() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{}").unwrap();

    let settings = Settings::load_from(&path).unwrap();

    assert_eq!(settings, Settings::default());
}

/// WHAT: The on-disk key names are the shouty legacy names
/// WHY: Existing settings files must keep loading across versions
#[test]
#[allow(clippy::unwrap_used)]
fn given_legacy_key_names_when_loaded_then_values_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "theme": "dark",
            "START_RECORDING_SHORTCUT": "ctrl+shift+r",
            "STOP_RECORDING_SHORTCUT": "ctrl+shift+s",
            "EXIT_SHORTCUT": "ctrl+shift+q"
        }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();

    assert_eq!(settings.theme, Theme::Dark);
    assert_eq!(settings.start_recording_shortcut, "ctrl+shift+r");
    assert_eq!(settings.stop_recording_shortcut, "ctrl+shift+s");
    assert_eq!(settings.exit_shortcut, "ctrl+shift+q");
}

/// WHAT: Saved settings load back identically and leave no temp file
/// WHY: The atomic write must complete its rename and round-trip losslessly
#[test]
#[allow(clippy::unwrap_used)]
fn given_saved_settings_when_reloaded_then_round_trip_is_lossless() {
    // Given: Non-default settings
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings {
        theme: Theme::Dark,
        start_recording_shortcut: "ctrl+alt+f9".to_string(),
        stop_recording_shortcut: "ctrl+alt+f9".to_string(),
        exit_shortcut: "ctrl+alt+q".to_string(),
    };

    // When: Saving then loading
    settings.save_to(&path).unwrap();
    let reloaded = Settings::load_from(&path).unwrap();

    // Then: Identical, and the temp sibling is gone
    assert_eq!(reloaded, settings);
    assert!(!path.with_extension("json.tmp").exists());
}

/// WHAT: A corrupt settings file is a load error, not a silent default
/// WHY: Silently discarding a user's edits would be worse than failing loud
#[test]
#[allow(clippy::unwrap_used)]
fn given_corrupt_json_when_loaded_then_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(Settings::load_from(&path).is_err());
}
