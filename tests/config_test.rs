//! Configuration loading tests
//!
//! Tests that the config file is created with defaults and that hand-edited
//! values are picked up.

use std::path::PathBuf;
use std::time::Duration;
use talkboard::state::config::Config;
use talkboard::state::VoiceConfig;
use talkboard::text::Locale;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("talkboard.cfg");

    let config = Config::load_from(&path).expect("Failed to load config");
    assert!(path.exists());
    assert_eq!(config.path(), path.as_path());

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[voice]"));
    assert!(written.contains("exit_word=exitnowarn"));
}

#[test]
fn test_hand_edited_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("talkboard.cfg");
    std::fs::write(
        &path,
        "[voice]\nlanguage = fr-BE\nsynthesizer = PIPER\npiper_model = /opt/voices/fr.onnx\n\
         [cache]\nfile = /var/lib/talkboard/words.json\npromotion_threshold = 3\n\
         [keyboard]\ndevice = /dev/input/event3\nlayout = qwerty\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.language(), "fr-BE");
    assert_eq!(config.synthesizer(), "piper");
    assert_eq!(
        config.piper_model(),
        Some(PathBuf::from("/opt/voices/fr.onnx"))
    );
    assert_eq!(
        config.cache_file(),
        PathBuf::from("/var/lib/talkboard/words.json")
    );
    assert_eq!(config.promotion_threshold(), 3);
    assert_eq!(config.key_device(), Some(PathBuf::from("/dev/input/event3")));
    assert_eq!(config.layout(), "qwerty");

    // Keys missing from the file fall back to defaults
    assert_eq!(config.audio(), "rodio");
    assert_eq!(config.save_interval(), Duration::from_secs(300));

    let voice = VoiceConfig::from_config(&config);
    assert_eq!(voice.locale, Locale::BelgianFrench);
}

#[test]
fn test_invalid_numbers_use_defaults() {
    let mut config = Config::defaults();
    config.set("cloud", "retries", "many");
    config.set("voice", "pad_letters", "sometimes");
    assert_eq!(config.cloud_retries(), 3);
    assert!(config.pad_letters());
}

#[test]
fn test_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("talkboard.cfg");

    let mut config = Config::load_from(&path).unwrap();
    config.set("voice", "volume", "40");
    config.save().unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.volume(), 40);
}

#[test]
fn test_unreadable_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("talkboard.cfg");
    std::fs::write(&path, "[voice\nlanguage = fr\n").unwrap();

    assert!(Config::load_from(&path).is_err());
}
