//! Speech cache persistence tests

use std::sync::Arc;
use std::thread;
use talkboard::audio::{Audio, PcmFormat};
use talkboard::cache::SpeechCache;
use tempfile::TempDir;

fn clip(bytes: &[u8]) -> Audio {
    Audio::Encoded(bytes.to_vec())
}

#[test]
fn test_promoted_entries_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("common_words.json");

    let cache = SpeechCache::new(2);
    cache.store("bonjour", clip(b"ID3 bonjour"));
    cache.record_hit("bonjour");
    cache.record_hit("bonjour");
    cache.store("rare", clip(b"ID3 rare"));
    cache.record_hit("rare");

    assert_eq!(cache.save_snapshot(&path).unwrap(), 1);

    let restored = SpeechCache::load_snapshot(&path, 2);
    assert_eq!(*restored.lookup("bonjour").unwrap(), clip(b"ID3 bonjour"));
    assert!(restored.lookup("rare").is_none());
    // Loaded entries stay eligible for the next save
    assert!(restored.is_promoted("bonjour"));
}

#[test]
fn test_pcm_is_saved_as_wav() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");

    let cache = SpeechCache::new(1);
    cache.store(
        " a ",
        Audio::Pcm {
            format: PcmFormat::mono(22_050),
            samples: vec![0, 1000, -1000, 0],
        },
    );
    cache.record_hit(" a ");
    cache.save_snapshot(&path).unwrap();

    let restored = SpeechCache::load_snapshot(&path, 1);
    match &*restored.lookup(" a ").unwrap() {
        Audio::Encoded(bytes) => {
            assert_eq!(&bytes[0..4], b"RIFF");
            assert_eq!(bytes.len(), 44 + 4 * 2);
        }
        other => panic!("expected an encoded clip, got {:?}", other),
    }
}

#[test]
fn test_missing_snapshot_gives_empty_cache() {
    let dir = TempDir::new().unwrap();
    let cache = SpeechCache::load_snapshot(&dir.path().join("absent.json"), 2);
    assert!(cache.is_empty());
}

#[test]
fn test_corrupt_snapshot_gives_empty_cache() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");

    for content in ["", "{not json", "[1, 2, 3]", r#"{"a": 5}"#] {
        std::fs::write(&path, content).unwrap();
        let cache = SpeechCache::load_snapshot(&path, 2);
        assert!(cache.is_empty(), "content {:?} should load empty", content);
    }
}

#[test]
fn test_snapshot_is_plain_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");

    let cache = SpeechCache::new(1);
    cache.store("chat", clip(&[1, 2, 3]));
    cache.record_hit("chat");
    cache.save_snapshot(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["chat"], "AQID");
}

#[test]
fn test_save_while_engine_writes() {
    let dir = TempDir::new().unwrap();
    let path = Arc::new(dir.path().join("snapshot.json"));
    let cache = SpeechCache::new(1);

    let writer = {
        let cache = cache.clone();
        thread::spawn(move || {
            for i in 0..200 {
                let key = format!("mot{}", i);
                cache.store(&key, clip(format!("ID3 {}", key).as_bytes()));
                cache.record_hit(&key);
            }
        })
    };
    let saver = {
        let cache = cache.clone();
        let path = Arc::clone(&path);
        thread::spawn(move || {
            for _ in 0..20 {
                cache.save_snapshot(&path).unwrap();
            }
        })
    };
    writer.join().unwrap();
    saver.join().unwrap();

    assert_eq!(cache.save_snapshot(&path).unwrap(), 200);
    assert_eq!(SpeechCache::load_snapshot(&path, 1).len(), 200);
}

#[test]
fn test_remove_drops_entry_from_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");

    let cache = SpeechCache::new(1);
    cache.store("chat", clip(b"ID3 chat"));
    cache.record_hit("chat");
    assert!(cache.remove("chat"));
    assert!(!cache.remove("chat"));

    assert_eq!(cache.save_snapshot(&path).unwrap(), 0);
    assert!(cache.lookup("chat").is_none());
}

#[test]
fn test_unplayable_snapshot_entry_is_not_restored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, r#"{" a ": "Z2FyYmFnZQ=="}"#).unwrap();

    let cache = SpeechCache::load_snapshot(&path, 2);
    assert!(cache.lookup(" a ").is_none());
    assert_eq!(cache.save_snapshot(&path).unwrap(), 0);
}
