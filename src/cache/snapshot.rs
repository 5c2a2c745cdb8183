//! Cache snapshot persistence
//!
//! The snapshot is a JSON object mapping each spoken text to its audio,
//! base64-encoded. Raw PCM is wrapped in WAV first so every value is a
//! playable clip. Hit counts are not stored.

use super::SpeechCache;
use crate::audio::{Audio, Container};
use crate::{Result, TalkboardError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use crossbeam_channel::{bounded, select, tick, Sender};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// On-disk layout: text -> base64 audio
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Snapshot(BTreeMap<String, String>);

/// Read a snapshot, returning no entries when it is missing or unreadable
pub fn load(path: &Path) -> Vec<(String, Audio)> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No cache snapshot at {}, starting empty", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Could not read cache snapshot {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let Snapshot(map) = match serde_json::from_str::<Snapshot>(&content) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Ignoring malformed cache snapshot {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, encoded) in map {
        match STANDARD.decode(encoded.as_bytes()) {
            Ok(bytes) if bytes.is_empty() => debug!("Skipping empty snapshot entry '{}'", key),
            Ok(bytes) if Container::sniff(&bytes) == Container::Unknown => {
                warn!("Skipping snapshot entry '{}': not a WAV or MP3 clip", key)
            }
            Ok(bytes) => entries.push((key, Audio::Encoded(bytes))),
            Err(e) => warn!("Skipping undecodable snapshot entry '{}': {}", key, e),
        }
    }

    info!(
        "Loaded {} cached utterances from {}",
        entries.len(),
        path.display()
    );
    entries
}

/// Write entries to `path` through a temporary file and a rename
pub fn save(path: &Path, entries: &[(String, Arc<Audio>)]) -> Result<usize> {
    let mut snapshot = Snapshot::default();
    for (key, audio) in entries {
        let bytes = audio.to_encoded()?;
        snapshot.0.insert(key.clone(), STANDARD.encode(bytes));
    }
    let json = serde_json::to_string(&snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        TalkboardError::Cache(format!(
            "Could not replace snapshot {}: {}",
            path.display(),
            e
        ))
    })?;

    let count = snapshot.0.len();
    debug!("Saved {} cached utterances to {}", count, path.display());
    Ok(count)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Background thread saving the cache on a fixed interval
///
/// Dropping the saver stops the thread without a final save; call
/// [`SpeechCache::save_snapshot`] for that.
pub struct PeriodicSaver {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicSaver {
    pub fn start(cache: SpeechCache, path: PathBuf, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("cache-saver".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => match cache.save_snapshot(&path) {
                            Ok(count) => debug!("Periodic save: {} entries", count),
                            Err(e) => warn!("Periodic cache save failed: {}", e),
                        },
                        recv(stop_rx) -> _ => break,
                    }
                }
                debug!("Cache saver stopped");
            })?;

        info!("Saving the cache every {}s", interval.as_secs());
        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Cache saver thread panicked");
            }
        }
    }
}

impl Drop for PeriodicSaver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_path() {
        assert_eq!(
            tmp_path(Path::new("cache/common_words.json")),
            PathBuf::from("cache/common_words.json.tmp")
        );
    }

    #[test]
    fn test_skips_bad_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, r#"{"ok": "SUQz", "bad": "!!!"}"#).unwrap();

        let entries = load(&path);
        assert_eq!(entries, vec![("ok".to_string(), Audio::Encoded(b"ID3".to_vec()))]);
    }

    #[test]
    fn test_skips_unplayable_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        // "garbage" and "ID3"
        std::fs::write(&path, r#"{" a ": "Z2FyYmFnZQ==", " b ": "SUQz"}"#).unwrap();

        let keys: Vec<String> = load(&path).into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![" b ".to_string()]);
    }

    #[test]
    fn test_save_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let entries = vec![("a".to_string(), Arc::new(Audio::Encoded(vec![7])))];

        assert_eq!(save(&path, &entries).unwrap(), 1);
        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_periodic_saver_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let cache = SpeechCache::new(1);
        cache.store("salut", Audio::Encoded(b"ID3 salut".to_vec()));
        cache.record_hit("salut");

        let saver =
            PeriodicSaver::start(cache, path.clone(), Duration::from_millis(20)).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !path.exists() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        saver.stop();

        assert_eq!(load(&path).len(), 1);
    }
}
