//! Speech cache
//!
//! Maps the exact text handed to the synthesizer (a padded letter or a
//! normalized word) to the audio it produced. Entries count how often they
//! were played; once an entry reaches the promotion threshold it is included
//! in the on-disk snapshot.
//!
//! The map is shared between the engine thread and the periodic saver, so it
//! lives behind a `parking_lot::Mutex`. Cloning a `SpeechCache` clones the
//! handle, not the entries.

pub mod snapshot;

pub use snapshot::PeriodicSaver;

use crate::audio::Audio;
use crate::Result;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Hits after which an entry is persisted unless configured otherwise
pub const DEFAULT_PROMOTION_THRESHOLD: u32 = 2;

#[derive(Debug, Clone)]
struct Entry {
    audio: Arc<Audio>,
    hits: u32,
}

/// Shared text-to-audio cache
#[derive(Debug, Clone)]
pub struct SpeechCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    threshold: u32,
}

impl SpeechCache {
    pub fn new(threshold: u32) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            threshold: threshold.max(1),
        }
    }

    /// Load a cache from a snapshot file
    ///
    /// A missing or unreadable snapshot gives an empty cache.
    pub fn load_snapshot(path: &Path, threshold: u32) -> Self {
        let cache = Self::new(threshold);
        let restored = snapshot::load(path);
        {
            let mut entries = cache.entries.lock();
            for (key, audio) in restored {
                // Loaded entries were promoted in an earlier run
                entries.insert(
                    key,
                    Entry {
                        audio: Arc::new(audio),
                        hits: cache.threshold,
                    },
                );
            }
        }
        cache
    }

    /// Write promoted entries to `path`, returning how many were saved
    pub fn save_snapshot(&self, path: &Path) -> Result<usize> {
        snapshot::save(path, &self.promoted())
    }

    /// Audio previously stored for `key`
    pub fn lookup(&self, key: &str) -> Option<Arc<Audio>> {
        self.entries.lock().get(key).map(|e| Arc::clone(&e.audio))
    }

    /// Insert or replace the audio for `key`
    ///
    /// New keys start at zero hits. Replacing audio keeps the existing count.
    pub fn store(&self, key: &str, audio: Audio) -> Arc<Audio> {
        let audio = Arc::new(audio);
        let mut entries = self.entries.lock();
        match entries.get_mut(key) {
            Some(entry) => entry.audio = Arc::clone(&audio),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        audio: Arc::clone(&audio),
                        hits: 0,
                    },
                );
            }
        }
        audio
    }

    /// Drop the entry for `key`, returning whether it existed
    pub fn remove(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Count one playback of `key`, returning the new hit count
    ///
    /// Unknown keys are ignored and return 0.
    pub fn record_hit(&self, key: &str) -> u32 {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return 0;
        };
        entry.hits = entry.hits.saturating_add(1);
        if entry.hits == self.threshold {
            debug!("'{}' promoted to the snapshot", key);
        }
        entry.hits
    }

    /// Current hit count of `key`
    pub fn hits(&self, key: &str) -> Option<u32> {
        self.entries.lock().get(key).map(|e| e.hits)
    }

    pub fn is_promoted(&self, key: &str) -> bool {
        self.hits(key).is_some_and(|hits| hits >= self.threshold)
    }

    /// Point-in-time copy of the entries eligible for persistence
    ///
    /// Only `Arc` handles are copied under the lock; encoding happens later.
    pub fn promoted(&self) -> Vec<(String, Arc<Audio>)> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, e)| e.hits >= self.threshold)
            .map(|(k, e)| (k.clone(), Arc::clone(&e.audio)))
            .collect()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for SpeechCache {
    fn default() -> Self {
        Self::new(DEFAULT_PROMOTION_THRESHOLD)
    }
}
