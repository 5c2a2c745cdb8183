//! Linux input-device keystroke source
//!
//! Reads `struct input_event` records straight from `/dev/input/eventN`, so
//! keys are seen even when no terminal has focus (a headless Pi with a USB
//! keyboard).

use super::keymap::{KeyMapper, Layout, EV_KEY};
use super::{KeyEvent, KeySource};
use crate::{Result, TalkboardError};
use log::{debug, info};
use nix::libc;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Directory of stable device symlinks
pub const BY_ID_DIR: &str = "/dev/input/by-id";

/// Find a keyboard under `dir`: names containing "kbd" first, then "keyboard"
pub fn discover_keyboard(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        TalkboardError::Device(format!("Cannot list {}: {}", dir.display(), e))
    })?;

    let mut names: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    names.sort();

    for pattern in ["kbd", "keyboard"] {
        let found = names.iter().find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(pattern))
                .unwrap_or(false)
        });
        if let Some(path) = found {
            info!("Found keyboard device: {}", path.display());
            return Ok(path.clone());
        }
    }

    Err(TalkboardError::Device(format!(
        "No keyboard device found in {}",
        dir.display()
    )))
}

/// Key events read from an input device
pub struct EvdevSource {
    device: Box<dyn Read + Send>,
    mapper: KeyMapper,
}

impl EvdevSource {
    /// Open the device at `path`
    pub fn open(path: &Path, layout: Layout) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            TalkboardError::Device(format!("Cannot open {}: {}", path.display(), e))
        })?;
        debug!("Reading keys from {} ({:?})", path.display(), layout);
        Ok(Self::from_reader(file, layout))
    }

    /// Read raw `input_event` records from any byte stream
    pub fn from_reader(device: impl Read + Send + 'static, layout: Layout) -> Self {
        Self {
            device: Box::new(device),
            mapper: KeyMapper::new(layout),
        }
    }

    fn read_raw(&mut self) -> Result<libc::input_event> {
        let mut buf = [0u8; std::mem::size_of::<libc::input_event>()];
        self.device.read_exact(&mut buf).map_err(|e| {
            TalkboardError::Device(format!("Keyboard read failed: {}", e))
        })?;
        // SAFETY: input_event is plain old data and buf has exactly its size
        Ok(unsafe { std::ptr::read_unaligned(buf.as_ptr() as *const libc::input_event) })
    }
}

impl KeySource for EvdevSource {
    fn next_event(&mut self) -> Result<KeyEvent> {
        loop {
            let raw = self.read_raw()?;
            if raw.type_ != EV_KEY {
                continue;
            }
            if let Some(event) = self.mapper.handle(raw.code, raw.value) {
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keymap::{KEY_DOWN, KEY_SPACE, KEY_UP};
    use std::io::Cursor;

    fn record(type_: u16, code: u16, value: i32) -> Vec<u8> {
        let mut event: libc::input_event = unsafe { std::mem::zeroed() };
        event.type_ = type_;
        event.code = code;
        event.value = value;
        let size = std::mem::size_of::<libc::input_event>();
        let ptr = &event as *const libc::input_event as *const u8;
        unsafe { std::slice::from_raw_parts(ptr, size) }.to_vec()
    }

    #[test]
    fn test_reads_key_release() {
        let mut bytes = Vec::new();
        // Sync events are skipped
        bytes.extend(record(0, 0, 0));
        bytes.extend(record(EV_KEY, 48, KEY_DOWN));
        bytes.extend(record(EV_KEY, 48, KEY_UP));
        bytes.extend(record(EV_KEY, KEY_SPACE, KEY_DOWN));
        bytes.extend(record(EV_KEY, KEY_SPACE, KEY_UP));

        let mut source = EvdevSource::from_reader(Cursor::new(bytes), Layout::Azerty);
        assert_eq!(source.next_event().unwrap(), KeyEvent::Char('b'));
        assert_eq!(source.next_event().unwrap(), KeyEvent::Delimiter);
        assert!(source.next_event().is_err());
    }

    #[test]
    fn test_discover_prefers_kbd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("usb-Logitech_USB_Keyboard-event-if01"), b"").unwrap();
        std::fs::write(dir.path().join("usb-Logitech_USB_Keyboard-event-kbd"), b"").unwrap();
        std::fs::write(dir.path().join("usb-Mouse-event-mouse"), b"").unwrap();

        let found = discover_keyboard(dir.path()).unwrap();
        assert!(found.to_string_lossy().ends_with("event-kbd"));
    }

    #[test]
    fn test_discover_falls_back_to_keyboard() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("platform-Keyboard-event"), b"").unwrap();

        let found = discover_keyboard(dir.path()).unwrap();
        assert!(found.ends_with("platform-Keyboard-event"));
    }

    #[test]
    fn test_discover_without_keyboard_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("usb-Mouse-event-mouse"), b"").unwrap();
        assert!(matches!(
            discover_keyboard(dir.path()),
            Err(TalkboardError::Device(_))
        ));
    }
}
