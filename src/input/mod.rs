//! Keystroke sources
//!
//! A source blocks until the next logical key event is available. Layout
//! mapping, modifier state and device handling all live behind
//! [`KeySource`]; the engine only ever sees [`KeyEvent`]s.

pub mod evdev;
pub mod keymap;
pub mod terminal;

pub use evdev::EvdevSource;
pub use keymap::{KeyMapper, Layout};
pub use terminal::TerminalSource;

use crate::state::config::Config;
use crate::{Result, TalkboardError};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// A logical key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character
    Char(char),
    /// Commit the pending word (space, enter)
    Delimiter,
    /// Stop the program
    Exit,
    /// A key with no meaning for the keyboard
    Unmapped,
    VolumeUp,
    VolumeDown,
    Mute,
}

/// Blocking source of key events
pub trait KeySource {
    /// Wait for the next event
    fn next_event(&mut self) -> Result<KeyEvent>;
}

/// Where key events are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Raw stdin; the terminal is in raw mode while it is open
    Terminal,
    /// A keyboard input device
    Evdev(PathBuf),
}

/// Decide which source the configuration selects, without opening it
///
/// `auto` picks the keyboard device when one is found and falls back to
/// the terminal. An explicit `evdev` source without a device is an error.
pub fn resolve_source(config: &Config) -> Result<SourceKind> {
    let discover = || {
        config
            .key_device()
            .map(Ok)
            .unwrap_or_else(|| evdev::discover_keyboard(Path::new(evdev::BY_ID_DIR)))
    };

    match config.key_source().as_str() {
        "terminal" => Ok(SourceKind::Terminal),
        "evdev" => discover().map(SourceKind::Evdev),
        "auto" => match discover() {
            Ok(path) => Ok(SourceKind::Evdev(path)),
            Err(e) => {
                info!("{}; reading keys from the terminal", e);
                Ok(SourceKind::Terminal)
            }
        },
        other => Err(TalkboardError::Config(format!(
            "Unknown key source '{}' (expected auto, terminal or evdev)",
            other
        ))),
    }
}

/// Open a resolved source with the configured layout
pub fn open_source(kind: &SourceKind, config: &Config) -> Result<Box<dyn KeySource>> {
    info!("Creating key source: {:?}", kind);
    match kind {
        SourceKind::Terminal => Ok(Box::new(TerminalSource::stdin()?)),
        SourceKind::Evdev(path) => {
            let layout_name = config.layout();
            let layout = Layout::from_name(&layout_name).unwrap_or_else(|| {
                warn!("Unknown layout '{}', using azerty", layout_name);
                Layout::Azerty
            });
            Ok(Box::new(EvdevSource::open(path, layout)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(source: &str, device: &str) -> Config {
        let mut config = Config::defaults();
        config.set("keyboard", "source", source);
        config.set("keyboard", "device", device);
        config
    }

    #[test]
    fn test_resolve_explicit_sources() {
        assert_eq!(
            resolve_source(&config_with("terminal", "/dev/input/event3")).unwrap(),
            SourceKind::Terminal
        );
        assert_eq!(
            resolve_source(&config_with("evdev", "/dev/input/event3")).unwrap(),
            SourceKind::Evdev(PathBuf::from("/dev/input/event3"))
        );
        assert!(matches!(
            resolve_source(&config_with("joystick", "auto")),
            Err(TalkboardError::Config(_))
        ));
    }

    #[test]
    fn test_resolve_auto_prefers_configured_device() {
        assert_eq!(
            resolve_source(&config_with("auto", "/dev/input/event3")).unwrap(),
            SourceKind::Evdev(PathBuf::from("/dev/input/event3"))
        );
    }
}
