//! Visual feedback devices
//!
//! The engine notifies feedback devices about letters, words, volume and
//! errors. Notifications are fire-and-forget: devices log their own failures
//! and never report back, so a missing LCD or LED strip cannot change what
//! the keyboard says.

pub mod lcd;
pub mod led;

pub use lcd::{LcdDisplay, LcdPanel, LogPanel};
pub use led::{LedStrip, LogDriver, PixelDriver, Rgb};

use crate::state::config::Config;
use log::{info, warn};

/// Receiver of engine notifications
///
/// Every method defaults to doing nothing.
pub trait Feedback: Send {
    /// A letter was accepted into the pending word
    fn on_letter(&mut self, _letter: char) {}

    /// A word was spoken
    fn on_word_flushed(&mut self, _word: &str) {}

    /// Output volume changed (0-100)
    fn on_volume_changed(&mut self, _level: u8) {}

    /// Processing a key failed
    fn on_error(&mut self) {}

    /// The program is exiting
    fn on_clear(&mut self) {}
}

/// Forwards each notification to every registered device
///
/// A hub without devices is the stand-in when no hardware is configured.
#[derive(Default)]
pub struct FeedbackHub {
    devices: Vec<Box<dyn Feedback>>,
}

impl FeedbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, device: Box<dyn Feedback>) {
        self.devices.push(device);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl Feedback for FeedbackHub {
    fn on_letter(&mut self, letter: char) {
        self.devices.iter_mut().for_each(|d| d.on_letter(letter));
    }

    fn on_word_flushed(&mut self, word: &str) {
        self.devices.iter_mut().for_each(|d| d.on_word_flushed(word));
    }

    fn on_volume_changed(&mut self, level: u8) {
        self.devices.iter_mut().for_each(|d| d.on_volume_changed(level));
    }

    fn on_error(&mut self) {
        self.devices.iter_mut().for_each(|d| d.on_error());
    }

    fn on_clear(&mut self) {
        self.devices.iter_mut().for_each(|d| d.on_clear());
    }
}

/// Build the feedback devices named in the configuration
///
/// Unknown driver names are logged and skipped; this never fails.
pub fn create_feedback(config: &Config) -> FeedbackHub {
    let mut hub = FeedbackHub::new();

    match config.lcd().as_str() {
        "log" => hub.add(Box::new(LcdDisplay::new(Box::new(LogPanel)))),
        "none" | "off" => {}
        other => warn!("Unknown LCD driver '{}', LCD disabled", other),
    }

    match config.led().as_str() {
        "log" => hub.add(Box::new(LedStrip::new(
            Box::new(LogDriver),
            config.led_count(),
            &mut rand::rng(),
        ))),
        "none" | "off" => {}
        other => warn!("Unknown LED driver '{}', LEDs disabled", other),
    }

    info!("{} feedback device(s) active", hub.len());
    hub
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Feedback for Recorder {
        fn on_letter(&mut self, letter: char) {
            self.0.lock().unwrap().push(format!("letter {}", letter));
        }

        fn on_error(&mut self) {
            self.0.lock().unwrap().push("error".to_string());
        }
    }

    #[test]
    fn test_hub_fans_out() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hub = FeedbackHub::new();
        hub.add(Box::new(Recorder(log.clone())));
        hub.add(Box::new(Recorder(log.clone())));

        hub.on_letter('a');
        hub.on_error();
        // Not overridden by Recorder
        hub.on_clear();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["letter a", "letter a", "error", "error"]
        );
    }

    #[test]
    fn test_create_feedback_respects_config() {
        let mut config = Config::defaults();
        config.set("feedback", "lcd", "none");
        config.set("feedback", "led", "log");
        assert_eq!(create_feedback(&config).len(), 1);

        config.set("feedback", "led", "bogus");
        assert!(create_feedback(&config).is_empty());
    }
}
