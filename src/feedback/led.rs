//! Addressable LED strip
//!
//! Every character gets its own pattern, one random colour per pixel, picked
//! once when the strip is created.

use super::Feedback;
use crate::Result;
use log::{debug, warn};
use rand::Rng;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

/// Characters that light up the strip
const PATTERN_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789àâçéèêëîïôùûüÿœæ";

const ERROR_FLASHES: usize = 5;
const FLASH_DURATION: Duration = Duration::from_millis(50);

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.random(), rng.random(), rng.random())
    }
}

/// Hardware that can display a row of pixels
pub trait PixelDriver: Send {
    fn show(&mut self, pixels: &[Rgb]) -> Result<()>;
}

/// Driver that writes pixel colours to the debug log
#[derive(Debug, Default)]
pub struct LogDriver;

impl PixelDriver for LogDriver {
    fn show(&mut self, pixels: &[Rgb]) -> Result<()> {
        let hex: Vec<String> = pixels
            .iter()
            .map(|p| format!("{:02x}{:02x}{:02x}", p.r, p.g, p.b))
            .collect();
        debug!("LED {}", hex.join(" "));
        Ok(())
    }
}

/// LED strip with a fixed colour pattern per character
pub struct LedStrip {
    driver: Option<Box<dyn PixelDriver>>,
    count: usize,
    patterns: HashMap<char, Vec<Rgb>>,
}

impl LedStrip {
    pub fn new(driver: Box<dyn PixelDriver>, count: usize, rng: &mut impl Rng) -> Self {
        let patterns: HashMap<char, Vec<Rgb>> = PATTERN_CHARS
            .chars()
            .map(|c| (c, (0..count).map(|_| Rgb::random(rng)).collect()))
            .collect();
        Self {
            driver: Some(driver),
            count,
            patterns,
        }
    }

    /// Pattern shown for `c`, `None` for characters without one
    pub fn pattern(&self, c: char) -> Option<&[Rgb]> {
        self.patterns.get(&c).map(Vec::as_slice)
    }

    /// Light every pixel with the same colour
    pub fn fill(&mut self, color: Rgb) {
        let pixels = vec![color; self.count];
        self.show(&pixels);
    }

    /// Alternate `color` and off, `times` times
    pub fn flash(&mut self, color: Rgb, times: usize, duration: Duration) {
        for _ in 0..times {
            if self.driver.is_none() {
                return;
            }
            self.fill(color);
            thread::sleep(duration);
            self.fill(Rgb::OFF);
            thread::sleep(duration);
        }
    }

    fn show(&mut self, pixels: &[Rgb]) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        if let Err(e) = driver.show(pixels) {
            warn!("LED strip unavailable, disabling it: {}", e);
            self.driver = None;
        }
    }
}

impl Feedback for LedStrip {
    fn on_letter(&mut self, letter: char) {
        match self.patterns.get(&letter).cloned() {
            Some(pattern) => self.show(&pattern),
            None => self.fill(Rgb::WHITE),
        }
    }

    fn on_word_flushed(&mut self, _word: &str) {
        self.fill(Rgb::OFF);
    }

    fn on_error(&mut self) {
        self.flash(Rgb::RED, ERROR_FLASHES, FLASH_DURATION);
    }

    fn on_clear(&mut self) {
        self.fill(Rgb::OFF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    struct Capture(Arc<Mutex<Vec<Vec<Rgb>>>>);

    impl PixelDriver for Capture {
        fn show(&mut self, pixels: &[Rgb]) -> Result<()> {
            self.0.lock().unwrap().push(pixels.to_vec());
            Ok(())
        }
    }

    fn strip(count: usize) -> (LedStrip, Arc<Mutex<Vec<Vec<Rgb>>>>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut rng = StdRng::seed_from_u64(7);
        let strip = LedStrip::new(Box::new(Capture(frames.clone())), count, &mut rng);
        (strip, frames)
    }

    #[test]
    fn test_letter_shows_its_pattern() {
        let (mut strip, frames) = strip(4);
        let expected = strip.pattern('k').unwrap().to_vec();
        assert_eq!(expected.len(), 4);

        strip.on_letter('k');
        strip.on_letter('k');
        let frames = frames.lock().unwrap();
        assert_eq!(frames[0], expected);
        assert_eq!(frames[1], expected);
    }

    #[test]
    fn test_word_turns_strip_off() {
        let (mut strip, frames) = strip(3);
        strip.on_word_flushed("chat");
        assert_eq!(frames.lock().unwrap()[0], vec![Rgb::OFF; 3]);
    }

    #[test]
    fn test_error_flashes_red() {
        let (mut strip, frames) = strip(2);
        strip.flash(Rgb::RED, 2, Duration::from_millis(1));
        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], vec![Rgb::RED; 2]);
        assert_eq!(frames[1], vec![Rgb::OFF; 2]);
    }

    #[test]
    fn test_unknown_character_is_white() {
        let (mut strip, frames) = strip(1);
        assert!(strip.pattern('#').is_none());
        strip.on_letter('#');
        assert_eq!(frames.lock().unwrap()[0], vec![Rgb::WHITE]);
    }
}
