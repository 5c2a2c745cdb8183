//! 16x2 character LCD
//!
//! Row 1 shows the last spoken word (or a status message), row 2 the letters
//! typed so far, scrolling left once the row is full.

use super::Feedback;
use crate::Result;
use log::{debug, warn};

pub const COLS: usize = 16;
pub const ROWS: usize = 2;

/// Hardware that can display two rows of text
pub trait LcdPanel: Send {
    /// Replace the whole display content
    fn show(&mut self, rows: &[String; ROWS]) -> Result<()>;
}

/// Panel that writes the display content to the debug log
#[derive(Debug, Default)]
pub struct LogPanel;

impl LcdPanel for LogPanel {
    fn show(&mut self, rows: &[String; ROWS]) -> Result<()> {
        debug!("LCD [{:<16}] [{:<16}]", rows[0], rows[1]);
        Ok(())
    }
}

/// Keeps the LCD content and pushes it to the panel on every change
pub struct LcdDisplay {
    panel: Option<Box<dyn LcdPanel>>,
    rows: [String; ROWS],
}

impl LcdDisplay {
    pub fn new(panel: Box<dyn LcdPanel>) -> Self {
        Self {
            panel: Some(panel),
            rows: [String::new(), String::new()],
        }
    }

    pub fn rows(&self) -> &[String; ROWS] {
        &self.rows
    }

    /// Set both rows, truncated to the display width
    pub fn write(&mut self, top: &str, bottom: &str) {
        self.rows[0] = truncate(top);
        self.rows[1] = truncate(bottom);
        self.refresh();
    }

    /// Append a letter to row 2, dropping the oldest one when full
    pub fn add_letter(&mut self, letter: char) {
        let row = &mut self.rows[1];
        if row.chars().count() >= COLS {
            row.remove(0);
        }
        row.push(letter);
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.rows = [String::new(), String::new()];
        self.refresh();
    }

    fn refresh(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        if let Err(e) = panel.show(&self.rows) {
            warn!("LCD unavailable, disabling it: {}", e);
            self.panel = None;
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(COLS).collect()
}

impl Feedback for LcdDisplay {
    fn on_letter(&mut self, letter: char) {
        self.add_letter(letter.to_uppercase().next().unwrap_or(letter));
    }

    fn on_word_flushed(&mut self, word: &str) {
        self.write(&word.to_uppercase(), "");
    }

    fn on_volume_changed(&mut self, level: u8) {
        let bottom = self.rows[1].clone();
        self.write(&format!("Volume: {}", level), &bottom);
    }

    fn on_error(&mut self) {
        let bottom = self.rows[1].clone();
        self.write("Erreur", &bottom);
    }

    fn on_clear(&mut self) {
        self.clear();
    }
}
