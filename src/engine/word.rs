//! Word being typed

use log::debug;

/// Letters accumulated since the last delimiter
///
/// Only lowercase alphanumeric characters are ever stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingWord {
    text: String,
}

impl PendingWord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `c` lowercased, returning false (and leaving the word alone)
    /// when it is not alphanumeric
    pub fn push(&mut self, c: char) -> bool {
        if !c.is_alphanumeric() {
            return false;
        }
        // Lowercasing may add combining marks ('İ' -> "i\u{307}")
        self.text
            .extend(c.to_lowercase().filter(|l| l.is_alphanumeric()));
        true
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Clear the word and return its contents
    pub fn take(&mut self) -> String {
        debug!("Flushing pending word: '{}'", self.text);
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }
}
